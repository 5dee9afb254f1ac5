use actix_web::{
    get,
    http::header::{
        Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
    },
    web, HttpResponse,
};
use tokio::sync::Mutex;

use crate::{configuration::CrawlerSettings, domain::Region, services::get_data_by_region};

/// One crawl at a time: every request would otherwise start its own
/// browser against the same screener session.
#[derive(Default)]
pub struct CrawlGate {
    lock: Mutex<()>,
}

#[get("/get_data/{region}")]
pub async fn get_data(
    region: web::Path<String>,
    settings: web::Data<CrawlerSettings>,
    crawl_gate: web::Data<CrawlGate>,
) -> HttpResponse {
    let region = region.into_inner();

    let csv_file = {
        let _guard = crawl_gate.lock.lock().await;
        get_data_by_region(&region, settings.get_ref()).await
    };

    let csv_file = match csv_file {
        Ok(file) => file,
        Err(e) => {
            log::error!("Failed to get data for region {}: {}", region, e);
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    // Read fully so the temp file can go away before the response is sent.
    let body = match tokio::fs::read(csv_file.path()).await {
        Ok(body) => body,
        Err(e) => {
            log::error!("Failed to read {:?}: {:?}", csv_file.path(), e);
            return HttpResponse::BadRequest().body(format!("(get_data) -> {}", e));
        }
    };
    drop(csv_file);

    let file_name = Region::parse(&region)
        .map(|r| r.file_name())
        .unwrap_or_else(|_| "region.csv".to_string());

    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(content_disposition(&file_name))
        .body(body)
}

/// Attachment header for the CSV download. Non-ASCII names get an ASCII
/// `filename` plus the UTF-8 `filename*` form.
fn content_disposition(file_name: &str) -> ContentDisposition {
    let ascii_name: String = file_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    let mut parameters = vec![DispositionParam::Filename(ascii_name)];
    if !file_name.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: file_name.as_bytes().to_vec(),
        }));
    }

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}
