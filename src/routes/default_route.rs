use actix_web::{get, HttpResponse, HttpResponseBuilder};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {}

#[derive(Template)]
#[template(path = "404.html")]
struct NotFoundTemplate {}

fn render(mut response: HttpResponseBuilder, template: impl Template) -> HttpResponse {
    match template.render() {
        Ok(body) => response.content_type("text/html; charset=utf-8").body(body),
        Err(e) => {
            log::error!("Failed to render template: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/")]
pub async fn index() -> HttpResponse {
    render(HttpResponse::Ok(), IndexTemplate {})
}

pub async fn not_found() -> HttpResponse {
    render(HttpResponse::NotFound(), NotFoundTemplate {})
}
