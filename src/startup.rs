use std::net::TcpListener;

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::CrawlerSettings,
    routes::{default_route, region_route, CrawlGate},
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(Files::new("/static", "./static").prefer_utf8(true))
        .service(default_route::index)
        .service(region_route::get_data);
}

pub fn run(
    listener: TcpListener,
    crawler_settings: CrawlerSettings,
) -> Result<Server, std::io::Error> {
    let crawler_settings = web::Data::new(crawler_settings);
    let crawl_gate = web::Data::new(CrawlGate::default());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_routes)
            .default_service(web::to(default_route::not_found))
            .app_data(crawler_settings.clone())
            .app_data(crawl_gate.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
