pub mod default_route;
pub mod region_route;

pub use region_route::CrawlGate;
