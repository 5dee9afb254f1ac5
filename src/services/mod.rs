pub mod csv_export;
pub mod droid;
pub mod screener_crawler;
pub mod screener_page;

pub use csv_export::*;
pub use droid::*;
pub use screener_crawler::*;
pub use screener_page::*;
