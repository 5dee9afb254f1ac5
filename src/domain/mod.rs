pub mod region;
pub mod stage_error;
pub mod stock_row;

pub use region::*;
pub use stage_error::*;
pub use stock_row::*;
