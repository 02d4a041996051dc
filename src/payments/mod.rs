pub mod error;
pub mod gateway;
pub mod handlers;
pub mod signature;
pub mod trade_number;

pub use error::*;
pub use gateway::*;
pub use handlers::*;
