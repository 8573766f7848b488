pub mod config;
pub mod error;
pub mod method;
pub mod quantity;
pub mod series;

pub use config::Config;
pub use error::*;
pub use method::*;
pub use quantity::*;
pub use series::*;
