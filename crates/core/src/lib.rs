pub mod config;
pub mod error;
pub mod record;
pub mod table;

pub use config::Config;
pub use error::*;
pub use record::*;
pub use table::*;
