pub mod config;
pub mod error;
pub mod lenient;
pub mod types;

pub use config::{config, set_config, RulesConfig};
pub use error::{Result, RulesError};
pub use types::{Pool, Round, Side};
