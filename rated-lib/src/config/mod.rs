mod types;
mod validator;

pub use types::{Config, LoggingConfig};
pub use validator::validate;
