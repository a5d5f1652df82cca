use thiserror::Error;

/// Errors that can occur while configuring or running the limiter service
#[derive(Error, Debug)]
pub enum RatedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

pub type Result<T> = std::result::Result<T, RatedError>;
