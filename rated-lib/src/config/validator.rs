use crate::config::types::Config;
use crate::error::{RatedError, Result};

pub fn validate(config: &Config) -> Result<()> {
    if config.refill.is_zero() {
        return Err(RatedError::Config("-refill argument must be positive".into()));
    }
    if config.burst == 0 {
        return Err(RatedError::Config("-burst argument must be positive".into()));
    }
    if config.buckets == 0 {
        return Err(RatedError::Config("-buckets argument must be positive".into()));
    }
    if config.addr.trim().is_empty() {
        return Err(RatedError::Config("-addr is empty".into()));
    }
    if config.idle_timeout.is_zero() {
        return Err(RatedError::Config("-idle-timeout argument must be positive".into()));
    }
    Ok(())
}
