use http::header::HeaderMap;
use std::time::Duration;
use thiserror::Error;

use crate::ratelimit::Overrides;

/// Header carrying a per-request burst, an unsigned decimal integer.
pub const BURST_HEADER: &str = "burst";
/// Header carrying a per-request refill interval, e.g. `500ms` or `1m30s`.
pub const REFILL_HEADER: &str = "refill";

/// A malformed override header. The message is sent back as the 400 body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Burst header: {reason}")]
    InvalidBurst { reason: String },

    #[error("Refill header: {reason}")]
    InvalidRefill { reason: String },
}

/// Read the `Burst` and `Refill` headers into [`Overrides`].
///
/// An absent header leaves the override unset. A present header must parse.
/// A zero burst or refill, or a negative refill such as `-1s`, is accepted
/// and leaves the override unset, so the limiter default applies.
pub fn parse_overrides(headers: &HeaderMap) -> Result<Overrides, HeaderError> {
    let mut overrides = Overrides::none();

    if let Some(value) = headers.get(BURST_HEADER) {
        let text = value
            .to_str()
            .map_err(|e| HeaderError::InvalidBurst { reason: e.to_string() })?;
        overrides.burst = Some(parse_burst(text)?);
    }

    if let Some(value) = headers.get(REFILL_HEADER) {
        let text = value
            .to_str()
            .map_err(|e| HeaderError::InvalidRefill { reason: e.to_string() })?;
        overrides.refill = parse_refill(text)?;
    }

    Ok(overrides)
}

fn parse_burst(text: &str) -> Result<u32, HeaderError> {
    // Unsigned decimal digits only; `u32::from_str` would also take a `+`.
    if text.starts_with('+') {
        return Err(HeaderError::InvalidBurst {
            reason: "invalid digit found in string".to_string(),
        });
    }
    text.parse::<u32>()
        .map_err(|e| HeaderError::InvalidBurst { reason: e.to_string() })
}

/// `None` for a well-formed negative duration.
fn parse_refill(text: &str) -> Result<Option<Duration>, HeaderError> {
    let text = text.trim();
    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let refill = humantime::parse_duration(magnitude)
        .map_err(|e| HeaderError::InvalidRefill { reason: e.to_string() })?;
    Ok((!negative).then_some(refill))
}
