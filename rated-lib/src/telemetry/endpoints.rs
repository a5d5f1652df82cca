//! Routes served on the observability port.

use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;

use crate::error::{RatedError, Result};

type RespBody = BoxBody<Bytes, hyper::Error>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/health`: the process is up and serving.
    Health,
    /// `/live`: the process is running at all.
    Live,
    /// `/metrics`: Prometheus text exposition of the limiter's meters.
    Metrics,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/health" => Some(Self::Health),
            "/live" => Some(Self::Live),
            "/metrics" => Some(Self::Metrics),
            _ => None,
        }
    }

    pub fn respond(self, registry: &Registry) -> Result<Response<RespBody>> {
        match self {
            Self::Health => status_json("healthy"),
            Self::Live => status_json("alive"),
            Self::Metrics => {
                let encoder = TextEncoder::new();
                let mut text = Vec::new();
                encoder
                    .encode(&registry.gather(), &mut text)
                    .map_err(|e| RatedError::Telemetry(format!("Failed to encode metrics: {e}")))?;
                reply(StatusCode::OK, encoder.format_type(), text)
            }
        }
    }
}

/// Response for a path that is not an [`Endpoint`].
pub fn not_found() -> Result<Response<RespBody>> {
    reply(StatusCode::NOT_FOUND, TEXT, "Not Found\n")
}

fn status_json(status: &str) -> Result<Response<RespBody>> {
    let body = serde_json::to_vec(&json!({ "status": status }))
        .map_err(|e| RatedError::Http(format!("Failed to serialize {status} status: {e}")))?;
    reply(StatusCode::OK, JSON, body)
}

pub(crate) fn reply(
    status: StatusCode,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Response<RespBody>> {
    let body = Full::new(body.into()).map_err(|never| match never {}).boxed();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .map_err(|e| RatedError::Http(format!("Failed to build {status} response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(Endpoint::from_path("/health"), Some(Endpoint::Health));
        assert_eq!(Endpoint::from_path("/live"), Some(Endpoint::Live));
        assert_eq!(Endpoint::from_path("/metrics"), Some(Endpoint::Metrics));
        assert_eq!(Endpoint::from_path("/metrics/"), None);
        assert_eq!(Endpoint::from_path("/"), None);
    }

    #[test]
    fn test_status_endpoints_are_json() -> Result<()> {
        let registry = Registry::new();
        for endpoint in [Endpoint::Health, Endpoint::Live] {
            let resp = endpoint.respond(&registry)?;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()), Some(JSON.as_bytes()));
        }
        Ok(())
    }

    #[test]
    fn test_empty_registry_renders() -> Result<()> {
        let resp = Endpoint::Metrics.respond(&Registry::new())?;
        assert_eq!(resp.status(), StatusCode::OK);
        Ok(())
    }
}
