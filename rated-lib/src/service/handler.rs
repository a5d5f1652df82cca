use std::sync::Arc;
use std::time::Instant;

use hyper::{Request, Response};
use tracing::{debug, warn};

use crate::error::Result;
use crate::ratelimit::{Decision, Limiter};
use crate::service::headers::parse_overrides;
use crate::service::response::{
    allowed_response, bad_request_response, help_response, internal_error_response,
    limited_response, RespBody,
};
use crate::telemetry::metrics::values;
use crate::telemetry::Metrics;

/// Turns HTTP requests into limiter decisions.
///
/// Holds no per-request state; clone the `Arc` and share it between
/// connections.
pub struct RatedService {
    limiter: Arc<Limiter>,
    metrics: Option<Arc<Metrics>>,
}

impl RatedService {
    pub fn new(limiter: Arc<Limiter>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { limiter, metrics }
    }

    pub fn limiter(&self) -> &Arc<Limiter> {
        &self.limiter
    }

    /// Answer one request. Method, path and body are ignored.
    ///
    /// The raw query string, exactly as sent and without percent-decoding, is
    /// the key, so `a=1&b=2` and `b=2&a=1` are different keys.
    pub fn handle<B>(&self, req: &Request<B>) -> Response<RespBody> {
        self.try_handle(req).unwrap_or_else(|e| {
            warn!(error = %e, "failed to build response");
            internal_error_response()
        })
    }

    fn try_handle<B>(&self, req: &Request<B>) -> Result<Response<RespBody>> {
        let key = req.uri().query().unwrap_or_default();
        if key.is_empty() {
            self.record(values::OUTCOME_HELP);
            return help_response(
                self.limiter.bucket_count(),
                self.limiter.default_burst(),
                self.limiter.default_refill(),
            );
        }

        let overrides = match parse_overrides(req.headers()) {
            Ok(overrides) => overrides,
            Err(e) => {
                debug!(key, error = %e, "rejecting malformed override header");
                self.record(values::OUTCOME_BAD_REQUEST);
                return bad_request_response(&e.to_string());
            }
        };

        let started = Instant::now();
        let decision = self.limiter.decide(key, overrides);
        if let Some(m) = &self.metrics {
            m.record_decision_duration(started.elapsed().as_secs_f64());
        }

        debug!(
            key,
            burst = ?overrides.burst,
            refill = ?overrides.refill,
            ?decision,
            "rate limit decision"
        );

        match decision {
            Decision::Allowed => {
                self.record(values::OUTCOME_ALLOWED);
                allowed_response()
            }
            Decision::Limited => {
                self.record(values::OUTCOME_LIMITED);
                limited_response()
            }
        }
    }

    fn record(&self, outcome: &'static str) {
        if let Some(m) = &self.metrics {
            m.record_request(outcome);
        }
    }
}
