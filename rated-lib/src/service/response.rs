use std::time::Duration;

use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::Response;

use crate::error::{RatedError, Result};

pub type RespBody = BoxBody<Bytes, hyper::Error>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// 204: the request is within its rate.
pub fn allowed_response() -> Result<Response<RespBody>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(CACHE_CONTROL, "no-store")
        .body(empty_body())
        .map_err(|e| RatedError::Http(format!("Failed to build allowed response: {e}")))
}

/// 429: the request exceeded its rate.
pub fn limited_response() -> Result<Response<RespBody>> {
    text_response(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests\n")
        .map(no_store)
}

/// 400 with `message` as the body.
pub fn bad_request_response(message: &str) -> Result<Response<RespBody>> {
    text_response(StatusCode::BAD_REQUEST, format!("{message}\n"))
}

/// 200 with the help text for the current limiter settings.
pub fn help_response(buckets: usize, burst: u32, refill: Duration) -> Result<Response<RespBody>> {
    text_response(StatusCode::OK, help_text(buckets, burst, refill))
}

/// Last-resort 500 for when building a regular response failed.
pub fn internal_error_response() -> Response<RespBody> {
    let mut resp = Response::new(full_body("Internal Server Error\n"));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

pub fn help_text(buckets: usize, burst: u32, refill: Duration) -> String {
    format!(
        "Accepts requests with non-empty query string used as a key to check
against a limited set of buckets to do token-based rate limiting.

Expected responses:

* 204 - request should be allowed;
* 429 - request exceeded rate and should be limited.

Optional \"Burst\" (integer) and \"Refill\" (duration, e.g. 500ms) request
headers override the settings below for one request.

Note that because of a limited amount of buckets in use collisions are expected.

Current settings are: {buckets} buckets, each holds up to {burst} tokens
and refills by one token every {}.
",
        humantime::format_duration(refill)
    )
}

fn text_response(status: StatusCode, text: impl Into<Bytes>) -> Result<Response<RespBody>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(full_body(text))
        .map_err(|e| RatedError::Http(format!("Failed to build {status} response: {e}")))
}

fn no_store(mut resp: Response<RespBody>) -> Response<RespBody> {
    resp.headers_mut()
        .insert(CACHE_CONTROL, http::HeaderValue::from_static("no-store"));
    resp
}

fn full_body(text: impl Into<Bytes>) -> RespBody {
    Full::new(text.into())
        .map_err(|never| match never {})
        .boxed()
}

fn empty_body() -> RespBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}
