//! HTTP front end for the limiter.
//!
//! Every request's raw query string is a key. The key is checked against the
//! limiter and the decision becomes a status code: 204 when allowed, 429 when
//! limited. A request without a query gets a help text instead.

pub mod handler;
pub mod headers;
pub mod response;
pub mod server;
mod idle;

pub use handler::RatedService;
pub use headers::{parse_overrides, HeaderError, BURST_HEADER, REFILL_HEADER};
pub use server::{run, serve};
