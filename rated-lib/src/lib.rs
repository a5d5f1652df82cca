#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod ratelimit;
pub mod service;
pub mod telemetry;

pub use config::{validate, Config, LoggingConfig};
pub use error::{RatedError, Result};
pub use ratelimit::{Decision, Fnv1a, KeyHasher, Limiter, Overrides, SeededHasher};
pub use service::{run, serve, RatedService};
