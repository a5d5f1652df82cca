//! `rated`: a standalone rate-limiting service with an HTTP interface.
//!
//! Any request with a non-empty query string is checked against a fixed set of
//! token buckets, using the whole raw query as the key. The answer is 204 when
//! the request should be allowed and 429 when it should be limited. Per-request
//! limits can be set with the `Burst` and `Refill` headers:
//!
//! ```text
//! curl -sD- -H "Burst: 3" -H "Refill: 1s" 'http://localhost:8080/?key'
//! ```

#![forbid(unsafe_code)]

use clap::Parser;
use rated_lib::telemetry::init_tracing;
use rated_lib::{validate, Config, LoggingConfig};
use std::time::Duration;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Token-bucket rate limiting over HTTP")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "RATED_ADDR", default_value = "localhost:8080")]
    addr: String,

    /// Number of buckets to use
    #[arg(long, env = "RATED_BUCKETS", default_value_t = 100_000)]
    buckets: usize,

    /// Burst amount: tokens each bucket holds
    #[arg(long, env = "RATED_BURST", default_value_t = 10)]
    burst: u32,

    /// Time to refill a bucket by one token
    #[arg(
        long,
        env = "RATED_REFILL",
        default_value = "1s",
        value_parser = humantime::parse_duration
    )]
    refill: Duration,

    /// Seed the key hasher randomly at startup (key to bucket mapping changes on restart)
    #[arg(long, env = "RATED_RANDOM_HASH_SEED")]
    random_hash_seed: bool,

    /// Close a client connection after this long without a request
    #[arg(
        long,
        env = "RATED_IDLE_TIMEOUT",
        default_value = "30s",
        value_parser = humantime::parse_duration
    )]
    idle_timeout: Duration,

    /// Port for the /metrics, /health and /live endpoints (disabled if unset)
    #[arg(long, env = "RATED_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "RATED_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Show module path in log lines
    #[arg(long, env = "RATED_SHOW_TARGET")]
    show_target: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            addr: cli.addr,
            buckets: cli.buckets,
            burst: cli.burst,
            refill: cli.refill,
            random_hash_seed: cli.random_hash_seed,
            idle_timeout: cli.idle_timeout,
            metrics_port: cli.metrics_port,
            logging: LoggingConfig { level: cli.log_level, show_target: cli.show_target },
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from(Cli::parse());

    if let Err(err) = validate(&config) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = init_tracing(&config.logging.level, config.logging.show_target) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = rated_lib::run(config).await {
        error!(%err, "rate limiter exited with error");
        std::process::exit(1);
    }
}
