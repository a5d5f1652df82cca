use std::time::Duration;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    /// Default: "info"
    pub level: String,
    /// Show module path (target) in log messages
    /// Default: false
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), show_target: false }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to listen on, resolved at bind time
    /// Example: "localhost:8080" or "0.0.0.0:8080"
    pub addr: String,
    /// Number of buckets in the table. Keys hash onto these slots.
    /// Default: 100000
    pub buckets: usize,
    /// Tokens a bucket holds when no `Burst` header overrides it
    /// Default: 10
    pub burst: u32,
    /// Time to refill a bucket by one token when no `Refill` header overrides it
    /// Default: 1s
    pub refill: Duration,
    /// Draw hasher seeds at startup instead of using the built-in constants.
    /// The key to bucket mapping then changes on every restart.
    /// Default: false
    pub random_hash_seed: bool,
    /// How long a client connection may go without a new request before it is closed
    /// Default: 30s
    pub idle_timeout: Duration,
    /// Port for the observability server (`/metrics`, `/health`, `/live`)
    /// Default: None (disabled)
    pub metrics_port: Option<u16>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            buckets: default_buckets(),
            burst: default_burst(),
            refill: default_refill(),
            random_hash_seed: false,
            idle_timeout: default_idle_timeout(),
            metrics_port: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_addr() -> String {
    "localhost:8080".to_string()
}

fn default_buckets() -> usize {
    100_000
}

fn default_burst() -> u32 {
    10
}

fn default_refill() -> Duration {
    Duration::from_secs(1)
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_log_level() -> String {
    "info".to_string()
}
