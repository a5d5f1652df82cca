use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter, UpDownCounter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

use crate::error::{RatedError, Result};

pub mod labels {
    pub const OUTCOME: &str = "outcome";
    pub const TIMEOUT_TYPE: &str = "timeout_type";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

pub mod values {
    pub const OUTCOME_ALLOWED: &str = "allowed";
    pub const OUTCOME_LIMITED: &str = "limited";
    pub const OUTCOME_BAD_REQUEST: &str = "bad_request";
    pub const OUTCOME_HELP: &str = "help";
    pub const TIMEOUT_IDLE: &str = "idle";
    pub const TIMEOUT_DRAIN: &str = "drain";
}

#[derive(Clone)]
pub struct Metrics {
    pub connections_total: Counter<u64>,
    pub connections_active: UpDownCounter<i64>,

    // outcome label: "allowed" | "limited" | "bad_request" | "help"
    pub requests_total: Counter<u64>,
    pub decision_duration_seconds: Histogram<f64>,

    pub timeouts_total: Counter<u64>,

    // Build info
    pub build_info: Gauge<u64>,
}

impl Metrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            connections_total: meter
                .u64_counter("rated_connections_total")
                .with_description("Total number of connections accepted")
                .build(),
            connections_active: meter
                .i64_up_down_counter("rated_connections_active")
                .with_description("Number of connections currently being served")
                .build(),

            requests_total: meter
                .u64_counter("rated_requests_total")
                .with_description("Total number of requests by outcome")
                .build(),
            decision_duration_seconds: meter
                .f64_histogram("rated_decision_duration_seconds")
                .with_description("Time spent in the limiter deciding one request, in seconds")
                .build(),

            timeouts_total: meter
                .u64_counter("rated_timeouts_total")
                .with_description("Total number of connections cut by a timeout")
                .build(),

            build_info: meter
                .u64_gauge("rated_build_info")
                .with_description("Build information")
                .build(),
        }
    }

    pub fn set_build_info(&self) {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = option_env!("CARGO_PKG_RUST_VERSION")
            .filter(|v| !v.is_empty())
            .unwrap_or("unknown");

        self.build_info.record(
            1,
            &[
                KeyValue::new(labels::VERSION, version),
                KeyValue::new(labels::RUST_VERSION, rust_version),
            ],
        );
    }

    pub fn record_request(&self, outcome: &'static str) {
        self.requests_total
            .add(1, &[KeyValue::new(labels::OUTCOME, outcome)]);
    }

    pub fn record_decision_duration(&self, duration_secs: f64) {
        self.decision_duration_seconds.record(duration_secs, &[]);
    }

    pub fn record_connection_opened(&self) {
        self.connections_total.add(1, &[]);
        self.connections_active.add(1, &[]);
    }

    pub fn record_connection_closed(&self) {
        self.connections_active.add(-1, &[]);
    }

    pub fn record_timeout(&self, timeout_type: &'static str) {
        self.timeouts_total
            .add(1, &[KeyValue::new(labels::TIMEOUT_TYPE, timeout_type)]);
    }
}

/// Set up the Prometheus exporter and the global meter provider.
///
/// Returns the metric handles and the registry the observability server
/// renders on `/metrics`.
pub fn init_metrics() -> Result<(Arc<Metrics>, Registry)> {
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| RatedError::Telemetry(format!("Failed to build Prometheus exporter: {e}")))?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("rated");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
