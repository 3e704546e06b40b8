//! Prometheus metrics for Hermes.
//!
//! Recording goes through the `metrics` facade, so every function here is a
//! no-op until a recorder is installed with [`init_metrics`].
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_requests_total` | Counter | `route`, `code`, `status` | Completed pipeline runs |
//! | `hermes_request_duration_seconds` | Histogram | `route` | Pipeline latency |
//! | `hermes_handler_duration_seconds` | Histogram | `function` | Handler latency |
//! | `hermes_handler_panics_total` | Counter | `function` | Recovered panics |
//! | `hermes_in_flight_requests` | Gauge | - | Runs in progress |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Completed pipeline runs.
pub const REQUESTS_TOTAL: &str = "hermes_requests_total";
/// Pipeline latency in seconds.
pub const REQUEST_DURATION: &str = "hermes_request_duration_seconds";
/// Handler latency in seconds.
pub const HANDLER_DURATION: &str = "hermes_handler_duration_seconds";
/// Recovered panics.
pub const HANDLER_PANICS: &str = "hermes_handler_panics_total";
/// Pipeline runs in progress.
pub const IN_FLIGHT: &str = "hermes_in_flight_requests";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are exported.
    pub enabled: bool,

    /// Address the scrape endpoint listens on (e.g., "0.0.0.0:9090").
    pub addr: String,

    /// Value of the `service` label attached to every metric.
    pub service_name: String,

    /// Histogram buckets for the duration metrics, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            service_name: "hermes".to_string(),
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder and spawns its scrape listener.
///
/// Must be called from within a Tokio runtime. Calling it again after a
/// successful install fails with [`TelemetryError::MetricsInit`].
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| TelemetryError::MetricsInit(format!("no tokio runtime: {e}")))?;

    let builder = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .with_http_listener(addr);
    let builder = if config.duration_buckets.is_empty() {
        builder
    } else {
        builder
            .set_buckets_for_metric(
                Matcher::Suffix("_duration_seconds".to_string()),
                &config.duration_buckets,
            )
            .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
    };

    let (recorder, exporter) = {
        let _guard = runtime.enter();
        builder
            .build()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
    };

    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);

    runtime.spawn(async move {
        if let Err(e) = exporter.await {
            tracing::error!(error = ?e, "metrics exporter stopped");
        }
    });

    describe_metrics();
    tracing::info!(%addr, "metrics endpoint listening");

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for the standard metrics with the installed
/// recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests processed by the pipeline");
    describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Pipeline run duration in seconds"
    );
    describe_histogram!(
        HANDLER_DURATION,
        metrics::Unit::Seconds,
        "Handler invocation duration in seconds"
    );
    describe_counter!(HANDLER_PANICS, "Total number of recovered panics");
    describe_gauge!(IN_FLIGHT, "Number of pipeline runs in progress");
}

/// Records a completed pipeline run.
pub fn record_request(route: &str, code: &str, status: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route.to_string(),
        "code" => code.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "route" => route.to_string()).record(duration.as_secs_f64());
}

/// Records a handler invocation.
pub fn record_handler(function: &str, duration: Duration) {
    histogram!(HANDLER_DURATION, "function" => function.to_string())
        .record(duration.as_secs_f64());
}

/// Records a recovered panic. `function` is empty when the panic came from a
/// hook rather than a handler.
pub fn record_panic(function: &str) {
    counter!(HANDLER_PANICS, "function" => function.to_string()).increment(1);
}

/// Guard that keeps the in-flight gauge raised while alive.
///
/// The gauge is lowered on drop, so it stays balanced when a run unwinds.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Raises the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}
