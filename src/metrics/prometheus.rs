use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Process-wide HTTP request metrics.
///
/// One instance is created at startup and shared, by cloning, between the
/// recording middleware and the `/metrics` handler. Clones share the
/// underlying registry, so increments are visible everywhere.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Request counter: http_requests_total{method, endpoint, status}
    request_total: CounterVec,

    /// Request latency histogram: http_request_duration_seconds{endpoint}
    request_duration: HistogramVec,
}

impl Metrics {
    /// Create a new metrics registry with both collectors registered.
    pub fn new() -> Self {
        let request_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status"],
        )
        .expect("failed to create http_requests_total counter");

        // Latency buckets from 1ms to 10s (exponential)
        let request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency").buckets(
                vec![
                    0.001, 0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            ),
            &["endpoint"],
        )
        .expect("failed to create http_request_duration_seconds histogram");

        let registry = Registry::new();
        registry
            .register(Box::new(request_total.clone()))
            .expect("failed to register http_requests_total");
        registry
            .register(Box::new(request_duration.clone()))
            .expect("failed to register http_request_duration_seconds");

        Self {
            registry: Arc::new(registry),
            request_total,
            request_duration,
        }
    }

    /// Record one completed request.
    ///
    /// Increments the counter by exactly 1 and observes the wall-clock
    /// duration in seconds.
    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, duration: Duration) {
        let status = status.to_string();

        self.request_total
            .with_label_values(&[method, endpoint, &status])
            .inc();
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(duration.as_secs_f64());
    }

    /// Encode the current registry state in Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("failed to encode metrics");
        String::from_utf8(buffer).expect("metrics are not valid UTF-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
