//! Prometheus metrics registry and recording middleware.

mod middleware;
mod prometheus;

pub use self::middleware::track_requests;
pub use self::prometheus::Metrics;
