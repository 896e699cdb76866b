use crate::metrics::Metrics;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Record one counter increment and one latency observation per request.
///
/// The downstream handler runs to completion first; the status label is
/// taken from the response it produced. The response itself passes
/// through unmodified.
pub async fn track_requests(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let endpoint = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    metrics.record_request(
        method.as_str(),
        &endpoint,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
