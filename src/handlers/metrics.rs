// SPDX-License-Identifier: Apache-2.0
use crate::metrics::Metrics;
use axum::{extract::State, http::header, response::IntoResponse};

/// Prometheus scrape endpoint.
///
/// Renders every registered metric in the text exposition format.
///
/// # Endpoint
/// `GET /metrics`
pub async fn metrics_handler(State(metrics): State<Metrics>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics.encode(),
    )
}
