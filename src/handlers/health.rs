// SPDX-License-Identifier: Apache-2.0
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Root response body.
#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    status: &'static str,
}

/// Health check response body.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Service banner endpoint.
///
/// Returns a fixed greeting so a fresh deployment can be spot-checked
/// from a browser or curl.
///
/// # Endpoint
/// `GET /`
pub async fn root() -> Response {
    let response = RootResponse {
        message: "Hello from Kubernetes!",
        status: "ok",
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Kubernetes liveness probe endpoint.
///
/// Returns 200 OK if the process is alive. This endpoint should always
/// return success unless the process is deadlocked.
///
/// # Endpoint
/// `GET /health`
pub async fn health() -> Response {
    let response = HealthResponse { status: "healthy" };
    (StatusCode::OK, Json(response)).into_response()
}
