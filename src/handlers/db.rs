// SPDX-License-Identifier: Apache-2.0
use crate::db::DbProber;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Database connectivity check endpoint.
///
/// Runs one connectivity probe and reports the outcome as data: both a
/// reachable and an unreachable database produce a 200 response, with the
/// failure description carried in the body.
///
/// # Endpoint
/// `GET /db`
pub async fn db_check(State(prober): State<DbProber>) -> Response {
    let result = prober.probe().await;
    (StatusCode::OK, Json(result)).into_response()
}
