//! Health check endpoint for liveness checks

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status (always "ok" when responding)
    pub status: String,
}

/// Returns 200 OK while the API server is running. Does not touch the
/// GraphQL backend.
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok".to_string() }))
}
