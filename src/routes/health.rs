use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::Store;
use crate::AppState;

/// Health check endpoint
///
/// Reports whether the server is up and its storage is reachable.
/// Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "message": "Compliance API is running",
                "database": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "ERROR",
                    "message": "Database unavailable",
                    "database": "disconnected",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
        }
    }
}
