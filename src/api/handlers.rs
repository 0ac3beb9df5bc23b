// src/api/handlers.rs

use axum::Json;
use serde_json::json;

/// GET /api/health
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "sherlock",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
