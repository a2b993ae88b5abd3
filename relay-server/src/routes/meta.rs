use axum::response::Json;
use serde_json::{Value, json};

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Weather API is running" }))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
