use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Unauthenticated.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
