use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::InnerState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Welcome to the YouTube video fetcher API!"
    }))
}

/// Verifies that the video store answers.
pub async fn health_check(State(inner): State<InnerState>) -> Result<Json<Value>, AppError> {
    inner.store.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "connected"
    })))
}
