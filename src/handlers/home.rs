use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - API overview
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Job Tracker",
            "version": version,
            "description": "Tracks job listings and applications across search periods",
            "endpoints": {
                "jobs": "/jobs[/new | /:id[/edit]]",
                "time_periods": "/time_periods[/new | /:id[/edit]]",
                "health": "/health",
            },
        }
    }))
}

/// GET /health - storage connectivity
pub async fn health(State(state): State<AppState>) -> ApiResult<Map<String, Value>> {
    let store = state.store();

    match store.ping().await {
        Ok(()) => {
            let mut data = Map::new();
            data.insert("status".to_string(), json!("ok"));
            data.insert("timestamp".to_string(), json!(chrono::Utc::now()));
            data.insert("store".to_string(), json!(store.backend()));
            Ok(ApiResponse::success(data))
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("storage unavailable"))
        }
    }
}
