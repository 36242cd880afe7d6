use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
///
/// Reports the configured provider and how many reports are cached.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let sdk = state.sdk.inner();
    let cached = sdk.cache().map(|c| c.len()).unwrap_or(0);
    Json(json!({
        "ok": true,
        "provider": sdk.provider_name(),
        "cached_reports": cached
    }))
}
