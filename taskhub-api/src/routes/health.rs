/// Health check endpoint
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// Reports process liveness and database reachability
///
/// # Endpoint
///
/// `GET /health` (public, no authentication)
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_ok = taskhub_shared::db::pool::health_check(&state.db).await.is_ok();

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
