//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Report service health along with database and storage reachability.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health report")),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match &state.db_pool {
        Some(pool) => {
            match tokio::time::timeout(CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await
            {
                Ok(Ok(_)) => "ok",
                Ok(Err(e)) => {
                    warn!(error = %e, "Database health check failed");
                    "error"
                }
                Err(_) => {
                    warn!("Database health check timed out");
                    "timeout"
                }
            }
        }
        None => "not_configured",
    };

    // Storage trouble degrades the report without failing it.
    let storage = match tokio::time::timeout(
        CHECK_TIMEOUT,
        state.storage.exists("health-check-non-existent-key"),
    )
    .await
    {
        Ok(Ok(_)) => "ok",
        Ok(Err(e)) => {
            warn!(error = %e, "Storage health check failed");
            "degraded"
        }
        Err(_) => {
            warn!("Storage health check timed out");
            "timeout"
        }
    };

    let status = if database == "error" || database == "timeout" {
        "degraded"
    } else {
        "ok"
    };

    Json(json!({
        "status": status,
        "database": database,
        "storage": storage,
    }))
}
