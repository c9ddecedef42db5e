/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 },
///   "migrations": { "applied_migrations": 1, "latest_version": 20250101000001, "is_up_to_date": true }
/// }
/// ```
///
/// Always answers 200; a failing database shows up as `"degraded"`.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use softdesk_shared::db::{
    migrations::{get_migration_status, MigrationStatus},
    pool::{self, get_pool_stats, PoolStats},
};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    pub version: &'static str,

    pub database: &'static str,

    pub pool: PoolStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let migrations = if connected {
        get_migration_status(&state.db).await.ok()
    } else {
        None
    };

    let healthy = connected && migrations.as_ref().is_some_and(|m| m.is_up_to_date);

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: get_pool_stats(&state.db),
        migrations,
    })
}
