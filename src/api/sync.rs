//! Sync status and manual trigger endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::sync::{SyncAuditEntry, SyncStatus},
    services::sync::SyncReport,
    AppState,
};

/// Passive sync status indicator
#[utoipa::path(
    get,
    path = "/sync/status",
    tag = "sync",
    responses(
        (status = 200, description = "Unsynced counter and last audit entry", body = SyncStatus)
    )
)]
pub async fn status(State(state): State<AppState>) -> AppResult<Json<SyncStatus>> {
    let status = state.services.sync.sync_status().await?;
    Ok(Json(status))
}

/// Recent sync audit entries for the admin view
#[utoipa::path(
    get,
    path = "/sync/log",
    tag = "sync",
    responses(
        (status = 200, description = "Most recent audit entries", body = [SyncAuditEntry])
    )
)]
pub async fn log(State(state): State<AppState>) -> AppResult<Json<Vec<SyncAuditEntry>>> {
    let entries = state.services.sync.recent_log(10).await?;
    Ok(Json(entries))
}

/// Run one push pass immediately
#[utoipa::path(
    post,
    path = "/sync/now",
    tag = "sync",
    responses(
        (status = 200, description = "Push pass outcome", body = SyncReport)
    )
)]
pub async fn sync_now(State(state): State<AppState>) -> AppResult<Json<SyncReport>> {
    let report = state.services.sync.sync_now().await?;
    Ok(Json(report))
}

/// Force a reference-data pull
#[utoipa::path(
    post,
    path = "/sync/refresh-employees",
    tag = "sync",
    responses(
        (status = 200, description = "Pull outcome", body = SyncReport)
    )
)]
pub async fn refresh_employees(State(state): State<AppState>) -> AppResult<Json<SyncReport>> {
    let report = state.services.sync.refresh_reference().await?;
    Ok(Json(report))
}
