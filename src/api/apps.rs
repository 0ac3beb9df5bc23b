// src/api/apps.rs
// Read endpoints over the latest completed scan: the scored app inventory
// and the synthesized diagnosis.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{InstalledApp, ScanJob};
use crate::diagnosis::{self, Diagnosis};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Serialize)]
pub struct ShopAppsResponse {
    pub shop: String,
    pub scan_job_id: String,
    pub scanned_at: chrono::DateTime<chrono::Utc>,
    pub total: usize,
    pub suspect_count: usize,
    pub apps: Vec<InstalledApp>,
}

#[derive(Serialize)]
pub struct DiagnosisResponse {
    pub shop: String,
    pub scan_job_id: String,
    pub diagnosis: Diagnosis,
}

/// GET /api/apps/{shop}. The app inventory from the latest completed scan,
/// riskiest first.
pub async fn apps_for_shop_handler(
    State(state): State<Arc<AppState>>,
    Path(shop): Path<String>,
) -> ApiResult<Json<ShopAppsResponse>> {
    let scan = latest_completed(&state, &shop).await?;
    let apps = state.apps.for_scan(&scan.id).await?;

    Ok(Json(ShopAppsResponse {
        shop,
        scanned_at: scan.completed_at.unwrap_or(scan.created_at),
        scan_job_id: scan.id,
        total: apps.len(),
        suspect_count: apps.iter().filter(|a| a.is_suspect).count(),
        apps,
    }))
}

/// GET /api/diagnosis/{shop}. Re-runs the diagnosis over the latest
/// completed scan's rows, so threshold tuning shows up without a rescan.
pub async fn diagnosis_handler(
    State(state): State<Arc<AppState>>,
    Path(shop): Path<String>,
) -> ApiResult<Json<DiagnosisResponse>> {
    let scan = latest_completed(&state, &shop).await?;
    let apps = state.apps.for_scan(&scan.id).await?;
    let issues = state.issues.for_scan(&scan.id).await?;

    let diagnosis = diagnosis::diagnose(&apps, &issues, &state.config, &state.risk);

    Ok(Json(DiagnosisResponse {
        shop,
        scan_job_id: scan.id,
        diagnosis,
    }))
}

async fn latest_completed(state: &AppState, shop: &str) -> Result<ScanJob, ApiError> {
    state
        .scans
        .latest_completed(shop)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no completed scan for {shop}")))
}
