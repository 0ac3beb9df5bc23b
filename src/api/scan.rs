// src/api/scan.rs
// Scan lifecycle endpoints: start, poll, fetch report, history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{ScanJob, ScanType};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct StartScanRequest {
    pub shop_domain: String,
    pub access_token: String,
    #[serde(default)]
    pub scan_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    10
}

/// POST /api/scan/start. Queues the scan and returns the job row right
/// away; clients poll GET /api/scan/{job_id} until it turns terminal.
pub async fn start_scan_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartScanRequest>,
) -> ApiResult<(StatusCode, Json<ScanJob>)> {
    let scan_type = match req.scan_type.as_deref() {
        None => ScanType::Full,
        Some(raw) => ScanType::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown scan_type: {raw}")))?,
    };

    let job = state
        .orchestrator
        .start_scan(&req.shop_domain, &req.access_token, scan_type)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/scan/{job_id}
pub async fn scan_status_handler(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ScanJob>> {
    let job = state.orchestrator.get_status(&job_id).await?;
    Ok(Json(job))
}

/// GET /api/scan/{job_id}/report. 409 while the scan is still running.
pub async fn scan_report_handler(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let report = state.orchestrator.get_report(&job_id).await?;
    Ok(Json(report))
}

/// GET /api/scan/history/{shop}
pub async fn scan_history_handler(
    State(state): State<Arc<AppState>>,
    Path(shop): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ScanJob>>> {
    let limit = query.limit.clamp(1, 100);
    let jobs = state.scans.history(&shop, limit).await?;
    Ok(Json(jobs))
}
