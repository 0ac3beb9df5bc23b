// src/api/reports.rs
// Community report submission and the aggregates built from it.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{
    CommunityReport, ReportedAppAggregate, TrendingIssue, REPORTABLE_ISSUE_TYPES,
};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub app_name: String,
    pub issue_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MostReportedQuery {
    #[serde(default = "default_report_limit")]
    pub limit: i64,
}

fn default_report_limit() -> i64 {
    10
}

/// POST /api/reports
pub async fn submit_report_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitReportRequest>,
) -> ApiResult<(StatusCode, Json<CommunityReport>)> {
    let app_name = req.app_name.trim();
    if app_name.is_empty() {
        return Err(ApiError::bad_request("app_name must not be empty"));
    }
    if !REPORTABLE_ISSUE_TYPES.contains(&req.issue_type.as_str()) {
        return Err(ApiError::bad_request(format!(
            "issue_type must be one of: {}",
            REPORTABLE_ISSUE_TYPES.join(", ")
        )));
    }

    let report = state
        .reports
        .insert(app_name, &req.issue_type, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/reports/most-reported?limit=10
pub async fn most_reported_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MostReportedQuery>,
) -> ApiResult<Json<Vec<ReportedAppAggregate>>> {
    let limit = query.limit.clamp(1, 100);
    let aggregates = state.reports.most_reported(limit).await?;
    Ok(Json(aggregates))
}

/// GET /api/reports/trending. Issue types by volume inside the configured
/// trailing window.
pub async fn trending_reports_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TrendingIssue>>> {
    let trending = state
        .reports
        .trending(state.config.trending_window_days)
        .await?;
    Ok(Json(trending))
}
