// src/api/timeline.rs
// Install-timeline correlation endpoints plus the raw performance trend.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{InstalledApp, PerformanceSnapshot};
use crate::state::AppState;
use crate::timeline::{self, AppImpact};

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default = "default_trend_days")]
    pub days: i64,
}

fn default_trend_days() -> i64 {
    30
}

#[derive(Serialize)]
pub struct ImpactRankingResponse {
    pub shop: String,
    pub ranking: Vec<AppImpact>,
}

#[derive(Serialize)]
pub struct AppTimelineResponse {
    pub app: InstalledApp,
    /// None when there are no snapshots on both sides of the install date.
    pub impact: Option<AppImpact>,
}

#[derive(Serialize)]
pub struct TrendResponse {
    pub shop: String,
    pub days: i64,
    pub snapshots: Vec<PerformanceSnapshot>,
}

/// GET /api/timeline/{shop}/impact-ranking. Apps ranked by measured
/// before/after impact, worst first.
pub async fn impact_ranking_handler(
    State(state): State<Arc<AppState>>,
    Path(shop): Path<String>,
) -> ApiResult<Json<ImpactRankingResponse>> {
    let apps = state.apps.with_install_dates(&shop).await?;
    let snapshots = state.perf.for_shop(&shop).await?;
    let ranking = timeline::impact_ranking(&apps, &snapshots, &state.config);

    Ok(Json(ImpactRankingResponse { shop, ranking }))
}

/// GET /api/timeline/{shop}/apps/{app_id}. Before/after detail for one app.
pub async fn app_timeline_handler(
    State(state): State<Arc<AppState>>,
    Path((shop, app_id)): Path<(String, String)>,
) -> ApiResult<Json<AppTimelineResponse>> {
    let app = state
        .apps
        .get(&app_id)
        .await?
        .filter(|a| a.shop == shop)
        .ok_or_else(|| ApiError::not_found(format!("app {app_id} not found for {shop}")))?;

    let snapshots = state.perf.for_shop(&shop).await?;
    let impact = timeline::app_impact(&app, &snapshots, &state.config);

    Ok(Json(AppTimelineResponse { app, impact }))
}

/// GET /api/performance/{shop}/trend?days=30
pub async fn performance_trend_handler(
    State(state): State<Arc<AppState>>,
    Path(shop): Path<String>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<TrendResponse>> {
    let days = query.days.clamp(1, 365);
    let since = Utc::now() - Duration::days(days);
    let snapshots = state.perf.for_shop_since(&shop, since).await?;

    Ok(Json(TrendResponse {
        shop,
        days,
        snapshots,
    }))
}
