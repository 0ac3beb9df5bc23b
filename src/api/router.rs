// src/api/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

use super::{
    apps::{apps_for_shop_handler, diagnosis_handler},
    handlers::health_handler,
    reports::{most_reported_handler, submit_report_handler, trending_reports_handler},
    scan::{
        scan_history_handler, scan_report_handler, scan_status_handler, start_scan_handler,
    },
    timeline::{app_timeline_handler, impact_ranking_handler, performance_trend_handler},
};

/// Full application router: every endpoint under /api, with request tracing
/// and permissive CORS for the embedded admin UI.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(health_handler))

        // Scan lifecycle
        .route("/scan/start", post(start_scan_handler))
        .route("/scan/history/{shop}", get(scan_history_handler))
        .route("/scan/{job_id}", get(scan_status_handler))
        .route("/scan/{job_id}/report", get(scan_report_handler))

        // Latest-scan reads
        .route("/apps/{shop}", get(apps_for_shop_handler))
        .route("/diagnosis/{shop}", get(diagnosis_handler))

        // Timeline and performance
        .route("/timeline/{shop}/impact-ranking", get(impact_ranking_handler))
        .route("/timeline/{shop}/apps/{app_id}", get(app_timeline_handler))
        .route("/performance/{shop}/trend", get(performance_trend_handler))

        // Community reports
        .route("/reports", post(submit_report_handler))
        .route("/reports/most-reported", get(most_reported_handler))
        .route("/reports/trending", get(trending_reports_handler))

        .with_state(app_state);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
