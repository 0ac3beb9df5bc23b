// src/state.rs

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::SherlockConfig;
use crate::db::{
    CommunityReportStore, InstalledAppStore, PerformanceStore, ScanJobStore, ThemeIssueStore,
};
use crate::orchestrator::ScanOrchestrator;
use crate::riskdb::RiskDatabase;
use crate::shopify::ShopifyApi;

/// Everything the HTTP handlers need, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: SherlockConfig,
    pub risk: RiskDatabase,

    // -------- Storage --------
    pub scans: Arc<ScanJobStore>,
    pub apps: Arc<InstalledAppStore>,
    pub issues: Arc<ThemeIssueStore>,
    pub perf: Arc<PerformanceStore>,
    pub reports: Arc<CommunityReportStore>,

    // -------- Services --------
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    pub fn new(config: SherlockConfig, pool: SqlitePool, shopify: Arc<dyn ShopifyApi>) -> Self {
        let risk = RiskDatabase::new();
        let scans = Arc::new(ScanJobStore::new(pool.clone()));
        let apps = Arc::new(InstalledAppStore::new(pool.clone()));
        let issues = Arc::new(ThemeIssueStore::new(pool.clone()));
        let perf = Arc::new(PerformanceStore::new(pool.clone()));
        let reports = Arc::new(CommunityReportStore::new(pool));

        let orchestrator = Arc::new(ScanOrchestrator::new(
            config.clone(),
            shopify,
            risk,
            scans.clone(),
            apps.clone(),
            issues.clone(),
            perf.clone(),
        ));

        Self {
            config,
            risk,
            scans,
            apps,
            issues,
            perf,
            reports,
            orchestrator,
        }
    }
}
