// src/orchestrator/mod.rs
//! Scan lifecycle. One non-terminal job per shop at a time; the job row is
//! the only shared state between the HTTP layer and the background task, so
//! clients just poll the job until it turns terminal.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::SherlockConfig;
use crate::db::{
    InstalledApp, InstalledAppStore, PerformanceStore, ScanJob, ScanJobStore, ScanStatus,
    ScanType, ThemeIssue, ThemeIssueStore,
};
use crate::diagnosis;
use crate::error::{Error, Result};
use crate::riskdb::RiskDatabase;
use crate::scanner::{apps, css, performance, theme, IssueDraft};
use crate::shopify::types::PageCategory;
use crate::shopify::ShopifyApi;

#[derive(Clone)]
pub struct ScanOrchestrator {
    config: SherlockConfig,
    shopify: Arc<dyn ShopifyApi>,
    risk: RiskDatabase,
    scans: Arc<ScanJobStore>,
    apps: Arc<InstalledAppStore>,
    issues: Arc<ThemeIssueStore>,
    perf: Arc<PerformanceStore>,
}

impl ScanOrchestrator {
    pub fn new(
        config: SherlockConfig,
        shopify: Arc<dyn ShopifyApi>,
        risk: RiskDatabase,
        scans: Arc<ScanJobStore>,
        apps: Arc<InstalledAppStore>,
        issues: Arc<ThemeIssueStore>,
        perf: Arc<PerformanceStore>,
    ) -> Self {
        Self {
            config,
            shopify,
            risk,
            scans,
            apps,
            issues,
            perf,
        }
    }

    /// Validates the request, rejects a second concurrent scan for the same
    /// shop, inserts the queued job, and spawns the background run. Returns
    /// the queued job row immediately.
    pub async fn start_scan(
        &self,
        shop: &str,
        token: &str,
        scan_type: ScanType,
    ) -> Result<ScanJob> {
        validate_shop(shop)?;
        if token.trim().is_empty() {
            return Err(Error::validation("access_token must not be empty"));
        }

        // Friendly rejection naming the active job. The store's unique index
        // on active jobs is the real guard: racing starts that both pass this
        // check still resolve to a single inserted row.
        if let Some(active) = self.scans.find_non_terminal(shop).await? {
            return Err(Error::conflict(format!(
                "scan {} already {} for {}",
                active.id,
                active.status.as_str(),
                shop
            )));
        }

        let job_id = self.scans.create(shop, scan_type).await?;
        info!(%job_id, shop, scan_type = scan_type.as_str(), "scan queued");

        let orchestrator = self.clone();
        let shop = shop.to_string();
        let token = token.to_string();
        let spawned_id = job_id.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator
                .execute(&spawned_id, &shop, &token, scan_type)
                .await
            {
                error!(job_id = %spawned_id, shop, %err, "scan failed");
                if let Err(db_err) = orchestrator.scans.fail(&spawned_id, &err.to_string()).await {
                    error!(job_id = %spawned_id, %db_err, "could not record scan failure");
                }
            }
        });

        self.scans.get(&job_id).await
    }

    pub async fn get_status(&self, job_id: &str) -> Result<ScanJob> {
        self.scans.get(job_id).await
    }

    /// The finished report, gated on the job actually being done.
    pub async fn get_report(&self, job_id: &str) -> Result<serde_json::Value> {
        let job = self.scans.get(job_id).await?;
        match job.status {
            ScanStatus::Completed => job
                .report
                .ok_or_else(|| Error::not_found(format!("scan {job_id} has no report"))),
            ScanStatus::Failed => Err(Error::conflict(format!(
                "scan {job_id} failed: {}",
                job.error.unwrap_or_else(|| "unknown error".to_string())
            ))),
            _ => Err(Error::not_ready(format!(
                "scan {job_id} is {} ({}%)",
                job.status.as_str(),
                job.progress
            ))),
        }
    }

    async fn execute(
        &self,
        job_id: &str,
        shop: &str,
        token: &str,
        scan_type: ScanType,
    ) -> Result<()> {
        self.scans.mark_in_progress(job_id).await?;
        info!(%job_id, shop, "scan running");

        let full = scan_type == ScanType::Full;

        // App inventory first; the other passes need to know what is
        // installed.
        let scored = self.scan_apps(job_id, shop, token, full).await?;
        let installed: Vec<String> = scored.iter().map(|a| a.app_name.clone()).collect();
        self.scans
            .update_progress(job_id, if full { 25 } else { 50 })
            .await?;

        let mut theme_issues: Vec<ThemeIssue> = Vec::new();
        if full {
            theme_issues = self.scan_theme(job_id, shop, token, &installed).await?;
            self.scans.update_progress(job_id, 50).await?;

            self.scan_performance(shop).await?;
            self.scans.update_progress(job_id, 75).await?;
        }

        let verdict = diagnosis::diagnose(&scored, &theme_issues, &self.config, &self.risk);
        let issues_found = theme_issues.len() + verdict.known_conflicts.len();
        let apps_scanned = scored.len();

        let report = json!({
            "shop": shop,
            "scan_type": scan_type.as_str(),
            "completed_at": Utc::now(),
            "apps": scored,
            "theme_issues": theme_issues,
            "diagnosis": verdict,
        });

        self.scans
            .complete(job_id, issues_found as i64, apps_scanned as i64, &report)
            .await?;
        info!(%job_id, shop, issues_found, apps_scanned, "scan completed");
        Ok(())
    }

    /// Inventory and risk-scoring pass. Persists one row per app and
    /// returns them risk-ordered.
    async fn scan_apps(
        &self,
        job_id: &str,
        shop: &str,
        token: &str,
        include_theme_settings: bool,
    ) -> Result<Vec<InstalledApp>> {
        let tags = self.shopify.fetch_script_tags(shop, token).await?;

        let settings_data = if include_theme_settings {
            match self.shopify.fetch_main_theme(shop, token).await? {
                Some(main) => {
                    self.shopify
                        .fetch_asset(shop, token, main.id, "config/settings_data.json")
                        .await?
                }
                None => None,
            }
        } else {
            None
        };

        let inventory = apps::build_inventory(&tags, settings_data.as_deref(), &self.risk);
        let now = Utc::now();
        let scored = apps::score_inventory(inventory, now, &self.config, &self.risk);

        for app in &scored {
            let row = InstalledApp {
                id: String::new(),
                shop: shop.to_string(),
                scan_job_id: job_id.to_string(),
                app_name: app.finding.name.clone(),
                app_handle: app.finding.handle.clone(),
                installed_on: app.finding.installed_on,
                injects_scripts: app.finding.injects_scripts,
                modifies_theme: app.finding.modifies_theme,
                risk_score: app.risk_score,
                risk_reasons: app.risk_reasons.clone(),
                is_suspect: app.is_suspect,
                category: app.finding.category.clone(),
                last_scanned: Some(now),
            };
            self.apps.insert(&row).await?;
        }

        self.apps.for_scan(job_id).await
    }

    /// Theme text pass: signatures, stylesheets, duplicated scripts.
    async fn scan_theme(
        &self,
        job_id: &str,
        shop: &str,
        token: &str,
        installed: &[String],
    ) -> Result<Vec<ThemeIssue>> {
        let Some(main) = self.shopify.fetch_main_theme(shop, token).await? else {
            warn!(%job_id, shop, "no published theme; skipping theme analysis");
            return Ok(Vec::new());
        };

        let keys = self.shopify.fetch_asset_keys(shop, token, main.id).await?;
        let selected = theme::select_files(&keys, self.config.max_theme_files);

        let mut drafts: Vec<IssueDraft> = Vec::new();
        let mut liquid_files: Vec<(String, String)> = Vec::new();

        for key in &selected {
            let Some(content) = self.shopify.fetch_asset(shop, token, main.id, key).await? else {
                continue;
            };
            if key.ends_with(".css") {
                drafts.extend(css::analyze_css(key, &content));
            } else if key.ends_with(".liquid") {
                drafts.extend(theme::analyze_liquid(key, &content, installed, &self.risk));
                liquid_files.push((key.clone(), content));
            }
        }

        drafts.extend(theme::find_duplicate_scripts(&liquid_files));

        let now = Utc::now();
        for draft in drafts {
            let issue = ThemeIssue {
                id: String::new(),
                shop: shop.to_string(),
                scan_job_id: job_id.to_string(),
                file_path: draft.file_path,
                issue_type: draft.issue_type,
                severity: draft.severity,
                description: draft.description,
                code_snippet: draft.code_snippet,
                likely_source: draft.likely_source,
                detected_at: now,
            };
            self.issues.insert(&issue).await?;
        }

        self.issues.for_scan(job_id).await
    }

    /// Times the four storefront pages and appends snapshots.
    async fn scan_performance(&self, shop: &str) -> Result<()> {
        let now = Utc::now();
        for page in PageCategory::ALL {
            let timing = self.shopify.measure_page(shop, page).await?;
            let snapshot =
                performance::snapshot_from_timing(shop, &timing, None, now, &self.config);
            self.perf.insert(&snapshot).await?;
        }
        Ok(())
    }
}

fn validate_shop(shop: &str) -> Result<()> {
    let trimmed = shop.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("shop must not be empty"));
    }
    if !trimmed.ends_with(".myshopify.com") || trimmed.contains(char::is_whitespace) {
        return Err(Error::validation(format!(
            "shop must be a *.myshopify.com domain, got {trimmed:?}"
        )));
    }
    Ok(())
}
