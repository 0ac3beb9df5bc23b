// src/db/migration.rs
//! Startup schema setup. Every statement is idempotent; run on every boot.

use anyhow::Result;
use sqlx::SqlitePool;

const CREATE_SCAN_JOBS: &str = r#"
CREATE TABLE IF NOT EXISTS scan_jobs (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    scan_type TEXT NOT NULL CHECK (scan_type IN ('quick', 'full')),
    status TEXT NOT NULL CHECK (status IN ('queued', 'in_progress', 'completed', 'failed')),
    progress INTEGER NOT NULL DEFAULT 0,
    error TEXT,
    issues_found INTEGER NOT NULL DEFAULT 0,
    apps_scanned INTEGER NOT NULL DEFAULT 0,
    report TEXT,
    created_at DATETIME NOT NULL,
    started_at DATETIME,
    completed_at DATETIME
);
"#;

const CREATE_INSTALLED_APPS: &str = r#"
CREATE TABLE IF NOT EXISTS installed_apps (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    scan_job_id TEXT NOT NULL REFERENCES scan_jobs(id) ON DELETE CASCADE,
    app_name TEXT NOT NULL,
    app_handle TEXT,
    installed_on DATETIME,
    injects_scripts BOOLEAN NOT NULL DEFAULT FALSE,
    modifies_theme BOOLEAN NOT NULL DEFAULT FALSE,
    risk_score REAL NOT NULL DEFAULT 0,
    risk_reasons TEXT,
    is_suspect BOOLEAN NOT NULL DEFAULT FALSE,
    category TEXT,
    last_scanned DATETIME
);
"#;

const CREATE_THEME_ISSUES: &str = r#"
CREATE TABLE IF NOT EXISTS theme_issues (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    scan_job_id TEXT NOT NULL REFERENCES scan_jobs(id) ON DELETE CASCADE,
    file_path TEXT NOT NULL,
    issue_type TEXT NOT NULL,
    severity TEXT NOT NULL DEFAULT 'medium',
    description TEXT NOT NULL,
    code_snippet TEXT,
    likely_source TEXT,
    detected_at DATETIME NOT NULL
);
"#;

const CREATE_PERFORMANCE_SNAPSHOTS: &str = r#"
CREATE TABLE IF NOT EXISTS performance_snapshots (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    page TEXT NOT NULL,
    load_time_ms INTEGER NOT NULL,
    score REAL NOT NULL,
    annotation TEXT,
    recorded_at DATETIME NOT NULL
);
"#;

const CREATE_COMMUNITY_REPORTS: &str = r#"
CREATE TABLE IF NOT EXISTS community_reports (
    id TEXT PRIMARY KEY,
    app_name TEXT NOT NULL,
    issue_type TEXT NOT NULL,
    description TEXT,
    submitted_at DATETIME NOT NULL
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_scan_jobs_shop ON scan_jobs(shop, status);
CREATE UNIQUE INDEX IF NOT EXISTS idx_scan_jobs_one_active
    ON scan_jobs(shop) WHERE status IN ('queued', 'in_progress');
CREATE INDEX IF NOT EXISTS idx_installed_apps_scan ON installed_apps(scan_job_id);
CREATE INDEX IF NOT EXISTS idx_installed_apps_shop ON installed_apps(shop, is_suspect);
CREATE INDEX IF NOT EXISTS idx_theme_issues_scan ON theme_issues(scan_job_id);
CREATE INDEX IF NOT EXISTS idx_perf_shop_time ON performance_snapshots(shop, recorded_at);
CREATE INDEX IF NOT EXISTS idx_reports_app ON community_reports(app_name);
CREATE INDEX IF NOT EXISTS idx_reports_time ON community_reports(submitted_at);
"#;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for statement in [
        CREATE_SCAN_JOBS,
        CREATE_INSTALLED_APPS,
        CREATE_THEME_ISSUES,
        CREATE_PERFORMANCE_SNAPSHOTS,
        CREATE_COMMUNITY_REPORTS,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    // Index statements run one at a time; sqlite's execute handles a single
    // statement per call.
    for statement in CREATE_INDICES.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
