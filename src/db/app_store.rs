// src/db/app_store.rs
//! Installed-app snapshot rows. A fresh set is written per scan; old rows
//! stay around so the timeline can compare across scans.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::Result;

use super::scan_store::to_utc;

#[derive(Debug, Clone, Serialize)]
pub struct InstalledApp {
    pub id: String,
    pub shop: String,
    pub scan_job_id: String,
    pub app_name: String,
    pub app_handle: Option<String>,
    pub installed_on: Option<DateTime<Utc>>,
    pub injects_scripts: bool,
    pub modifies_theme: bool,
    pub risk_score: f64,
    pub risk_reasons: Vec<String>,
    pub is_suspect: bool,
    pub category: Option<String>,
    pub last_scanned: Option<DateTime<Utc>>,
}

pub struct InstalledAppStore {
    pool: SqlitePool,
}

impl InstalledAppStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes one snapshot row. `is_suspect` is computed by the caller from
    /// the score and threshold and is never set independently.
    pub async fn insert(&self, app: &InstalledApp) -> Result<String> {
        let id = if app.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            app.id.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO installed_apps (
                id, shop, scan_job_id, app_name, app_handle, installed_on,
                injects_scripts, modifies_theme, risk_score, risk_reasons,
                is_suspect, category, last_scanned
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&app.shop)
        .bind(&app.scan_job_id)
        .bind(&app.app_name)
        .bind(&app.app_handle)
        .bind(app.installed_on.map(|t| t.naive_utc()))
        .bind(app.injects_scripts)
        .bind(app.modifies_theme)
        .bind(app.risk_score)
        .bind(serde_json::to_string(&app.risk_reasons)?)
        .bind(app.is_suspect)
        .bind(&app.category)
        .bind(app.last_scanned.map(|t| t.naive_utc()))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Apps recorded by one scan, descending by risk score with newer
    /// installs winning ties.
    pub async fn for_scan(&self, scan_job_id: &str) -> Result<Vec<InstalledApp>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, scan_job_id, app_name, app_handle, installed_on,
                   injects_scripts, modifies_theme, risk_score, risk_reasons,
                   is_suspect, category, last_scanned
            FROM installed_apps
            WHERE scan_job_id = ?
            ORDER BY risk_score DESC, installed_on DESC
            "#,
        )
        .bind(scan_job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_app).collect()
    }

    /// Every snapshot row for a shop that carries an install date, oldest
    /// install first. Feeds the timeline correlation.
    pub async fn with_install_dates(&self, shop: &str) -> Result<Vec<InstalledApp>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, scan_job_id, app_name, app_handle, installed_on,
                   injects_scripts, modifies_theme, risk_score, risk_reasons,
                   is_suspect, category, last_scanned
            FROM installed_apps
            WHERE shop = ? AND installed_on IS NOT NULL
            ORDER BY installed_on ASC
            "#,
        )
        .bind(shop)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_app).collect()
    }

    pub async fn get(&self, app_id: &str) -> Result<Option<InstalledApp>> {
        let row = sqlx::query(
            r#"
            SELECT id, shop, scan_job_id, app_name, app_handle, installed_on,
                   injects_scripts, modifies_theme, risk_score, risk_reasons,
                   is_suspect, category, last_scanned
            FROM installed_apps
            WHERE id = ?
            "#,
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_app).transpose()
    }

    fn row_to_app(row: &sqlx::sqlite::SqliteRow) -> Result<InstalledApp> {
        let reasons: Option<String> = row.get("risk_reasons");
        let risk_reasons = reasons
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok(InstalledApp {
            id: row.get("id"),
            shop: row.get("shop"),
            scan_job_id: row.get("scan_job_id"),
            app_name: row.get("app_name"),
            app_handle: row.get("app_handle"),
            installed_on: row
                .get::<Option<NaiveDateTime>, _>("installed_on")
                .map(to_utc),
            injects_scripts: row.get("injects_scripts"),
            modifies_theme: row.get("modifies_theme"),
            risk_score: row.get("risk_score"),
            risk_reasons,
            is_suspect: row.get("is_suspect"),
            category: row.get("category"),
            last_scanned: row
                .get::<Option<NaiveDateTime>, _>("last_scanned")
                .map(to_utc),
        })
    }
}
