// src/db/scan_store.rs
//! Persistence for scan jobs. The job row is the single point of mutable
//! shared state per scan; progress updates are monotone-guarded so a stale
//! writer can never move progress backwards, and terminal rows are never
//! rewritten.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Queued => "queued",
            ScanStatus::InProgress => "in_progress",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(ScanStatus::Queued),
            "in_progress" => Some(ScanStatus::InProgress),
            "completed" => Some(ScanStatus::Completed),
            "failed" => Some(ScanStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Quick,
    Full,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Quick => "quick",
            ScanType::Full => "full",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quick" => Some(ScanType::Quick),
            "full" => Some(ScanType::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanJob {
    pub id: String,
    pub shop: String,
    pub scan_type: ScanType,
    pub status: ScanStatus,
    pub progress: i64,
    pub error: Option<String>,
    pub issues_found: i64,
    pub apps_scanned: i64,
    pub report: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub struct ScanJobStore {
    pool: SqlitePool,
}

impl ScanJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new queued job and returns its id. The partial unique index
    /// over active jobs makes this the serialization point per shop: the
    /// insert itself fails with a Conflict while a queued or in_progress row
    /// exists, with no window between check and insert.
    pub async fn create(&self, shop: &str, scan_type: ScanType) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let inserted = sqlx::query(
            r#"
            INSERT INTO scan_jobs (id, shop, scan_type, status, progress, created_at)
            VALUES (?, ?, ?, 'queued', 0, ?)
            "#,
        )
        .bind(&id)
        .bind(shop)
        .bind(scan_type.as_str())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(Error::conflict(
                format!("a scan is already queued or running for {shop}"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get(&self, job_id: &str) -> Result<ScanJob> {
        let row = sqlx::query(
            r#"
            SELECT id, shop, scan_type, status, progress, error, issues_found,
                   apps_scanned, report, created_at, started_at, completed_at
            FROM scan_jobs
            WHERE id = ?
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("scan {job_id} not found")))?;

        Self::row_to_job(&row)
    }

    /// A shop's non-terminal job, if one exists. Used to serialize scans per
    /// shop: a second start while this returns Some is a Conflict.
    pub async fn find_non_terminal(&self, shop: &str) -> Result<Option<ScanJob>> {
        let row = sqlx::query(
            r#"
            SELECT id, shop, scan_type, status, progress, error, issues_found,
                   apps_scanned, report, created_at, started_at, completed_at
            FROM scan_jobs
            WHERE shop = ? AND status IN ('queued', 'in_progress')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_job).transpose()
    }

    /// Latest completed job for a shop, if any.
    pub async fn latest_completed(&self, shop: &str) -> Result<Option<ScanJob>> {
        let row = sqlx::query(
            r#"
            SELECT id, shop, scan_type, status, progress, error, issues_found,
                   apps_scanned, report, created_at, started_at, completed_at
            FROM scan_jobs
            WHERE shop = ? AND status = 'completed'
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_job).transpose()
    }

    pub async fn history(&self, shop: &str, limit: i64) -> Result<Vec<ScanJob>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, scan_type, status, progress, error, issues_found,
                   apps_scanned, report, created_at, started_at, completed_at
            FROM scan_jobs
            WHERE shop = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(shop)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_job).collect()
    }

    /// queued -> in_progress. Only fires for a queued row, so the transition
    /// happens exactly once, when execution actually begins.
    pub async fn mark_in_progress(&self, job_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_jobs
            SET status = 'in_progress', started_at = ?
            WHERE id = ? AND status = 'queued'
            "#,
        )
        .bind(Utc::now().naive_utc())
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Raises progress to `progress` if that is an increase; a lower value is
    /// ignored so progress stays monotone under any interleaving.
    pub async fn update_progress(&self, job_id: &str, progress: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_jobs
            SET progress = CASE WHEN ? > progress THEN ? ELSE progress END
            WHERE id = ? AND status = 'in_progress'
            "#,
        )
        .bind(progress)
        .bind(progress)
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// in_progress -> completed, with the finished report attached. Guarded
    /// so a terminal row is never rewritten.
    pub async fn complete(
        &self,
        job_id: &str,
        issues_found: i64,
        apps_scanned: i64,
        report: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_jobs
            SET status = 'completed', progress = 100, issues_found = ?,
                apps_scanned = ?, report = ?, completed_at = ?
            WHERE id = ? AND status = 'in_progress'
            "#,
        )
        .bind(issues_found)
        .bind(apps_scanned)
        .bind(serde_json::to_string(report)?)
        .bind(Utc::now().naive_utc())
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// queued|in_progress -> failed, recording the upstream message verbatim.
    pub async fn fail(&self, job_id: &str, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_jobs
            SET status = 'failed', error = ?, completed_at = ?
            WHERE id = ? AND status IN ('queued', 'in_progress')
            "#,
        )
        .bind(error)
        .bind(Utc::now().naive_utc())
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<ScanJob> {
        let status_str: String = row.get("status");
        let scan_type_str: String = row.get("scan_type");
        let report_str: Option<String> = row.get("report");

        let report = report_str
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(ScanJob {
            id: row.get("id"),
            shop: row.get("shop"),
            scan_type: ScanType::parse(&scan_type_str)
                .ok_or_else(|| Error::validation(format!("bad scan_type: {scan_type_str}")))?,
            status: ScanStatus::parse(&status_str)
                .ok_or_else(|| Error::validation(format!("bad status: {status_str}")))?,
            progress: row.get("progress"),
            error: row.get("error"),
            issues_found: row.get("issues_found"),
            apps_scanned: row.get("apps_scanned"),
            report,
            created_at: to_utc(row.get("created_at")),
            started_at: row
                .get::<Option<NaiveDateTime>, _>("started_at")
                .map(to_utc),
            completed_at: row
                .get::<Option<NaiveDateTime>, _>("completed_at")
                .map(to_utc),
        })
    }
}

pub(crate) fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}
