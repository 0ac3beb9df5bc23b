// src/db/report_store.rs
//! User-submitted community reports. Append-only; served back as
//! "most reported apps" and "trending issues" aggregates.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::Result;

use super::scan_store::to_utc;

/// Issue types a merchant can report against an app.
pub const REPORTABLE_ISSUE_TYPES: &[&str] = &[
    "slowdown",
    "theme_conflict",
    "checkout_issue",
    "visual_glitch",
    "poor_support",
    "other",
];

#[derive(Debug, Clone, Serialize)]
pub struct CommunityReport {
    pub id: String,
    pub app_name: String,
    pub issue_type: String,
    pub description: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportedAppAggregate {
    pub app_name: String,
    pub total_reports: i64,
    pub last_reported: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingIssue {
    pub issue_type: String,
    pub report_count: i64,
}

pub struct CommunityReportStore {
    pool: SqlitePool,
}

impl CommunityReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        app_name: &str,
        issue_type: &str,
        description: Option<&str>,
    ) -> Result<CommunityReport> {
        let report = CommunityReport {
            id: Uuid::new_v4().to_string(),
            app_name: app_name.to_string(),
            issue_type: issue_type.to_string(),
            description: description.map(str::to_string),
            submitted_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO community_reports (id, app_name, issue_type, description, submitted_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.app_name)
        .bind(&report.issue_type)
        .bind(&report.description)
        .bind(report.submitted_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(report)
    }

    /// Apps ordered by all-time report volume.
    pub async fn most_reported(&self, limit: i64) -> Result<Vec<ReportedAppAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT app_name, COUNT(*) AS total_reports, MAX(submitted_at) AS last_reported
            FROM community_reports
            GROUP BY app_name
            ORDER BY total_reports DESC, last_reported DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ReportedAppAggregate {
                app_name: row.get("app_name"),
                total_reports: row.get("total_reports"),
                last_reported: to_utc(row.get("last_reported")),
            })
            .collect())
    }

    /// Issue types ranked by report volume inside a recent window.
    pub async fn trending(&self, window_days: i64) -> Result<Vec<TrendingIssue>> {
        let since = Utc::now() - Duration::days(window_days);

        let rows = sqlx::query(
            r#"
            SELECT issue_type, COUNT(*) AS report_count
            FROM community_reports
            WHERE submitted_at >= ?
            GROUP BY issue_type
            ORDER BY report_count DESC
            "#,
        )
        .bind(since.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TrendingIssue {
                issue_type: row.get("issue_type"),
                report_count: row.get("report_count"),
            })
            .collect())
    }
}
