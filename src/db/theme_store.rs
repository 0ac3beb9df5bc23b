// src/db/theme_store.rs
//! Theme issue rows. Written during a scan, immutable afterwards, and always
//! tied to a job that has left the queued state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::riskdb::Severity;

use super::scan_store::to_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeIssueType {
    CssConflict,
    InjectedScript,
    DuplicateCode,
    GlobalCss,
    OrphanCode,
}

impl ThemeIssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeIssueType::CssConflict => "css_conflict",
            ThemeIssueType::InjectedScript => "injected_script",
            ThemeIssueType::DuplicateCode => "duplicate_code",
            ThemeIssueType::GlobalCss => "global_css",
            ThemeIssueType::OrphanCode => "orphan_code",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "css_conflict" => Some(ThemeIssueType::CssConflict),
            "injected_script" => Some(ThemeIssueType::InjectedScript),
            "duplicate_code" => Some(ThemeIssueType::DuplicateCode),
            "global_css" => Some(ThemeIssueType::GlobalCss),
            "orphan_code" => Some(ThemeIssueType::OrphanCode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeIssue {
    pub id: String,
    pub shop: String,
    pub scan_job_id: String,
    pub file_path: String,
    pub issue_type: ThemeIssueType,
    pub severity: Severity,
    pub description: String,
    pub code_snippet: Option<String>,
    pub likely_source: Option<String>,
    pub detected_at: DateTime<Utc>,
}

pub struct ThemeIssueStore {
    pool: SqlitePool,
}

impl ThemeIssueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, issue: &ThemeIssue) -> Result<String> {
        let id = if issue.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            issue.id.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO theme_issues (
                id, shop, scan_job_id, file_path, issue_type, severity,
                description, code_snippet, likely_source, detected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&issue.shop)
        .bind(&issue.scan_job_id)
        .bind(&issue.file_path)
        .bind(issue.issue_type.as_str())
        .bind(issue.severity.as_str())
        .bind(&issue.description)
        .bind(&issue.code_snippet)
        .bind(&issue.likely_source)
        .bind(issue.detected_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Issues recorded by one scan, worst severity first.
    pub async fn for_scan(&self, scan_job_id: &str) -> Result<Vec<ThemeIssue>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, scan_job_id, file_path, issue_type, severity,
                   description, code_snippet, likely_source, detected_at
            FROM theme_issues
            WHERE scan_job_id = ?
            ORDER BY CASE severity
                WHEN 'high' THEN 0
                WHEN 'medium' THEN 1
                ELSE 2
            END, detected_at ASC
            "#,
        )
        .bind(scan_job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_issue).collect()
    }

    fn row_to_issue(row: &sqlx::sqlite::SqliteRow) -> Result<ThemeIssue> {
        let issue_type_str: String = row.get("issue_type");
        let severity_str: String = row.get("severity");

        Ok(ThemeIssue {
            id: row.get("id"),
            shop: row.get("shop"),
            scan_job_id: row.get("scan_job_id"),
            file_path: row.get("file_path"),
            issue_type: ThemeIssueType::parse(&issue_type_str).ok_or_else(|| {
                Error::validation(format!("bad issue_type: {issue_type_str}"))
            })?,
            severity: Severity::parse(&severity_str)
                .ok_or_else(|| Error::validation(format!("bad severity: {severity_str}")))?,
            description: row.get("description"),
            code_snippet: row.get("code_snippet"),
            likely_source: row.get("likely_source"),
            detected_at: to_utc(row.get("detected_at")),
        })
    }
}
