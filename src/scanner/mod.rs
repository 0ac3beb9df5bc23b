// src/scanner/mod.rs
//! Scan analysis passes. Each submodule is a pure analysis over fetched
//! inputs; the orchestrator does the fetching and persists whatever the
//! passes return.

pub mod apps;
pub mod css;
pub mod performance;
pub mod theme;

use crate::db::ThemeIssueType;
use crate::riskdb::Severity;

/// A theme issue produced by an analysis pass, before it is tied to a shop
/// and scan job and written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueDraft {
    pub file_path: String,
    pub issue_type: ThemeIssueType,
    pub severity: Severity,
    pub description: String,
    pub code_snippet: Option<String>,
    pub likely_source: Option<String>,
}
