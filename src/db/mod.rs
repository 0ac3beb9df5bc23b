// src/db/mod.rs

pub mod app_store;
pub mod migration;
pub mod perf_store;
pub mod report_store;
pub mod scan_store;
pub mod theme_store;

pub use app_store::{InstalledApp, InstalledAppStore};
pub use migration::run_migrations;
pub use perf_store::{PerformanceSnapshot, PerformanceStore};
pub use report_store::{
    CommunityReport, CommunityReportStore, ReportedAppAggregate, TrendingIssue,
    REPORTABLE_ISSUE_TYPES,
};
pub use scan_store::{ScanJob, ScanJobStore, ScanStatus, ScanType};
pub use theme_store::{ThemeIssue, ThemeIssueStore, ThemeIssueType};
