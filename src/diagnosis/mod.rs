// src/diagnosis/mod.rs
//! The diagnosis engine. Pure synthesis over the latest scan's rows: it
//! names a primary suspect when one app's risk clears the confidence bar,
//! surfaces known conflicts, and emits an ordered action list a merchant
//! can work through top to bottom.

use serde::Serialize;

use crate::config::SherlockConfig;
use crate::db::{InstalledApp, ThemeIssue, ThemeIssueType};
use crate::riskdb::{MatchedConflict, RiskDatabase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    Healthy,
    IssuesFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuspectSummary {
    pub app_name: String,
    pub risk_score: f64,
    pub risk_reasons: Vec<String>,
    /// Curated issues other merchants have reported for this app.
    pub known_issues: Vec<String>,
    pub community_report_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedAction {
    pub priority: u32,
    pub action: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub status: DiagnosisStatus,
    pub primary_suspect: Option<SuspectSummary>,
    pub suspects: Vec<SuspectSummary>,
    pub known_conflicts: Vec<MatchedConflict>,
    pub theme_issue_count: usize,
    pub orphan_apps: Vec<String>,
    pub recommended_actions: Vec<RecommendedAction>,
}

/// Builds the diagnosis from one scan's apps and theme issues. Deterministic
/// over its inputs; reads nothing else.
pub fn diagnose(
    apps: &[InstalledApp],
    issues: &[ThemeIssue],
    config: &SherlockConfig,
    risk: &RiskDatabase,
) -> Diagnosis {
    let installed: Vec<String> = apps.iter().map(|a| a.app_name.clone()).collect();
    let known_conflicts = risk.check_conflicts(&installed);
    let duplicates = risk.duplicate_functionality(&installed);

    let mut suspects: Vec<SuspectSummary> = apps
        .iter()
        .filter(|a| a.is_suspect)
        .map(|a| {
            let curated = risk.community_issues(&a.app_name);
            SuspectSummary {
                app_name: a.app_name.clone(),
                risk_score: a.risk_score,
                risk_reasons: a.risk_reasons.clone(),
                known_issues: curated
                    .map(|e| e.common_issues.iter().map(|s| s.to_string()).collect())
                    .unwrap_or_default(),
                community_report_count: curated.map(|e| e.report_count).unwrap_or(0),
            }
        })
        .collect();
    suspects.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // A primary suspect needs to clear the higher confidence bar, not just
    // the suspect threshold.
    let primary_suspect = suspects
        .first()
        .filter(|s| s.risk_score >= config.confidence_threshold)
        .cloned();

    let orphan_apps: Vec<String> = {
        let mut names: Vec<String> = issues
            .iter()
            .filter(|i| i.issue_type == ThemeIssueType::OrphanCode)
            .filter_map(|i| i.likely_source.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    };

    let has_css_issues = issues.iter().any(|i| {
        matches!(
            i.issue_type,
            ThemeIssueType::CssConflict | ThemeIssueType::GlobalCss
        )
    });
    let has_duplicate_code = issues
        .iter()
        .any(|i| i.issue_type == ThemeIssueType::DuplicateCode);

    let mut actions = Vec::new();
    let mut priority = 1u32;

    for conflict in &known_conflicts {
        actions.push(RecommendedAction {
            priority,
            action: format!(
                "Resolve the conflict between {} and {}: {}",
                conflict.apps.0, conflict.apps.1, conflict.resolution
            ),
            reason: format!(
                "{} ({} merchant reports)",
                conflict.description, conflict.report_count
            ),
        });
        priority += 1;
    }

    if let Some(suspect) = &primary_suspect {
        let mut reason = format!(
            "highest risk score ({:.0}): {}",
            suspect.risk_score,
            suspect.risk_reasons.join("; ")
        );
        if suspect.community_report_count > 0 {
            reason.push_str(&format!(
                "; {} merchant reports on record",
                suspect.community_report_count
            ));
        }
        actions.push(RecommendedAction {
            priority,
            action: format!(
                "Temporarily disable {} and check whether the problem persists",
                suspect.app_name
            ),
            reason,
        });
        priority += 1;
    }

    if !orphan_apps.is_empty() {
        actions.push(RecommendedAction {
            priority,
            action: format!(
                "Remove leftover theme code from uninstalled app(s): {}",
                orphan_apps.join(", ")
            ),
            reason: "orphan code still runs on the storefront after uninstall".to_string(),
        });
        priority += 1;
    }

    for (category, members) in &duplicates {
        actions.push(RecommendedAction {
            priority,
            action: format!(
                "Keep one {} app and remove the rest: {}",
                category,
                members.join(", ")
            ),
            reason: "overlapping apps double up scripts and fight over the same elements"
                .to_string(),
        });
        priority += 1;
    }

    if has_css_issues {
        actions.push(RecommendedAction {
            priority,
            action: "Scope or namespace app stylesheets that define generic class names"
                .to_string(),
            reason: "unscoped app CSS overrides theme styling".to_string(),
        });
        priority += 1;
    }

    if has_duplicate_code {
        actions.push(RecommendedAction {
            priority,
            action: "Deduplicate external scripts loaded from multiple theme files".to_string(),
            reason: "the same script loading twice slows every affected page".to_string(),
        });
    }

    let status = if actions.is_empty() && suspects.is_empty() && issues.is_empty() {
        DiagnosisStatus::Healthy
    } else {
        DiagnosisStatus::IssuesFound
    };

    Diagnosis {
        status,
        primary_suspect,
        suspects,
        known_conflicts,
        theme_issue_count: issues.len(),
        orphan_apps,
        recommended_actions: actions,
    }
}
