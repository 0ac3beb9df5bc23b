// src/riskdb/mod.rs
//! Static risk reference data and the lookups over it: known app-to-app
//! conflicts, an app registry with base risk per app, orphan-code signatures
//! for attribution, and community-reported issue counts. Pure data, loaded
//! once, never mutated at runtime.

mod tables;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

/// A curated record of two apps reported to interfere with each other.
#[derive(Debug, Clone)]
pub struct ConflictEntry {
    pub apps: (&'static str, &'static str),
    pub severity: Severity,
    pub description: &'static str,
    pub resolution: &'static str,
    pub report_count: u32,
}

/// Base risk entry for a known app, matched by substring against app names
/// and script URLs.
#[derive(Debug, Clone)]
pub struct AppRegistryEntry {
    pub needle: &'static str,
    pub display_name: &'static str,
    pub base_risk: f64,
    pub category: &'static str,
    pub rationale: &'static str,
}

/// Text signatures an app leaves in theme code, used both to attribute live
/// injections and to spot orphan code after uninstall.
#[derive(Debug, Clone)]
pub struct OrphanSignature {
    pub app: &'static str,
    pub patterns: &'static [&'static str],
    pub cleanup_guide: &'static str,
}

#[derive(Debug, Clone)]
pub struct CommunityIssueEntry {
    pub app: &'static str,
    pub common_issues: &'static [&'static str],
    pub report_count: u32,
}

/// A conflict matched against a concrete set of installed apps.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedConflict {
    pub apps: (String, String),
    pub severity: Severity,
    pub description: String,
    pub resolution: String,
    pub report_count: u32,
}

static COMPILED_SIGNATURES: Lazy<Vec<(&'static OrphanSignature, Vec<Regex>)>> =
    Lazy::new(|| {
        tables::ORPHAN_SIGNATURES
            .iter()
            .map(|sig| {
                let regexes = sig
                    .patterns
                    .iter()
                    .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern compiles"))
                    .collect();
                (sig, regexes)
            })
            .collect()
    });

/// Read-only lookup facade over the curated tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskDatabase;

impl RiskDatabase {
    pub fn new() -> Self {
        RiskDatabase
    }

    /// Registry entry for an app name, matched by substring.
    pub fn registry_lookup(&self, app_name: &str) -> Option<&'static AppRegistryEntry> {
        let needle = app_name.to_lowercase();
        // Longer needles first so "bold subscriptions" wins over "bold".
        tables::APP_REGISTRY
            .iter()
            .filter(|e| needle.contains(e.needle))
            .max_by_key(|e| e.needle.len())
    }

    /// Every registry entry, for callers that sweep the whole table.
    pub fn registry_entries(&self) -> impl Iterator<Item = &'static AppRegistryEntry> {
        tables::APP_REGISTRY.iter()
    }

    /// All known conflicts where both apps appear in the installed set.
    /// Sorted worst-first.
    pub fn check_conflicts(&self, installed: &[String]) -> Vec<MatchedConflict> {
        let lowered: Vec<String> = installed.iter().map(|a| a.to_lowercase()).collect();
        let matches_installed =
            |needle: &str| lowered.iter().any(|name| name.contains(needle));

        let mut found: Vec<MatchedConflict> = tables::KNOWN_CONFLICTS
            .iter()
            .filter(|c| matches_installed(c.apps.0) && matches_installed(c.apps.1))
            .map(|c| MatchedConflict {
                apps: (c.apps.0.to_string(), c.apps.1.to_string()),
                severity: c.severity,
                description: c.description.to_string(),
                resolution: c.resolution.to_string(),
                report_count: c.report_count,
            })
            .collect();

        found.sort_by(|a, b| b.severity.cmp(&a.severity).then(b.report_count.cmp(&a.report_count)));
        found
    }

    /// True when the app participates in any conflict with the rest of the
    /// installed set.
    pub fn has_conflict(&self, app_name: &str, installed: &[String]) -> bool {
        let needle = app_name.to_lowercase();
        self.check_conflicts(installed)
            .iter()
            .any(|c| needle.contains(&c.apps.0) || needle.contains(&c.apps.1))
    }

    /// Groups of installed apps that duplicate each other's functionality.
    pub fn duplicate_functionality(
        &self,
        installed: &[String],
    ) -> BTreeMap<&'static str, Vec<String>> {
        let lowered: Vec<String> = installed.iter().map(|a| a.to_lowercase()).collect();
        let mut duplicates = BTreeMap::new();

        for (category, members) in tables::FUNCTIONALITY_GROUPS {
            let mut found: Vec<String> = Vec::new();
            for member in *members {
                for name in &lowered {
                    if name.contains(member) && !found.contains(name) {
                        found.push(name.clone());
                    }
                }
            }
            if found.len() > 1 {
                duplicates.insert(*category, found);
            }
        }

        duplicates
    }

    /// Orphan-code signatures with their compiled regexes.
    pub fn signatures(&self) -> impl Iterator<Item = (&'static OrphanSignature, &'static [Regex])> {
        COMPILED_SIGNATURES
            .iter()
            .map(|(sig, regexes)| (*sig, regexes.as_slice()))
    }

    /// Community-reported issue record for an app, if any.
    pub fn community_issues(&self, app_name: &str) -> Option<&'static CommunityIssueEntry> {
        let needle = app_name.to_lowercase();
        tables::COMMUNITY_ISSUES
            .iter()
            .find(|e| needle.contains(e.app) || e.app.contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_prefers_longest_needle() {
        let db = RiskDatabase::new();
        let entry = db.registry_lookup("Bold Subscriptions").unwrap();
        assert_eq!(entry.category, "subscription");
        assert_eq!(entry.base_risk, 30.0);

        let entry = db.registry_lookup("Bold Upsell").unwrap();
        assert_eq!(entry.category, "checkout");
    }

    #[test]
    fn conflicts_require_both_sides_installed() {
        let db = RiskDatabase::new();

        let one_side = vec!["PageFly Page Builder".to_string()];
        assert!(db.check_conflicts(&one_side).is_empty());

        let both = vec![
            "PageFly Page Builder".to_string(),
            "GemPages Landing Pages".to_string(),
        ];
        let conflicts = db.check_conflicts(&both);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::High);
        assert!(db.has_conflict("PageFly Page Builder", &both));
    }

    #[test]
    fn conflicts_sorted_worst_first() {
        let db = RiskDatabase::new();
        let installed = vec![
            "Loox".to_string(),
            "Judge.me".to_string(),
            "PageFly".to_string(),
            "Shogun".to_string(),
        ];
        let conflicts = db.check_conflicts(&installed);
        assert!(conflicts.len() >= 2);
        assert_eq!(conflicts[0].severity, Severity::High);
    }

    #[test]
    fn duplicate_functionality_groups_by_category() {
        let db = RiskDatabase::new();
        let installed = vec![
            "Loox Photo Reviews".to_string(),
            "Yotpo Reviews".to_string(),
            "Tidio Chat".to_string(),
        ];
        let dupes = db.duplicate_functionality(&installed);
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes["reviews"].len(), 2);
    }

    #[test]
    fn community_issues_match_by_substring() {
        let db = RiskDatabase::new();
        let entry = db.community_issues("PageFly Page Builder").unwrap();
        assert!(entry.report_count > 1000);
        assert!(entry
            .common_issues
            .iter()
            .any(|i| i.to_lowercase().contains("orphan")));

        assert!(db.community_issues("Obscure Widget").is_none());
    }

    #[test]
    fn signatures_compile_and_match() {
        let db = RiskDatabase::new();
        let mut matched = None;
        for (sig, regexes) in db.signatures() {
            if sig.app == "Klaviyo" {
                assert!(regexes.iter().any(|r| r.is_match("var _learnq = [];")));
                matched = Some(sig.app);
            }
        }
        assert_eq!(matched, Some("Klaviyo"));
    }
}
