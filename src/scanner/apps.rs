// src/scanner/apps.rs
//! App inventory and risk scoring. Installed apps are inferred from the
//! shop's script tags and from app blocks referenced in the theme's
//! settings; each one is then scored against the curated registry.
//!
//! Scoring is deterministic: the same inputs at the same instant always
//! produce the same score and the same ordered reason list.

use chrono::{DateTime, Utc};

use crate::config::SherlockConfig;
use crate::riskdb::RiskDatabase;
use crate::shopify::types::ScriptTag;

/// An app observed on the shop, before scoring.
#[derive(Debug, Clone)]
pub struct AppFinding {
    pub name: String,
    pub handle: Option<String>,
    pub category: Option<String>,
    pub installed_on: Option<DateTime<Utc>>,
    pub injects_scripts: bool,
    pub modifies_theme: bool,
    pub script_srcs: Vec<String>,
}

/// A finding with its risk verdict attached.
#[derive(Debug, Clone)]
pub struct ScoredApp {
    pub finding: AppFinding,
    pub risk_score: f64,
    pub risk_reasons: Vec<String>,
    pub is_suspect: bool,
}

const UNKNOWN_APP_BASE_RISK: f64 = 15.0;

/// Builds the installed-app inventory from script tags plus the raw text of
/// the theme's settings_data.json (app embed blocks leave their handles in
/// there).
pub fn build_inventory(
    script_tags: &[ScriptTag],
    settings_data: Option<&str>,
    risk: &RiskDatabase,
) -> Vec<AppFinding> {
    let mut findings: Vec<AppFinding> = Vec::new();

    for tag in script_tags {
        let (name, handle, category) = identify_script(&tag.src, risk);

        match findings.iter_mut().find(|f| f.name == name) {
            Some(existing) => {
                existing.script_srcs.push(tag.src.clone());
                // Earliest sighting wins as the install date.
                if let Some(created) = tag.created_at {
                    existing.installed_on = Some(match existing.installed_on {
                        Some(prev) => prev.min(created),
                        None => created,
                    });
                }
            }
            None => findings.push(AppFinding {
                name,
                handle,
                category,
                installed_on: tag.created_at,
                injects_scripts: true,
                modifies_theme: false,
                script_srcs: vec![tag.src.clone()],
            }),
        }
    }

    // App embeds show up in settings_data.json even when the app registers
    // no script tag.
    if let Some(settings) = settings_data {
        let lowered = settings.to_lowercase();
        for entry in risk.registry_entries() {
            if !lowered.contains(entry.needle) {
                continue;
            }
            match findings
                .iter_mut()
                .find(|f| f.name == entry.display_name)
            {
                Some(existing) => existing.modifies_theme = true,
                None => findings.push(AppFinding {
                    name: entry.display_name.to_string(),
                    handle: Some(entry.needle.to_string()),
                    category: Some(entry.category.to_string()),
                    installed_on: None,
                    injects_scripts: false,
                    modifies_theme: true,
                    script_srcs: Vec::new(),
                }),
            }
        }
    }

    findings
}

/// Scores every finding against the registry, the recency ladder, and the
/// known-conflict table. Returned in input order; the caller sorts for
/// presentation.
pub fn score_inventory(
    findings: Vec<AppFinding>,
    now: DateTime<Utc>,
    config: &SherlockConfig,
    risk: &RiskDatabase,
) -> Vec<ScoredApp> {
    let installed: Vec<String> = findings.iter().map(|f| f.name.clone()).collect();

    findings
        .into_iter()
        .map(|finding| score_app(finding, &installed, now, config, risk))
        .collect()
}

fn score_app(
    finding: AppFinding,
    installed: &[String],
    now: DateTime<Utc>,
    config: &SherlockConfig,
    risk: &RiskDatabase,
) -> ScoredApp {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    match risk.registry_lookup(&finding.name) {
        Some(entry) => {
            score += entry.base_risk;
            reasons.push(format!("{} ({})", entry.rationale, entry.category));
        }
        None => {
            score += UNKNOWN_APP_BASE_RISK;
            reasons.push("not in the known-app registry".to_string());
        }
    }

    if finding.injects_scripts {
        score += config.script_injection_weight;
        reasons.push("injects scripts into the storefront".to_string());
    }

    if finding.modifies_theme {
        score += config.theme_modification_weight;
        reasons.push("modifies theme files".to_string());
    }

    if let Some(bonus) = recency_bonus(finding.installed_on, now, config) {
        score += bonus.0;
        reasons.push(format!("installed {} days ago", bonus.1));
    }

    if risk.has_conflict(&finding.name, installed) {
        score += config.known_conflict_weight;
        reasons.push("known conflict with another installed app".to_string());
    }

    let risk_score = score.min(100.0);
    ScoredApp {
        is_suspect: risk_score >= config.suspect_threshold,
        risk_score,
        risk_reasons: reasons,
        finding,
    }
}

/// Recent installs are the most likely culprits when something just broke.
/// The bonus decays in steps and stops entirely past the configured window.
fn recency_bonus(
    installed_on: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &SherlockConfig,
) -> Option<(f64, i64)> {
    let installed = installed_on?;
    let days = (now - installed).num_days();
    if days < 0 || days > config.recent_install_window_days {
        return None;
    }
    let bonus = match days {
        0..=1 => 30.0,
        2..=3 => 25.0,
        4..=7 => 20.0,
        _ => 10.0,
    };
    Some((bonus, days))
}

/// Identifies an app from a script URL: a registry hit names the app, an
/// unknown URL falls back to its host.
fn identify_script(src: &str, risk: &RiskDatabase) -> (String, Option<String>, Option<String>) {
    if let Some(entry) = risk.registry_lookup(src) {
        return (
            entry.display_name.to_string(),
            Some(entry.needle.to_string()),
            Some(entry.category.to_string()),
        );
    }
    (format!("Unknown ({})", host_of(src)), None, None)
}

fn host_of(src: &str) -> &str {
    let without_scheme = src
        .strip_prefix("https://")
        .or_else(|| src.strip_prefix("http://"))
        .or_else(|| src.strip_prefix("//"))
        .unwrap_or(src);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tag(id: i64, src: &str, age_days: i64) -> ScriptTag {
        ScriptTag {
            id,
            src: src.to_string(),
            display_scope: Some("online_store".to_string()),
            created_at: Some(Utc::now() - Duration::days(age_days)),
        }
    }

    #[test]
    fn registry_hit_names_the_app() {
        let risk = RiskDatabase::new();
        let tags = vec![tag(1, "https://cdn.pagefly.io/pagefly/loader.js", 100)];
        let inventory = build_inventory(&tags, None, &risk);
        assert_eq!(inventory.len(), 1);
        assert!(inventory[0].name.to_lowercase().contains("pagefly"));
        assert!(inventory[0].injects_scripts);
    }

    #[test]
    fn unknown_script_falls_back_to_host() {
        let risk = RiskDatabase::new();
        let tags = vec![tag(1, "https://cdn.obscure-widget.example/w.js", 100)];
        let inventory = build_inventory(&tags, None, &risk);
        assert_eq!(inventory[0].name, "Unknown (cdn.obscure-widget.example)");
    }

    #[test]
    fn settings_data_marks_theme_modification() {
        let risk = RiskDatabase::new();
        let tags = vec![tag(1, "https://a.klaviyo.com/media/js/onsite/onsite.js", 100)];
        let settings = r#"{"current":{"blocks":{"x":{"type":"shopify://apps/klaviyo/blocks/form"}}}}"#;
        let inventory = build_inventory(&tags, Some(settings), &risk);
        let klaviyo = inventory
            .iter()
            .find(|f| f.name.to_lowercase().contains("klaviyo"))
            .unwrap();
        assert!(klaviyo.injects_scripts);
        assert!(klaviyo.modifies_theme);
    }

    #[test]
    fn recent_install_raises_the_score() {
        let risk = RiskDatabase::new();
        let config = SherlockConfig::default();
        let now = Utc::now();

        let old = build_inventory(&[tag(1, "https://cdn.pagefly.io/x.js", 90)], None, &risk);
        let new = build_inventory(&[tag(1, "https://cdn.pagefly.io/x.js", 1)], None, &risk);

        let old_score = score_inventory(old, now, &config, &risk)[0].risk_score;
        let new_score = score_inventory(new, now, &config, &risk)[0].risk_score;
        assert!(new_score > old_score);
        assert_eq!(new_score - old_score, 30.0);
    }

    #[test]
    fn conflicting_pair_both_pick_up_the_conflict_weight() {
        let risk = RiskDatabase::new();
        let config = SherlockConfig::default();
        let tags = vec![
            tag(1, "https://cdn.pagefly.io/x.js", 90),
            tag(2, "https://cdn.gempages.net/y.js", 90),
        ];
        let scored = score_inventory(build_inventory(&tags, None, &risk), Utc::now(), &config, &risk);
        for app in &scored {
            assert!(app
                .risk_reasons
                .iter()
                .any(|r| r.contains("known conflict")));
            assert!(app.is_suspect);
        }
    }

    #[test]
    fn score_is_clamped_and_deterministic() {
        let risk = RiskDatabase::new();
        let config = SherlockConfig::default();
        let now = Utc::now();
        let tags = vec![
            tag(1, "https://cdn.pagefly.io/x.js", 0),
            tag(2, "https://cdn.gempages.net/y.js", 0),
        ];
        let settings = r#"{"type":"pagefly","other":"gempages"}"#;

        let a = score_inventory(
            build_inventory(&tags, Some(settings), &risk),
            now,
            &config,
            &risk,
        );
        let b = score_inventory(
            build_inventory(&tags, Some(settings), &risk),
            now,
            &config,
            &risk,
        );

        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.risk_score, y.risk_score);
            assert_eq!(x.risk_reasons, y.risk_reasons);
            assert!(x.risk_score <= 100.0);
        }
    }
}
