// src/scanner/theme.rs
//! Theme text analysis. Walks a bounded set of liquid files looking for app
//! signatures, attributes them to installed apps or flags them as orphan
//! code, and spots the same external script pulled in from several files.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::ThemeIssueType;
use crate::riskdb::{RiskDatabase, Severity};

use super::IssueDraft;

/// Files every scan reads when present, in scan order. The layout file comes
/// first because code there runs on every page.
pub const CORE_THEME_FILES: &[&str] = &[
    "layout/theme.liquid",
    "templates/index.liquid",
    "templates/product.liquid",
    "templates/collection.liquid",
    "templates/cart.liquid",
];

static SCRIPT_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script[^>]*\ssrc\s*=\s*["']([^"']+)["']"#).expect("static regex compiles")
});

/// Picks which theme files a scan will fetch: the core set, then snippets
/// and stylesheets, capped at `max_files`.
pub fn select_files(asset_keys: &[String], max_files: usize) -> Vec<String> {
    let mut selected: Vec<String> = CORE_THEME_FILES
        .iter()
        .filter(|core| asset_keys.iter().any(|k| k == *core))
        .map(|core| core.to_string())
        .collect();

    for key in asset_keys {
        if selected.len() >= max_files {
            break;
        }
        let wanted = (key.starts_with("snippets/") && key.ends_with(".liquid"))
            || (key.starts_with("assets/") && key.ends_with(".css"))
            || key == "config/settings_data.json";
        if wanted && !selected.contains(key) {
            selected.push(key.clone());
        }
    }

    selected.truncate(max_files);
    selected
}

/// Signature pass over one liquid file. A signature match is an injected
/// script when its app is still installed, orphan code when it is not.
pub fn analyze_liquid(
    file_path: &str,
    content: &str,
    installed_apps: &[String],
    risk: &RiskDatabase,
) -> Vec<IssueDraft> {
    let lowered_installed: Vec<String> =
        installed_apps.iter().map(|a| a.to_lowercase()).collect();
    let mut issues = Vec::new();

    for (sig, regexes) in risk.signatures() {
        let Some(matched) = regexes.iter().find_map(|re| re.find(content)) else {
            continue;
        };

        let app_needle = sig.app.to_lowercase();
        let still_installed = lowered_installed.iter().any(|name| name.contains(&app_needle));
        let snippet = snippet_around(content, matched.start());

        if still_installed {
            issues.push(IssueDraft {
                file_path: file_path.to_string(),
                issue_type: ThemeIssueType::InjectedScript,
                severity: file_criticality(file_path).min(Severity::Medium),
                description: format!("{} code injected into {}", sig.app, file_path),
                code_snippet: Some(snippet),
                likely_source: Some(sig.app.to_string()),
            });
        } else {
            issues.push(IssueDraft {
                file_path: file_path.to_string(),
                issue_type: ThemeIssueType::OrphanCode,
                severity: file_criticality(file_path),
                description: format!(
                    "leftover {} code but the app is no longer installed. {}",
                    sig.app, sig.cleanup_guide
                ),
                code_snippet: Some(snippet),
                likely_source: Some(sig.app.to_string()),
            });
        }
    }

    issues
}

/// Flags external scripts pulled in from more than one theme file. Each
/// duplicated URL yields one issue listing the files involved.
pub fn find_duplicate_scripts(files: &[(String, String)]) -> Vec<IssueDraft> {
    let mut by_src: BTreeMap<String, Vec<&str>> = BTreeMap::new();

    for (path, content) in files {
        for cap in SCRIPT_SRC_RE.captures_iter(content) {
            let src = cap[1].to_lowercase();
            // Relative asset references are theme-internal, not app loads.
            if !src.starts_with("http") && !src.starts_with("//") {
                continue;
            }
            let entry = by_src.entry(src).or_default();
            if !entry.contains(&path.as_str()) {
                entry.push(path);
            }
        }
    }

    by_src
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(src, paths)| IssueDraft {
            file_path: paths[0].to_string(),
            issue_type: ThemeIssueType::DuplicateCode,
            severity: Severity::Medium,
            description: format!(
                "script {} loaded from {} files: {}",
                src,
                paths.len(),
                paths.join(", ")
            ),
            code_snippet: Some(src),
            likely_source: None,
        })
        .collect()
}

/// How much a problem in this file hurts: layout code runs on every page.
pub(super) fn file_criticality(file_path: &str) -> Severity {
    if file_path.starts_with("layout/") {
        Severity::High
    } else if file_path.starts_with("templates/") {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn snippet_around(content: &str, offset: usize) -> String {
    let line = content[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = content[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(content.len());
    let mut snippet = content[line..end].trim().to_string();
    if snippet.len() > 160 {
        snippet.truncate(160);
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_files_selected_first_and_capped() {
        let keys: Vec<String> = vec![
            "assets/app.css".to_string(),
            "templates/product.liquid".to_string(),
            "layout/theme.liquid".to_string(),
            "snippets/a.liquid".to_string(),
            "snippets/b.liquid".to_string(),
            "sections/header.liquid".to_string(),
        ];
        let selected = select_files(&keys, 4);
        assert_eq!(selected[0], "layout/theme.liquid");
        assert_eq!(selected[1], "templates/product.liquid");
        assert_eq!(selected.len(), 4);
        assert!(!selected.contains(&"sections/header.liquid".to_string()));
    }

    #[test]
    fn installed_app_signature_is_an_injection() {
        let risk = RiskDatabase::new();
        let installed = vec!["Klaviyo Email Marketing".to_string()];
        let content = "<script>var _learnq = _learnq || [];</script>";

        let issues = analyze_liquid("layout/theme.liquid", content, &installed, &risk);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, ThemeIssueType::InjectedScript);
        assert_eq!(issues[0].likely_source.as_deref(), Some("Klaviyo"));
    }

    #[test]
    fn uninstalled_app_signature_is_orphan_code() {
        let risk = RiskDatabase::new();
        let installed = vec!["Loox Photo Reviews".to_string()];
        let content = "<script>var _learnq = _learnq || [];</script>";

        let issues = analyze_liquid("layout/theme.liquid", content, &installed, &risk);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, ThemeIssueType::OrphanCode);
        assert_eq!(issues[0].severity, Severity::High);
        assert!(issues[0].description.contains("no longer installed"));
    }

    #[test]
    fn duplicate_external_script_is_flagged_once() {
        let files = vec![
            (
                "layout/theme.liquid".to_string(),
                r#"<script src="https://cdn.x.io/app.js"></script>"#.to_string(),
            ),
            (
                "templates/product.liquid".to_string(),
                r#"<script src="https://cdn.x.io/app.js"></script>"#.to_string(),
            ),
            (
                "templates/cart.liquid".to_string(),
                r#"<script src="{{ 'theme.js' | asset_url }}"></script>"#.to_string(),
            ),
        ];
        let issues = find_duplicate_scripts(&files);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, ThemeIssueType::DuplicateCode);
        assert!(issues[0].description.contains("2 files"));
    }
}
