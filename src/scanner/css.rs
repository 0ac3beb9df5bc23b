// src/scanner/css.rs
//! Stylesheet heuristics. App stylesheets that define generic, unprefixed
//! class names or lean on `!important` tend to bleed into the merchant's
//! theme; both patterns are flagged here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::ThemeIssueType;
use crate::riskdb::Severity;

use super::theme::file_criticality;
use super::IssueDraft;

/// Class names so generic that an app defining them unprefixed will fight
/// the theme over styling.
const GENERIC_CLASSES: &[&str] = &[
    "btn", "button", "container", "wrapper", "header", "footer", "title",
    "content", "card", "row", "col", "modal", "active", "hidden", "overlay",
];

static IMPORTANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\s*important").expect("static regex compiles"));

static CLASS_SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    // A class selector at a rule boundary: `.btn {`, `.btn,` or `.btn:hover`.
    Regex::new(r"\.([A-Za-z][A-Za-z0-9_-]*)\s*[,{:\s]").expect("static regex compiles")
});

const IMPORTANT_THRESHOLD: usize = 10;

/// Flags generic unprefixed selectors and heavy `!important` use in one
/// stylesheet.
pub fn analyze_css(file_path: &str, content: &str) -> Vec<IssueDraft> {
    let mut issues = Vec::new();

    let mut generic_hits: Vec<&str> = Vec::new();
    for cap in CLASS_SELECTOR_RE.captures_iter(content) {
        let class = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let lowered = class.to_lowercase();
        if GENERIC_CLASSES.contains(&lowered.as_str()) && !generic_hits.contains(&class) {
            generic_hits.push(class);
        }
    }

    if !generic_hits.is_empty() {
        let severity = if generic_hits.len() >= 5 {
            Severity::High
        } else {
            file_criticality(file_path).max(Severity::Medium)
        };
        issues.push(IssueDraft {
            file_path: file_path.to_string(),
            issue_type: ThemeIssueType::GlobalCss,
            severity,
            description: format!(
                "defines {} generic unprefixed class selector(s) that can override theme styles: {}",
                generic_hits.len(),
                generic_hits.join(", ")
            ),
            code_snippet: Some(generic_hits.iter().map(|c| format!(".{c}")).collect::<Vec<_>>().join(" ")),
            likely_source: None,
        });
    }

    let important_count = IMPORTANT_RE.find_iter(content).count();
    if important_count >= IMPORTANT_THRESHOLD {
        issues.push(IssueDraft {
            file_path: file_path.to_string(),
            issue_type: ThemeIssueType::CssConflict,
            severity: if important_count >= IMPORTANT_THRESHOLD * 3 {
                Severity::High
            } else {
                Severity::Medium
            },
            description: format!(
                "uses !important {important_count} times; these rules will override theme styling"
            ),
            code_snippet: None,
            likely_source: None,
        });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_stylesheet_is_clean() {
        let css = ".pf-btn { color: red; } .pf-container { width: 100%; }";
        assert!(analyze_css("assets/pagefly.css", css).is_empty());
    }

    #[test]
    fn generic_selectors_flag_global_css() {
        let css = ".btn { color: red; } .container, .modal { margin: 0; }";
        let issues = analyze_css("assets/app.css", css);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, ThemeIssueType::GlobalCss);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!(issues[0].description.contains("btn"));
    }

    #[test]
    fn many_generic_selectors_escalate_to_high() {
        let css = ".btn{}.button{}.container{}.wrapper{}.header{}.footer{}";
        let issues = analyze_css("assets/app.css", css);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn important_overuse_flags_css_conflict() {
        let rule = "p { color: red !important; }\n";
        let css = rule.repeat(12);
        let issues = analyze_css("assets/app.css", &css);
        assert!(issues
            .iter()
            .any(|i| i.issue_type == ThemeIssueType::CssConflict));
    }
}
