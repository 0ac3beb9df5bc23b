// src/timeline/mod.rs
//! Install-timeline correlation. Lines each app's install date up against
//! the shop's performance series and scores how the store changed around
//! that date. Pure functions over rows the caller fetched.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::SherlockConfig;
use crate::db::{InstalledApp, PerformanceSnapshot};

/// Days of snapshots averaged on each side of an install date.
const COMPARISON_WINDOW_DAYS: i64 = 14;

/// Averaged performance over the snapshots on one side of an install.
#[derive(Debug, Clone, Serialize)]
pub struct PerfWindow {
    pub avg_load_ms: f64,
    pub avg_score: f64,
    pub samples: usize,
}

/// One app's measured before/after effect on the shop.
#[derive(Debug, Clone, Serialize)]
pub struct AppImpact {
    pub app_name: String,
    pub installed_on: DateTime<Utc>,
    pub before: PerfWindow,
    pub after: PerfWindow,
    /// Performance-score change across the install (negative is worse).
    pub score_delta: f64,
    /// Load-time change in ms across the install (positive is worse).
    pub load_delta_ms: f64,
    /// Combined impact: score delta minus a load-time penalty. Below the
    /// configured cutoff the app is called out as a negative impact.
    pub impact_score: f64,
    pub is_negative: bool,
}

/// Ranks every app with an install date by measured impact, worst first.
/// Apps without snapshots on both sides of their install are skipped.
pub fn impact_ranking(
    apps: &[InstalledApp],
    snapshots: &[PerformanceSnapshot],
    config: &SherlockConfig,
) -> Vec<AppImpact> {
    let mut seen: Vec<&str> = Vec::new();
    let mut impacts: Vec<AppImpact> = Vec::new();

    for app in apps {
        if seen.contains(&app.app_name.as_str()) {
            continue;
        }
        seen.push(&app.app_name);

        if let Some(impact) = app_impact(app, snapshots, config) {
            impacts.push(impact);
        }
    }

    impacts.sort_by(|a, b| {
        a.impact_score
            .partial_cmp(&b.impact_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    impacts
}

/// Before/after comparison for one app, or None without data on both sides.
pub fn app_impact(
    app: &InstalledApp,
    snapshots: &[PerformanceSnapshot],
    config: &SherlockConfig,
) -> Option<AppImpact> {
    let installed_on = app.installed_on?;
    let window = Duration::days(COMPARISON_WINDOW_DAYS);

    let before = average_window(snapshots, installed_on - window, installed_on)?;
    let after = average_window(snapshots, installed_on, installed_on + window)?;

    let score_delta = after.avg_score - before.avg_score;
    let load_delta_ms = after.avg_load_ms - before.avg_load_ms;
    let impact_score = score_delta - load_delta_ms / 100.0;

    Some(AppImpact {
        app_name: app.app_name.clone(),
        installed_on,
        before,
        after,
        score_delta,
        load_delta_ms,
        impact_score,
        is_negative: impact_score < config.impact_negative_cutoff,
    })
}

fn average_window(
    snapshots: &[PerformanceSnapshot],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Option<PerfWindow> {
    let mut load_sum = 0.0;
    let mut score_sum = 0.0;
    let mut samples = 0usize;

    for snap in snapshots {
        if snap.recorded_at >= from && snap.recorded_at < to {
            load_sum += snap.load_time_ms as f64;
            score_sum += snap.score;
            samples += 1;
        }
    }

    if samples == 0 {
        return None;
    }

    Some(PerfWindow {
        avg_load_ms: load_sum / samples as f64,
        avg_score: score_sum / samples as f64,
        samples,
    })
}
