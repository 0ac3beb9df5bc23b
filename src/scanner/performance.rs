// src/scanner/performance.rs
//! Performance snapshots. Each pass times the four storefront pages and
//! turns raw load times into a 0-100 score with a linear penalty past the
//! baseline.

use chrono::{DateTime, Utc};

use crate::config::SherlockConfig;
use crate::db::PerformanceSnapshot;
use crate::shopify::types::PageTiming;

/// External scripts a page can carry before the score starts dropping.
const SCRIPT_COUNT_ALLOWANCE: i64 = 20;
const SCRIPT_EXCESS_PENALTY: f64 = 0.5;

/// 100 at or under the baseline, then a fixed penalty per 100ms over it,
/// floored at 0.
pub fn score_load_time(load_time_ms: i64, config: &SherlockConfig) -> f64 {
    if load_time_ms <= config.perf_baseline_ms {
        return 100.0;
    }
    let over = (load_time_ms - config.perf_baseline_ms) as f64;
    (100.0 - (over / 100.0) * config.perf_penalty_per_100ms).max(0.0)
}

/// Full page score: the load-time score minus a deduction per external
/// script past the allowance.
pub fn score_timing(timing: &PageTiming, config: &SherlockConfig) -> f64 {
    let base = score_load_time(timing.load_time_ms, config);
    let excess = (timing.script_count - SCRIPT_COUNT_ALLOWANCE).max(0) as f64;
    (base - excess * SCRIPT_EXCESS_PENALTY).max(0.0)
}

/// Turns one timing into an unsaved snapshot row.
pub fn snapshot_from_timing(
    shop: &str,
    timing: &PageTiming,
    annotation: Option<String>,
    recorded_at: DateTime<Utc>,
    config: &SherlockConfig,
) -> PerformanceSnapshot {
    PerformanceSnapshot {
        id: String::new(),
        shop: shop.to_string(),
        page: timing.page,
        load_time_ms: timing.load_time_ms,
        score: score_timing(timing, config),
        annotation,
        recorded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::types::PageCategory;

    #[test]
    fn at_or_under_baseline_scores_full() {
        let config = SherlockConfig::default();
        assert_eq!(score_load_time(800, &config), 100.0);
        assert_eq!(score_load_time(2000, &config), 100.0);
    }

    #[test]
    fn penalty_is_linear_past_baseline() {
        let config = SherlockConfig::default();
        // 500ms over at 2.0 per 100ms is a 10 point penalty.
        assert_eq!(score_load_time(2500, &config), 90.0);
        assert_eq!(score_load_time(3000, &config), 80.0);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let config = SherlockConfig::default();
        assert_eq!(score_load_time(60_000, &config), 0.0);
    }

    #[test]
    fn script_excess_deducts_from_the_score() {
        let config = SherlockConfig::default();
        let light = PageTiming {
            page: PageCategory::Home,
            load_time_ms: 1000,
            status_code: 200,
            script_count: 12,
        };
        assert_eq!(score_timing(&light, &config), 100.0);

        let heavy = PageTiming {
            script_count: 30,
            ..light.clone()
        };
        // 10 scripts over the allowance at 0.5 each.
        assert_eq!(score_timing(&heavy, &config), 95.0);
    }

    #[test]
    fn snapshot_carries_the_timing_through() {
        let config = SherlockConfig::default();
        let timing = PageTiming {
            page: PageCategory::Product,
            load_time_ms: 2500,
            status_code: 200,
            script_count: 14,
        };
        let snap = snapshot_from_timing("x.myshopify.com", &timing, None, Utc::now(), &config);
        assert_eq!(snap.page, PageCategory::Product);
        assert_eq!(snap.load_time_ms, 2500);
        assert_eq!(snap.score, 90.0);
    }
}
