// src/config/mod.rs
// All values load from the environment (.env supported) with sane defaults.
// The config is built once in main() and handed to AppState by value; nothing
// in the crate reads the environment after startup.

use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SherlockConfig {
    // ── Server
    pub host: String,
    pub port: u16,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Shopify Admin API
    pub shopify_api_version: String,
    pub shopify_timeout_secs: u64,

    // ── Risk scoring policy (handwritten heuristics; tune via env, not code)
    pub suspect_threshold: f64,
    pub confidence_threshold: f64,
    pub recent_install_window_days: i64,
    pub script_injection_weight: f64,
    pub theme_modification_weight: f64,
    pub known_conflict_weight: f64,

    // ── Performance scoring
    pub perf_baseline_ms: i64,
    pub perf_penalty_per_100ms: f64,
    pub impact_negative_cutoff: f64,

    // ── Theme analysis
    pub max_theme_files: usize,

    // ── Community reports
    pub trending_window_days: i64,

    // ── Logging
    pub log_level: String,
}

impl Default for SherlockConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "sqlite://sherlock.db".to_string(),
            sqlite_max_connections: 5,
            shopify_api_version: "2024-01".to_string(),
            shopify_timeout_secs: 30,
            suspect_threshold: 40.0,
            confidence_threshold: 60.0,
            recent_install_window_days: 14,
            script_injection_weight: 10.0,
            theme_modification_weight: 10.0,
            known_conflict_weight: 15.0,
            perf_baseline_ms: 2000,
            perf_penalty_per_100ms: 2.0,
            impact_negative_cutoff: -5.0,
            max_theme_files: 50,
            trending_window_days: 30,
            log_level: "info".to_string(),
        }
    }
}

impl SherlockConfig {
    /// Builds the config from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: env_var_or("SHERLOCK_HOST", d.host),
            port: env_var_or("SHERLOCK_PORT", d.port),
            database_url: env_var_or("DATABASE_URL", d.database_url),
            sqlite_max_connections: env_var_or(
                "SQLITE_MAX_CONNECTIONS",
                d.sqlite_max_connections,
            ),
            shopify_api_version: env_var_or("SHOPIFY_API_VERSION", d.shopify_api_version),
            shopify_timeout_secs: env_var_or("SHOPIFY_TIMEOUT_SECS", d.shopify_timeout_secs),
            suspect_threshold: env_var_or("RISK_SUSPECT_THRESHOLD", d.suspect_threshold),
            confidence_threshold: env_var_or("RISK_CONFIDENCE_THRESHOLD", d.confidence_threshold),
            recent_install_window_days: env_var_or(
                "RISK_RECENT_WINDOW_DAYS",
                d.recent_install_window_days,
            ),
            script_injection_weight: env_var_or(
                "RISK_SCRIPT_INJECTION_WEIGHT",
                d.script_injection_weight,
            ),
            theme_modification_weight: env_var_or(
                "RISK_THEME_MODIFICATION_WEIGHT",
                d.theme_modification_weight,
            ),
            known_conflict_weight: env_var_or(
                "RISK_KNOWN_CONFLICT_WEIGHT",
                d.known_conflict_weight,
            ),
            perf_baseline_ms: env_var_or("PERF_BASELINE_MS", d.perf_baseline_ms),
            perf_penalty_per_100ms: env_var_or(
                "PERF_PENALTY_PER_100MS",
                d.perf_penalty_per_100ms,
            ),
            impact_negative_cutoff: env_var_or(
                "IMPACT_NEGATIVE_CUTOFF",
                d.impact_negative_cutoff,
            ),
            max_theme_files: env_var_or("MAX_THEME_FILES", d.max_theme_files),
            trending_window_days: env_var_or("TRENDING_WINDOW_DAYS", d.trending_window_days),
            log_level: env_var_or("LOG_LEVEL", d.log_level),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses an env var, tolerating trailing comments and whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean = val.split('#').next().unwrap_or("").trim();
            clean.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SherlockConfig::default();
        assert_eq!(cfg.suspect_threshold, 40.0);
        assert!(cfg.confidence_threshold > cfg.suspect_threshold);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn env_var_or_strips_comments() {
        std::env::set_var("SHERLOCK_TEST_PORT", "9001 # staging");
        let port: u16 = env_var_or("SHERLOCK_TEST_PORT", 8000u16);
        assert_eq!(port, 9001);
        std::env::remove_var("SHERLOCK_TEST_PORT");
    }
}
