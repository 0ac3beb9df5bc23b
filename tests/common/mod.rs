// tests/common/mod.rs
// Shared fixtures: an in-memory database, a scriptable ShopifyApi stub, and
// helpers for driving scans to completion.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::Semaphore;

use sherlock::config::SherlockConfig;
use sherlock::db::{run_migrations, ScanJob};
use sherlock::error::{Error, Result};
use sherlock::shopify::types::{PageCategory, PageTiming, ScriptTag, Theme};
use sherlock::shopify::ShopifyApi;
use sherlock::state::AppState;

pub const SHOP: &str = "acme.myshopify.com";
pub const TOKEN: &str = "shpat_test_token";

/// Scriptable stand-in for the Admin API.
#[derive(Default)]
pub struct StubShopify {
    pub script_tags: Vec<ScriptTag>,
    pub theme: Option<Theme>,
    pub assets: HashMap<String, String>,
    /// When set, fetch_script_tags fails with this message.
    pub script_tags_error: Option<String>,
    /// When set, fetch_script_tags blocks until a permit is added.
    pub gate: Option<Arc<Semaphore>>,
    pub page_load_ms: i64,
}

impl StubShopify {
    pub fn with_tags(tags: Vec<ScriptTag>) -> Self {
        Self {
            script_tags: tags,
            page_load_ms: 1200,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ShopifyApi for StubShopify {
    async fn fetch_script_tags(&self, _shop: &str, _token: &str) -> Result<Vec<ScriptTag>> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|_| Error::upstream("gate closed"))?;
            permit.forget();
        }
        if let Some(message) = &self.script_tags_error {
            return Err(Error::upstream(message.clone()));
        }
        Ok(self.script_tags.clone())
    }

    async fn fetch_main_theme(&self, _shop: &str, _token: &str) -> Result<Option<Theme>> {
        Ok(self.theme.clone())
    }

    async fn fetch_asset_keys(
        &self,
        _shop: &str,
        _token: &str,
        _theme_id: i64,
    ) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.assets.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn fetch_asset(
        &self,
        _shop: &str,
        _token: &str,
        _theme_id: i64,
        key: &str,
    ) -> Result<Option<String>> {
        Ok(self.assets.get(key).cloned())
    }

    async fn measure_page(&self, _shop: &str, page: PageCategory) -> Result<PageTiming> {
        Ok(PageTiming {
            page,
            load_time_ms: self.page_load_ms,
            status_code: 200,
            script_count: self.script_tags.len() as i64,
        })
    }
}

pub fn main_theme() -> Theme {
    Theme {
        id: 42,
        name: "Dawn".to_string(),
        role: "main".to_string(),
    }
}

pub fn script_tag(id: i64, src: &str, created_at: Option<DateTime<Utc>>) -> ScriptTag {
    ScriptTag {
        id,
        src: src.to_string(),
        display_scope: Some("online_store".to_string()),
        created_at,
    }
}

pub async fn test_pool() -> SqlitePool {
    // One connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn test_state(shopify: StubShopify) -> Arc<AppState> {
    let pool = test_pool().await;
    Arc::new(AppState::new(
        SherlockConfig::default(),
        pool,
        Arc::new(shopify),
    ))
}

/// Polls the job until it turns terminal, failing the test after 5 seconds.
pub async fn wait_for_terminal(state: &AppState, job_id: &str) -> ScanJob {
    for _ in 0..100 {
        let job = state
            .orchestrator
            .get_status(job_id)
            .await
            .expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("scan {job_id} did not finish in time");
}
