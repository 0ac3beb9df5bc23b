// src/shopify/client.rs
// Reqwest-backed Admin API client. One client instance is shared across
// shops for connection pooling only; no throttle state crosses shops.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::SherlockConfig;
use crate::error::{Error, Result};

use super::types::{
    AssetResponse, AssetsResponse, PageCategory, PageTiming, ScriptTag, ScriptTagsResponse,
    Theme, ThemesResponse,
};
use super::ShopifyApi;

static SCRIPT_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<script[^>]*\ssrc\s*=\s*["'][^"']+["']"#).expect("static regex compiles"));

pub struct ShopifyClient {
    http: reqwest::Client,
    api_version: String,
}

impl ShopifyClient {
    pub fn new(config: &SherlockConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.shopify_timeout_secs))
            .user_agent("Sherlock/1.0 (Shopify App Diagnostics)")
            .build()?;

        Ok(Self {
            http,
            api_version: config.shopify_api_version.clone(),
        })
    }

    fn admin_url(&self, shop: &str, resource: &str) -> String {
        format!(
            "https://{}/admin/api/{}/{}",
            shop, self.api_version, resource
        )
    }

    /// Issues an authenticated Admin API GET and deserializes the body.
    /// Non-2xx responses surface as upstream errors with the status inline.
    async fn admin_get<T: serde::de::DeserializeOwned>(
        &self,
        shop: &str,
        token: &str,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.admin_url(shop, resource);
        debug!(%shop, %resource, "Admin API request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("X-Shopify-Access-Token", token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%shop, %resource, %status, "Admin API request failed");
            return Err(Error::upstream(format!(
                "{resource} returned HTTP {status} for {shop}"
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ShopifyApi for ShopifyClient {
    async fn fetch_script_tags(&self, shop: &str, token: &str) -> Result<Vec<ScriptTag>> {
        let body: ScriptTagsResponse = self
            .admin_get(shop, token, "script_tags.json", &[])
            .await?;
        Ok(body.script_tags)
    }

    async fn fetch_main_theme(&self, shop: &str, token: &str) -> Result<Option<Theme>> {
        let body: ThemesResponse = self.admin_get(shop, token, "themes.json", &[]).await?;
        Ok(body.themes.into_iter().find(|t| t.role == "main"))
    }

    async fn fetch_asset_keys(
        &self,
        shop: &str,
        token: &str,
        theme_id: i64,
    ) -> Result<Vec<String>> {
        let resource = format!("themes/{theme_id}/assets.json");
        let body: AssetsResponse = self.admin_get(shop, token, &resource, &[]).await?;
        Ok(body.assets.into_iter().map(|a| a.key).collect())
    }

    async fn fetch_asset(
        &self,
        shop: &str,
        token: &str,
        theme_id: i64,
        key: &str,
    ) -> Result<Option<String>> {
        let resource = format!("themes/{theme_id}/assets.json");
        let body: AssetResponse = self
            .admin_get(shop, token, &resource, &[("asset[key]", key)])
            .await?;
        Ok(body.asset.value)
    }

    async fn measure_page(&self, shop: &str, page: PageCategory) -> Result<PageTiming> {
        let url = format!("https://{}{}", shop, page.path());
        let start = Instant::now();

        let response = self
            .http
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::upstream(format!("{} page timed out for {shop}", page.as_str()))
                } else {
                    Error::from(e)
                }
            })?;

        let status_code = response.status().as_u16();
        let body = response.text().await?;
        let load_time_ms = start.elapsed().as_millis() as i64;

        let script_count = SCRIPT_SRC_RE.find_iter(&body).count() as i64;

        Ok(PageTiming {
            page,
            load_time_ms,
            status_code,
            script_count,
        })
    }
}
