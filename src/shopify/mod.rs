// src/shopify/mod.rs
//! Shopify Admin API access. The rest of the crate talks to the [`ShopifyApi`]
//! trait so scans can run against a stub in tests; [`client::ShopifyClient`]
//! is the real reqwest-backed implementation.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::{PageCategory, PageTiming, ScriptTag, Theme};

#[async_trait]
pub trait ShopifyApi: Send + Sync {
    /// All script tags registered against the shop (apps that inject JS).
    async fn fetch_script_tags(&self, shop: &str, token: &str) -> Result<Vec<ScriptTag>>;

    /// The published ("main") theme, if any.
    async fn fetch_main_theme(&self, shop: &str, token: &str) -> Result<Option<Theme>>;

    /// Keys of every asset in the theme.
    async fn fetch_asset_keys(&self, shop: &str, token: &str, theme_id: i64)
        -> Result<Vec<String>>;

    /// Raw content of a single theme asset. `None` when the asset has no
    /// text value (binary assets) or does not exist.
    async fn fetch_asset(
        &self,
        shop: &str,
        token: &str,
        theme_id: i64,
        key: &str,
    ) -> Result<Option<String>>;

    /// Wall-clock timing of a storefront page fetch.
    async fn measure_page(&self, shop: &str, page: PageCategory) -> Result<PageTiming>;
}
