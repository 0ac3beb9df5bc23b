// src/shopify/types.rs
// Wire types for the Admin API responses we consume, plus the page timing
// struct the performance collector records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptTag {
    pub id: i64,
    pub src: String,
    #[serde(default)]
    pub display_scope: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Theme {
    pub id: i64,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScriptTagsResponse {
    pub script_tags: Vec<ScriptTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ThemesResponse {
    pub themes: Vec<Theme>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AssetsResponse {
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AssetResponse {
    pub asset: Asset,
}

/// Storefront page categories we time on every performance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    Home,
    Product,
    Collection,
    Cart,
}

impl PageCategory {
    pub const ALL: [PageCategory; 4] = [
        PageCategory::Home,
        PageCategory::Product,
        PageCategory::Collection,
        PageCategory::Cart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageCategory::Home => "home",
            PageCategory::Product => "product",
            PageCategory::Collection => "collection",
            PageCategory::Cart => "cart",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "home" => Some(PageCategory::Home),
            "product" => Some(PageCategory::Product),
            "collection" => Some(PageCategory::Collection),
            "cart" => Some(PageCategory::Cart),
            _ => None,
        }
    }

    /// Path of the page on the storefront.
    pub fn path(&self) -> &'static str {
        match self {
            PageCategory::Home => "/",
            PageCategory::Product => "/products",
            PageCategory::Collection => "/collections/all",
            PageCategory::Cart => "/cart",
        }
    }
}

/// Result of timing one storefront page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTiming {
    pub page: PageCategory,
    pub load_time_ms: i64,
    pub status_code: u16,
    pub script_count: i64,
}
