// src/db/perf_store.rs
//! Append-only performance time series, keyed by shop. Snapshots are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::shopify::types::PageCategory;

use super::scan_store::to_utc;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSnapshot {
    pub id: String,
    pub shop: String,
    pub page: PageCategory,
    pub load_time_ms: i64,
    pub score: f64,
    /// Free-text event marker, e.g. "after installing AppX", used for
    /// timeline correlation.
    pub annotation: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

pub struct PerformanceStore {
    pool: SqlitePool,
}

impl PerformanceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, snapshot: &PerformanceSnapshot) -> Result<String> {
        let id = if snapshot.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            snapshot.id.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO performance_snapshots (
                id, shop, page, load_time_ms, score, annotation, recorded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&snapshot.shop)
        .bind(snapshot.page.as_str())
        .bind(snapshot.load_time_ms)
        .bind(snapshot.score)
        .bind(&snapshot.annotation)
        .bind(snapshot.recorded_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Full series for a shop, oldest first.
    pub async fn for_shop(&self, shop: &str) -> Result<Vec<PerformanceSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, page, load_time_ms, score, annotation, recorded_at
            FROM performance_snapshots
            WHERE shop = ?
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(shop)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_snapshot).collect()
    }

    /// Series restricted to the last `days` days, oldest first.
    pub async fn for_shop_since(
        &self,
        shop: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PerformanceSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shop, page, load_time_ms, score, annotation, recorded_at
            FROM performance_snapshots
            WHERE shop = ? AND recorded_at >= ?
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(shop)
        .bind(since.naive_utc())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_snapshot).collect()
    }

    fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> Result<PerformanceSnapshot> {
        let page_str: String = row.get("page");

        Ok(PerformanceSnapshot {
            id: row.get("id"),
            shop: row.get("shop"),
            page: PageCategory::parse(&page_str)
                .ok_or_else(|| Error::validation(format!("bad page category: {page_str}")))?,
            load_time_ms: row.get("load_time_ms"),
            score: row.get("score"),
            annotation: row.get("annotation"),
            recorded_at: to_utc(row.get("recorded_at")),
        })
    }
}
