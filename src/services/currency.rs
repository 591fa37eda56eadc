// src/services/currency.rs

//! Currency rate cache.
//!
//! Holds the currency→RUB rate table shared by everything that converts
//! salaries. The table is fetched from a [`RateSource`] the first time it is
//! needed and replaced as a whole, so readers see either an empty table or a
//! complete one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::models::RateTable;

/// Anything that can provide a full currency rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
}

/// Lazily loaded, shareable currency rate table.
pub struct CurrencyRates {
    source: Option<Arc<dyn RateSource>>,
    table: RwLock<Arc<RateTable>>,
    load_lock: Mutex<()>,
}

impl CurrencyRates {
    /// Create an empty cache that loads from `source` on first use.
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source: Some(source),
            table: RwLock::new(Arc::new(RateTable::new())),
            load_lock: Mutex::new(()),
        }
    }

    /// Create a cache with a fixed table and nothing to reload from.
    pub fn preloaded(table: RateTable) -> Self {
        Self {
            source: None,
            table: RwLock::new(Arc::new(table)),
            load_lock: Mutex::new(()),
        }
    }

    /// Load the table if it is still empty.
    ///
    /// A failed fetch is logged and leaves the table empty; the next call
    /// tries again.
    pub async fn load_rates(&self) {
        if let Err(e) = self.try_load_rates().await {
            log::error!("Failed to load currency rates: {}", e);
        }
    }

    /// Load the table if it is still empty, reporting fetch failures.
    ///
    /// Concurrent callers wait for a single fetch.
    pub async fn try_load_rates(&self) -> Result<()> {
        if !self.is_empty().await {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        if !self.is_empty().await {
            return Ok(());
        }
        self.fetch_and_store().await
    }

    /// Re-fetch the table and replace the current one on success.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.load_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Rate for `code`, loading the table first if needed.
    pub async fn get_rate(&self, code: &str) -> Option<f64> {
        self.load_rates().await;
        self.table.read().await.get(code).copied()
    }

    /// The whole table, loading it first if needed.
    pub async fn rates(&self) -> Arc<RateTable> {
        self.load_rates().await;
        Arc::clone(&*self.table.read().await)
    }

    async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }

    async fn fetch_and_store(&self) -> Result<()> {
        let Some(source) = &self.source else {
            log::debug!("No rate source configured, keeping current table");
            return Ok(());
        };

        let mut fetched = source.fetch_rates().await?;
        fetched.retain(|code, rate| {
            let usable = rate.is_finite() && *rate > 0.0;
            if !usable {
                log::warn!("Dropping currency {} with unusable rate {}", code, rate);
            }
            usable
        });

        log::info!("Loaded {} currency rates", fetched.len());
        *self.table.write().await = Arc::new(fetched);
        Ok(())
    }
}
