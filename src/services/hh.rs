// src/services/hh.rs

//! hh.ru API client.
//!
//! Fetches raw vacancy records and the currency dictionary. Records are
//! returned untouched; normalization happens in [`crate::models::Vacancy`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, RateTable};
use crate::services::RateSource;
use crate::utils::endpoint;
use crate::utils::http::{RetryPolicy, create_async_client, get_json};

/// A remote job board that can be searched for vacancies.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Raw records from the first `page_count` result pages for `keyword`.
    async fn search_vacancies(&self, keyword: &str, page_count: u32) -> Result<Vec<Value>>;

    /// Full raw record of a single vacancy.
    async fn get_vacancy_details(&self, vacancy_id: &str) -> Result<Value>;
}

/// One page of `/vacancies` search results.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<Value>,
}

/// The part of `/dictionaries` we use.
#[derive(Debug, Deserialize)]
struct Dictionaries {
    #[serde(default)]
    currency: Vec<CurrencyEntry>,
}

#[derive(Debug, Deserialize)]
struct CurrencyEntry {
    code: String,
    rate: f64,
}

impl From<Dictionaries> for RateTable {
    fn from(dictionaries: Dictionaries) -> Self {
        dictionaries
            .currency
            .into_iter()
            .map(|entry| (entry.code, entry.rate))
            .collect()
    }
}

/// Client for the hh.ru public API.
#[derive(Clone)]
pub struct HhClient {
    client: reqwest::Client,
    base_url: String,
    per_page: u32,
    retry: RetryPolicy,
}

impl HhClient {
    /// Create a client with the configured User-Agent, timeout and retries.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base_url: config.base_url.clone(),
            per_page: config.per_page,
            retry: RetryPolicy::from_config(config),
        })
    }

    fn search_query(&self, keyword: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("text", keyword.to_string()),
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }

    /// `/vacancies/{id}` with the id escaped as a single path segment.
    fn vacancy_url(&self, vacancy_id: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, "vacancies")?;
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("{} cannot be a base URL", self.base_url)))?
            .push(vacancy_id);
        Ok(url)
    }
}

#[async_trait]
impl JobApi for HhClient {
    async fn search_vacancies(&self, keyword: &str, page_count: u32) -> Result<Vec<Value>> {
        let url = endpoint(&self.base_url, "vacancies")?;
        let mut vacancies = Vec::new();

        for page in 0..page_count {
            log::info!(
                "Requesting vacancies from hh.ru, page: {}/{}, search: {}",
                page + 1,
                page_count,
                keyword
            );
            let body: SearchPage =
                get_json(&self.client, &url, &self.search_query(keyword, page), self.retry)
                    .await?;
            log::debug!("Page {} returned {} vacancies", page, body.items.len());
            vacancies.extend(body.items);
        }

        Ok(vacancies)
    }

    async fn get_vacancy_details(&self, vacancy_id: &str) -> Result<Value> {
        let url = self.vacancy_url(vacancy_id)?;
        log::info!("Requesting details for vacancy {}", vacancy_id);
        get_json(&self.client, &url, &[], self.retry).await
    }
}

#[async_trait]
impl RateSource for HhClient {
    async fn fetch_rates(&self) -> Result<RateTable> {
        let url = endpoint(&self.base_url, "dictionaries")?;
        log::info!("Requesting currency dictionary");
        let dictionaries: Dictionaries = get_json(&self.client, &url, &[], self.retry).await?;
        Ok(dictionaries.into())
    }
}
