// src/pipeline/search.rs

//! Search-and-store pipeline.

use crate::error::Result;
use crate::models::{ConversionConfig, RateTable, Vacancy};
use crate::services::{CurrencyRates, JobApi};
use crate::storage::VacancyStorage;

/// Summary of a search run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Raw records returned by the API
    pub fetched: usize,
    /// Vacancies written to the store
    pub stored: usize,
    /// Records that could not be normalized
    pub skipped: usize,
}

/// Search hh.ru for `keyword` over `pages` pages and store every result.
pub async fn run_search(
    api: &dyn JobApi,
    rates: &CurrencyRates,
    storage: &dyn VacancyStorage,
    conversion: &ConversionConfig,
    keyword: &str,
    pages: u32,
) -> Result<SearchOutcome> {
    let records = api.search_vacancies(keyword, pages).await?;
    let table = rates.rates().await;

    let mut outcome = SearchOutcome {
        fetched: records.len(),
        ..SearchOutcome::default()
    };

    for raw in &records {
        match normalize(raw, &table, conversion) {
            Ok(vacancy) => {
                storage.add(&vacancy).await?;
                outcome.stored += 1;
            }
            Err(e) => {
                outcome.skipped += 1;
                log::warn!("Skipping vacancy record: {}", e);
            }
        }
    }

    log::info!(
        "Search '{}': {} fetched, {} stored, {} skipped",
        keyword,
        outcome.fetched,
        outcome.stored,
        outcome.skipped
    );
    Ok(outcome)
}

/// Fetch one vacancy by id and normalize it.
pub async fn run_details(
    api: &dyn JobApi,
    rates: &CurrencyRates,
    conversion: &ConversionConfig,
    vacancy_id: &str,
) -> Result<Vacancy> {
    let raw = api.get_vacancy_details(vacancy_id).await?;
    let table = rates.rates().await;
    normalize(&raw, &table, conversion)
}

fn normalize(
    raw: &serde_json::Value,
    table: &RateTable,
    conversion: &ConversionConfig,
) -> Result<Vacancy> {
    if conversion.strict_currency {
        Vacancy::from_remote_record_strict(raw, Some(table))
    } else {
        Vacancy::from_remote_record(raw, Some(table))
    }
}
