// src/models/mod.rs

//! Domain models for the vacancy collector.

use std::collections::HashMap;

mod config;
mod vacancy;

// Re-export all public types
pub use config::{ApiConfig, Config, ConversionConfig, LoggingConfig, StorageConfig};
pub use vacancy::{
    Vacancy, VacancyRecord, cmp_by_salary_desc, sort_by_salary_desc, top_by_salary,
};

/// Currency code to RUB conversion rate, as published by hh.ru.
pub type RateTable = HashMap<String, f64>;
