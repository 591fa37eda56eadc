//! Service layer for the vacancy collector.
//!
//! This module contains the remote-facing logic for:
//! - Searching and fetching vacancies (`HhClient`)
//! - Caching currency rates (`CurrencyRates`)

mod currency;
mod hh;

pub use currency::{CurrencyRates, RateSource};
pub use hh::{HhClient, JobApi};
