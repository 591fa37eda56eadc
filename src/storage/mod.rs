//! Storage abstractions for vacancy persistence.
//!
//! Vacancies live in a single JSON document keyed by vacancy id:
//!
//! ```text
//! {
//!     "93012345": { "id": "93012345", "name": "...", "salary": 150000.0, ... },
//!     "93012346": { ... }
//! }
//! ```
//!
//! Every mutation reads the whole document, changes it in memory and writes
//! it back.

pub mod export;
pub mod local;

use std::path::Path;

use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::Vacancy;

// Re-export for convenience
pub use local::JsonStore;

/// Field filters for [`VacancyStorage::query`].
///
/// Each pattern is a case-insensitive regular expression searched for in
/// the stored field; a pattern that is not a valid regex is matched as a
/// plain substring. A record matches when every listed field matches.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    fields: Vec<(String, String)>,
}

impl Criteria {
    /// No filters: matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to match `pattern`.
    pub fn field(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.fields.push((field.into(), pattern.into()));
        self
    }

    /// Vacancies whose name contains `keyword`.
    pub fn name_contains(keyword: impl Into<String>) -> Self {
        Self::new().field("name", keyword)
    }

    pub(crate) fn compile(&self) -> Matcher {
        let fields = self
            .fields
            .iter()
            .map(|(field, pattern)| (field.clone(), compile_pattern(pattern)))
            .collect();
        Matcher { fields }
    }
}

/// Compiled form of [`Criteria`], built once per query.
pub(crate) struct Matcher {
    fields: Vec<(String, Pattern)>,
}

impl Matcher {
    pub(crate) fn matches(&self, record: &Map<String, Value>) -> bool {
        self.fields
            .iter()
            .all(|(field, pattern)| pattern.is_match(&field_text(record.get(field))))
    }
}

enum Pattern {
    Regex(regex::Regex),
    /// Lowercased substring
    Literal(String),
}

impl Pattern {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Pattern::Regex(regex) => regex.is_match(text),
            Pattern::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

fn compile_pattern(pattern: &str) -> Pattern {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Pattern::Regex(regex),
        Err(e) => {
            log::debug!("Pattern {:?} is not a valid regex ({}), matching literally", pattern, e);
            Pattern::Literal(pattern.to_lowercase())
        }
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Trait for vacancy storage backends.
#[async_trait]
pub trait VacancyStorage: Send + Sync {
    /// Insert the vacancy, replacing any stored one with the same id.
    async fn add(&self, vacancy: &Vacancy) -> Result<()>;

    /// Remove the vacancy with `id`, failing with `NotFound` if absent.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Stored vacancies matching all `criteria`, in storage order.
    async fn query(&self, criteria: &Criteria) -> Result<Vec<Vacancy>>;

    /// Write every stored vacancy to a CSV file at `path`.
    ///
    /// Returns the number of rows written, not counting the header.
    async fn export_csv(&self, path: &Path) -> Result<usize> {
        let vacancies = self.query(&Criteria::new()).await?;
        export::write_csv(&vacancies, path).await
    }
}
