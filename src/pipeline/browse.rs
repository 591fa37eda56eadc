// src/pipeline/browse.rs

//! Operations over already stored vacancies.

use std::path::Path;

use crate::error::Result;
use crate::models::{Vacancy, top_by_salary};
use crate::storage::{Criteria, VacancyStorage};

/// The `n` best-paid stored vacancies, salary-less ones last.
pub async fn run_top(storage: &dyn VacancyStorage, n: usize) -> Result<Vec<Vacancy>> {
    let vacancies = storage.query(&Criteria::new()).await?;
    log::debug!("Ranking {} stored vacancies by salary", vacancies.len());
    Ok(top_by_salary(vacancies, n))
}

/// Stored vacancies whose name contains `keyword`, ignoring case.
pub async fn run_find(storage: &dyn VacancyStorage, keyword: &str) -> Result<Vec<Vacancy>> {
    storage.query(&Criteria::name_contains(keyword)).await
}

/// Remove one stored vacancy.
pub async fn run_delete(storage: &dyn VacancyStorage, vacancy_id: &str) -> Result<()> {
    storage.delete(vacancy_id).await?;
    log::info!("Deleted vacancy {}", vacancy_id);
    Ok(())
}

/// Export the whole store to CSV, returning the number of rows.
pub async fn run_export(storage: &dyn VacancyStorage, path: &Path) -> Result<usize> {
    storage.export_csv(path).await
}
