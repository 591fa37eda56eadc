// src/storage/export.rs

//! CSV export of stored vacancies.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Vacancy;

/// Render vacancies as CSV: a header row, then one row per vacancy.
pub fn to_csv(vacancies: &[Vacancy]) -> Result<Vec<u8>> {
    if vacancies.is_empty() {
        return Err(AppError::EmptyStore);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for vacancy in vacancies {
        writer.serialize(vacancy.to_record())?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

/// Write vacancies to a CSV file, returning the number of data rows.
pub async fn write_csv(vacancies: &[Vacancy], path: &Path) -> Result<usize> {
    let bytes = to_csv(vacancies)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;

    log::info!("Exported {} vacancies to {}", vacancies.len(), path.display());
    Ok(vacancies.len())
}
