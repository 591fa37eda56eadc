//! Local filesystem storage implementation.
//!
//! Keeps all vacancies in one pretty-printed JSON document. Writes go to a
//! temporary file that is then renamed over the document, so readers never
//! observe a half-written file. Mutations on one store are serialized so
//! that concurrent adds cannot lose each other's updates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Vacancy;
use crate::storage::{Criteria, VacancyStorage};

/// In-memory form of the document: vacancy id → flat record.
type Document = Map<String, Value>;

/// JSON document storage backend.
pub struct JsonStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Create a store backed by the document at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store, first deleting any existing document when
    /// `delete_existing` is set.
    pub async fn open(path: impl Into<PathBuf>, delete_existing: bool) -> Result<Self> {
        let store = Self::new(path);
        if delete_existing {
            match tokio::fs::remove_file(&store.path).await {
                Ok(()) => log::info!("Removed existing document {}", store.path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::Io(e)),
            }
        }
        Ok(store)
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored vacancy with `id`, if any.
    pub async fn get(&self, id: &str) -> Result<Option<Vacancy>> {
        let document = self.load_document().await?;
        document
            .get(id)
            .map(Vacancy::from_stored_record)
            .transpose()
    }

    /// Number of stored vacancies.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.load_document().await?.len())
    }

    /// Read the document. Missing or unparsable files read as empty.
    async fn load_document(&self) -> Result<Document> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(Value::Null) => Ok(Document::new()),
            Ok(_) => {
                log::warn!(
                    "{} does not hold a JSON object, treating it as empty",
                    self.path.display()
                );
                Ok(Document::new())
            }
            Err(e) => {
                log::warn!(
                    "{} is not valid JSON ({}), treating it as empty",
                    self.path.display(),
                    e
                );
                Ok(Document::new())
            }
        }
    }

    /// Write the document atomically (write to temp, then rename).
    async fn save_document(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = temp_path(&self.path);
        if let Err(e) = write_file(&tmp, &bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                log::debug!("Could not remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e);
        }

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "vacancies".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl VacancyStorage for JsonStore {
    async fn add(&self, vacancy: &Vacancy) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;

        let record = serde_json::to_value(vacancy.to_record())?;
        document.insert(vacancy.id().to_string(), record);

        self.save_document(&document).await?;
        log::debug!("Stored vacancy {}", vacancy.id());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;

        if document.shift_remove(id).is_none() {
            return Err(AppError::NotFound(id.to_string()));
        }

        self.save_document(&document).await?;
        log::debug!("Deleted vacancy {}", id);
        Ok(())
    }

    async fn query(&self, criteria: &Criteria) -> Result<Vec<Vacancy>> {
        let document = self.load_document().await?;
        let matcher = criteria.compile();

        let vacancies = document
            .iter()
            .filter_map(|(key, value)| {
                let record = match value.as_object() {
                    Some(record) => record,
                    None => {
                        log::warn!("Skipping stored entry {}: not a record", key);
                        return None;
                    }
                };
                if !matcher.matches(record) {
                    return None;
                }
                match Vacancy::from_stored_record(value) {
                    Ok(vacancy) => Some(vacancy),
                    Err(e) => {
                        log::warn!("Skipping stored entry {}: {}", key, e);
                        None
                    }
                }
            })
            .collect();

        Ok(vacancies)
    }
}
