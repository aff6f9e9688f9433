//! Flat-file knowledge base.
//!
//! The knowledge base is a single pretty-printed JSON array of
//! `{question, answer}` objects. It is read in full on every interaction
//! and rewritten in full on every mutation; there are no partial updates
//! and no locking, so concurrent writers are last-write-wins.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{FaqRecord, Notice};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error: The data file '{}' was not found. Please create it.", .0.display())]
    Missing(PathBuf),

    #[error("Error: Could not read or parse '{}'. Make sure it's a valid JSON file.", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error: Could not read or parse '{}'. Make sure it's a valid JSON file.", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save FAQs: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to save FAQs: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Handle to the backing file. Holds no records itself.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the whole knowledge base.
    pub fn load(&self) -> Result<Vec<FaqRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()));
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let records: Vec<FaqRecord> =
            serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %self.path.display(), records = records.len(), "knowledge base loaded");
        Ok(records)
    }

    /// Load, degrading to an empty knowledge base on failure.
    ///
    /// The failure is pushed onto `notices` so the caller can show it; with an
    /// empty knowledge base every query simply fails to match.
    pub fn load_or_report(&self, notices: &mut Vec<Notice>) -> Vec<FaqRecord> {
        match self.load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "knowledge base unavailable");
                notices.push(Notice::error(e.to_string()));
                Vec::new()
            }
        }
    }

    /// Serialize and overwrite the backing file with `records`.
    ///
    /// Output is indented with two spaces and keeps non-ASCII text as-is.
    pub fn save(&self, records: &[FaqRecord]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(records).map_err(StoreError::Encode)?;
        std::fs::write(&self.path, body).map_err(StoreError::Write)?;
        tracing::info!(path = %self.path.display(), records = records.len(), "knowledge base saved");
        Ok(())
    }

    /// Save, pushing an error notice on failure. Returns whether the write landed.
    pub fn save_or_report(&self, records: &[FaqRecord], notices: &mut Vec<Notice>) -> bool {
        match self.save(records) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "knowledge base save failed");
                notices.push(Notice::error(e.to_string()));
                false
            }
        }
    }

    /// Create an empty knowledge base if the backing file does not exist.
    ///
    /// Returns `true` if a file was created. An existing file is never touched.
    pub fn init(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }
        self.save(&[])?;
        Ok(true)
    }
}
