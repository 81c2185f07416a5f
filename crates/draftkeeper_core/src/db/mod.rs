//! Database layer for Draftkeeper documents.

/// Document storage helpers.
pub mod document;
/// redb table definitions.
pub mod tables;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the document tables.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub documents: document::DocumentDb,
}

#[cfg(test)]
mod tests;

impl Database {
    /// Open (or create) the database stored under `path`.
    ///
    /// `path` names a directory; the redb file lives at `path/data.redb`.
    ///
    /// # Returns
    /// A ready [`Database`] with all tables initialized.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created or redb fails to
    /// open the file (for example when another process holds it).
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = redb::Database::create(&file).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to open '{}': {}. Is another Draftkeeper server already using it?",
                file.display(),
                err
            ))
        })?;
        let db = Arc::new(db);
        tracing::debug!(path = %file.display(), "opened document database");

        Ok(Self {
            documents: document::DocumentDb::new(db.clone())?,
            db,
        })
    }

    /// Create another handle over the same underlying database.
    ///
    /// # Errors
    /// Returns an error when table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Ok(Self {
            db: self.db.clone(),
            documents: document::DocumentDb::new(self.db.clone())?,
        })
    }
}
