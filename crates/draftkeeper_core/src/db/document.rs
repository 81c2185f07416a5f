//! Document storage operations backed by redb.

use crate::{db::tables::*, error::AppError, models::document::*};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Result of writing content to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub document: Document,
    /// `false` when the stored content already matched.
    pub changed: bool,
}

/// Accessor for document tables.
pub struct DocumentDb {
    db: Arc<redb::Database>,
}

fn reverse_timestamp_key(updated_at: DateTime<Utc>) -> u64 {
    let millis = updated_at.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

fn deserialize_document(bytes: &[u8]) -> Result<Document, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

impl DocumentDb {
    /// Initialize document tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(DOCUMENTS)?;
        write_txn.open_table(DOCUMENTS_BY_UPDATED)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Fetch a document by id.
    ///
    /// # Returns
    /// `Ok(Some(document))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Document>, AppError> {
        let read_txn = self.db.begin_read()?;
        let documents = read_txn.open_table(DOCUMENTS)?;
        match documents.get(id)? {
            Some(value) => Ok(Some(deserialize_document(value.value())?)),
            None => Ok(None),
        }
    }

    /// Create or overwrite a document's content.
    ///
    /// Writing content whose hash matches the stored row is a no-op: the
    /// revision and `updated_at` stay as they were.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn upsert(&self, id: &str, content: String) -> Result<UpsertResult, AppError> {
        let write_txn = self.db.begin_write()?;
        let result = {
            let mut documents = write_txn.open_table(DOCUMENTS)?;
            let mut updated = write_txn.open_table(DOCUMENTS_BY_UPDATED)?;

            let existing = match documents.get(id)? {
                Some(guard) => Some(deserialize_document(guard.value())?),
                None => None,
            };

            let (document, old_key) = match existing {
                Some(mut document) => {
                    let old_key = reverse_timestamp_key(document.updated_at);
                    if !document.apply_content(content) {
                        return Ok(UpsertResult {
                            document,
                            changed: false,
                        });
                    }
                    (document, Some(old_key))
                }
                None => (Document::new(id, content), None),
            };

            let encoded = bincode::serialize(&document)?;
            documents.insert(id, encoded.as_slice())?;
            if let Some(old_key) = old_key {
                updated.remove((old_key, id))?;
            }
            updated.insert((reverse_timestamp_key(document.updated_at), id), ())?;

            UpsertResult {
                document,
                changed: true,
            }
        };
        write_txn.commit()?;
        Ok(result)
    }

    /// List document metadata, most recently updated first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_meta(&self, limit: usize) -> Result<Vec<DocumentMeta>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let read_txn = self.db.begin_read()?;
        let updated_table = read_txn.open_table(DOCUMENTS_BY_UPDATED)?;
        let documents = read_txn.open_table(DOCUMENTS)?;
        let mut metas = Vec::new();

        for item in updated_table.iter()? {
            let (key, _) = item?;
            let (_, id) = key.value();
            let Some(guard) = documents.get(id)? else {
                continue;
            };
            let document = deserialize_document(guard.value())?;
            metas.push(DocumentMeta::from(&document));
            if metas.len() >= limit {
                break;
            }
        }

        Ok(metas)
    }
}
