//! Document models and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the document an editor (and its coordinator) is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a caller-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return this id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Stored document row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub content: String,
    /// blake3 hex digest of `content`.
    pub content_hash: String,
    /// Incremented only when stored content actually changes.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Build a first-revision document.
    pub fn new(id: impl Into<String>, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            content_hash: content_hash(&content),
            content,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the content, bumping the revision when the hash differs.
    ///
    /// # Returns
    /// `true` when the stored content changed.
    pub fn apply_content(&mut self, content: String) -> bool {
        let hash = content_hash(&content);
        if hash == self.content_hash {
            return false;
        }
        self.content = content;
        self.content_hash = hash;
        self.revision = self.revision.saturating_add(1);
        self.updated_at = Utc::now();
        true
    }
}

/// Lightweight listing row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: String,
    pub revision: u64,
    pub content_len: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentMeta {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            revision: document.revision,
            content_len: document.content.len(),
            updated_at: document.updated_at,
        }
    }
}

/// Request payload for writing a document's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub content: String,
}

/// Query parameters for listing documents.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Hex-encoded blake3 digest used for change detection and ETags.
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
