//! The persistence boundary the coordinator drives.

use super::DraftContent;
use crate::error::PersistenceError;
use crate::models::document::DocumentId;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Persist::persist`].
pub type PersistFuture = Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send>>;

/// Externally supplied save operation.
///
/// The coordinator never runs two calls for the same document at once. It does
/// not care what the call does (HTTP request, file write, database upsert) as
/// long as the returned future eventually settles.
pub trait Persist<C: DraftContent>: Send + Sync + 'static {
    fn persist(&self, document_id: &DocumentId, content: C) -> PersistFuture;
}

/// Adapter implementing [`Persist`] for an async closure.
pub struct FnPersist<F> {
    f: F,
}

/// Wrap `f` as a [`Persist`] implementation.
///
/// # Example
/// ```
/// use draftkeeper_core::{persist_fn, DocumentId, PersistenceError};
///
/// let persist = persist_fn(|id: DocumentId, content: String| async move {
///     println!("saving {} bytes to {}", content.len(), id);
///     Ok::<(), PersistenceError>(())
/// });
/// # let _ = persist;
/// ```
pub fn persist_fn<F>(f: F) -> FnPersist<F> {
    FnPersist { f }
}

impl<C, F, Fut> Persist<C> for FnPersist<F>
where
    C: DraftContent,
    F: Fn(DocumentId, C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), PersistenceError>> + Send + 'static,
{
    fn persist(&self, document_id: &DocumentId, content: C) -> PersistFuture {
        Box::pin((self.f)(document_id.clone(), content))
    }
}
