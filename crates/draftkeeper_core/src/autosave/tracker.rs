//! Tracks the last content known to be durably stored.

use super::DraftContent;

/// Compares candidate content against the last successfully persisted snapshot.
#[derive(Debug)]
pub(crate) struct ChangeTracker<C> {
    snapshot: Option<C>,
    skip_empty: bool,
}

impl<C: DraftContent> ChangeTracker<C> {
    pub(crate) fn new(initial: Option<C>, skip_empty: bool) -> Self {
        Self {
            snapshot: initial,
            skip_empty,
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Option<&C> {
        self.snapshot.as_ref()
    }

    /// `true` unless `content` equals the last persisted snapshot.
    pub(crate) fn has_changed(&self, content: &C) -> bool {
        self.snapshot.as_ref() != Some(content)
    }

    /// Blank drafts are never saved when `skip_empty` is set.
    pub(crate) fn suppresses(&self, content: &C) -> bool {
        self.skip_empty && content.is_blank()
    }

    /// Only called after the store confirmed the write.
    pub(crate) fn record_success(&mut self, content: C) {
        self.snapshot = Some(content);
    }
}
