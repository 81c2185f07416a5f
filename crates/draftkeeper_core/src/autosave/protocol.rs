//! Messages sent from an [`super::AutosaveHandle`] to its coordinator task.

use super::SaveOutcome;
use crate::error::PersistenceError;
use tokio::sync::oneshot;

pub(crate) type SaveReply = oneshot::Sender<Result<SaveOutcome, PersistenceError>>;

#[derive(Debug)]
pub(crate) enum Command<C> {
    /// Full-document snapshot from the editor.
    Edit(C),
    /// Save immediately, resolving `reply` when the save settles.
    SaveNow { content: C, reply: SaveReply },
    SetEnabled(bool),
    Dispose,
}
