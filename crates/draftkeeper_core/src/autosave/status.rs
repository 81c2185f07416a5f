//! Observable save status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Lifecycle state shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Idle,
    PendingChange,
    Saving,
    Saved,
    Error,
}

/// Status snapshot published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SaveStatus {
    pub state: SaveState,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Owns the status value and publishes every transition.
///
/// Publishing stops for good once the shared `disposed` flag is set.
pub(crate) struct StatusReporter {
    tx: watch::Sender<SaveStatus>,
    current: SaveStatus,
    display: Duration,
    revert_at: Option<Instant>,
    disposed: Arc<AtomicBool>,
}

impl StatusReporter {
    pub(crate) fn new(
        tx: watch::Sender<SaveStatus>,
        display: Duration,
        disposed: Arc<AtomicBool>,
    ) -> Self {
        let current = tx.borrow().clone();
        Self {
            tx,
            current,
            display,
            revert_at: None,
            disposed,
        }
    }

    pub(crate) fn revert_deadline(&self) -> Option<Instant> {
        self.revert_at
    }

    /// A real change was scheduled. An in-flight save keeps showing `Saving`.
    pub(crate) fn pending_change(&mut self) {
        if self.current.state == SaveState::Saving {
            return;
        }
        self.revert_at = None;
        self.transition(SaveState::PendingChange);
    }

    pub(crate) fn saving(&mut self) {
        self.revert_at = None;
        self.transition(SaveState::Saving);
    }

    pub(crate) fn saved(&mut self, at: DateTime<Utc>, now: Instant) {
        self.current.last_saved_at = Some(at);
        self.current.last_error = None;
        self.revert_at = Some(now + self.display);
        self.transition(SaveState::Saved);
    }

    pub(crate) fn failed(&mut self, message: String, now: Instant) {
        self.current.last_error = Some(message);
        self.revert_at = Some(now + self.display);
        self.transition(SaveState::Error);
    }

    /// Pending content was withdrawn (edits returned to the stored value).
    pub(crate) fn settle_idle(&mut self) {
        if self.current.state == SaveState::PendingChange {
            self.transition(SaveState::Idle);
        }
    }

    /// Revert a `Saved`/`Error` display once its window has passed.
    pub(crate) fn expire(&mut self, now: Instant) {
        match self.revert_at {
            Some(deadline) if deadline <= now => {
                self.revert_at = None;
                if matches!(self.current.state, SaveState::Saved | SaveState::Error) {
                    self.transition(SaveState::Idle);
                }
            }
            _ => {}
        }
    }

    fn transition(&mut self, state: SaveState) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        self.current.state = state;
        let next = self.current.clone();
        self.tx.send_if_modified(|published| {
            if *published == next {
                return false;
            }
            *published = next;
            true
        });
    }
}
