//! Debounced autosave coordinator.
//!
//! One coordinator runs per open document. Editors feed it full-content
//! snapshots through [`AutosaveHandle::notify_edit`]; it coalesces them behind a
//! quiet period, keeps at most one [`Persist`] call in flight, and publishes a
//! [`SaveStatus`] that UIs can render.

mod content;
mod coordinator;
mod debounce;
mod gate;
mod persist;
mod protocol;
mod status;
mod tracker;


use crate::config::Config;
use std::time::Duration;

pub use content::DraftContent;
pub use coordinator::{spawn_autosave, AutosaveHandle};
pub use persist::{persist_fn, FnPersist, Persist, PersistFuture};
pub use status::{SaveState, SaveStatus};

/// Tuning knobs for one coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveOptions {
    /// Quiet period after the last edit before a save starts.
    pub debounce: Duration,
    /// When `false`, edits are ignored and nothing is saved.
    pub enabled: bool,
    /// Never save drafts whose content is blank.
    pub skip_empty: bool,
    /// How long `Saved`/`Error` stay visible before reverting to `Idle`.
    pub status_display: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(crate::DEFAULT_AUTO_SAVE_INTERVAL_MS),
            enabled: true,
            skip_empty: true,
            status_display: Duration::from_millis(crate::DEFAULT_STATUS_DISPLAY_MS),
        }
    }
}

impl AutosaveOptions {
    /// Build options from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.auto_save_interval),
            enabled: config.auto_save_enabled,
            skip_empty: config.skip_empty_drafts,
            status_display: Duration::from_millis(config.status_display_ms),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }
}

/// How an explicit save request resolved when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A persist call carrying this content (or newer) succeeded.
    Saved,
    /// The content already matched the last persisted snapshot.
    Unchanged,
    /// Autosave is disabled for this coordinator.
    Disabled,
    /// The content was blank and blank drafts are skipped.
    SkippedEmpty,
    /// The coordinator was disposed before the request resolved.
    Disposed,
}
