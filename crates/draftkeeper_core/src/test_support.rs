//! Shared test-only helpers for draftkeeper_core.

use crate::autosave::{Persist, PersistFuture};
use crate::error::PersistenceError;
use crate::models::document::DocumentId;
use crate::Database;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

#[derive(Default)]
struct RecorderState {
    calls: Vec<(String, Instant)>,
    delay: Duration,
    failures: VecDeque<PersistenceError>,
    active: usize,
    max_active: usize,
    completed: usize,
}

/// [`Persist`] double that records every call when it starts.
///
/// Calls sleep for the configured delay (use paused tokio time) and fail with
/// scripted errors in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingPersist {
    state: Arc<Mutex<RecorderState>>,
}

impl RecordingPersist {
    fn lock(&self) -> std::sync::MutexGuard<'_, RecorderState> {
        self.state.lock().expect("recorder lock")
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        self.lock().delay = delay;
    }

    pub(crate) fn fail_next(&self, err: PersistenceError) {
        self.lock().failures.push_back(err);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Instant)> {
        self.lock().calls.clone()
    }

    pub(crate) fn contents(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .map(|(content, _)| content.clone())
            .collect()
    }

    pub(crate) fn max_active(&self) -> usize {
        self.lock().max_active
    }

    pub(crate) fn completed(&self) -> usize {
        self.lock().completed
    }
}

impl Persist<String> for RecordingPersist {
    fn persist(&self, _document_id: &DocumentId, content: String) -> PersistFuture {
        let (delay, failure) = {
            let mut state = self.lock();
            state.calls.push((content, Instant::now()));
            state.active += 1;
            state.max_active = state.max_active.max(state.active);
            (state.delay, state.failures.pop_front())
        };
        let state = self.state.clone();
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            {
                let mut state = state.lock().expect("recorder lock");
                state.active -= 1;
                state.completed += 1;
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}
