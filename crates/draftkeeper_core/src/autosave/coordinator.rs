//! The coordinator task and the handle editors talk to.

use super::debounce::{Debouncer, ScheduleOutcome};
use super::gate::{Admission, SaveGate};
use super::protocol::{Command, SaveReply};
use super::status::{SaveStatus, StatusReporter};
use super::tracker::ChangeTracker;
use super::{AutosaveOptions, DraftContent, Persist, SaveOutcome};
use crate::error::PersistenceError;
use crate::models::document::DocumentId;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type PersistTask = JoinHandle<Result<(), PersistenceError>>;

/// Editor-facing handle for one document's coordinator.
///
/// Every method is safe to call after [`AutosaveHandle::dispose`]; they become
/// no-ops. Dropping the handle disposes the coordinator.
pub struct AutosaveHandle<C> {
    document_id: DocumentId,
    cmd_tx: mpsc::UnboundedSender<Command<C>>,
    status_rx: watch::Receiver<SaveStatus>,
    disposed: Arc<AtomicBool>,
}

impl<C> AutosaveHandle<C> {
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// Current status snapshot.
    pub fn status(&self) -> SaveStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver that observes every published status change.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Tear the coordinator down.
    ///
    /// Cancels the pending timer. An in-flight persist call keeps running but
    /// its result is ignored, and the status is never published again.
    /// Calling this more than once is harmless.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(document = %self.document_id, "disposing autosave coordinator");
        let _ = self.cmd_tx.send(Command::Dispose);
    }
}

impl<C: DraftContent> AutosaveHandle<C> {
    /// Report the editor's full current content.
    pub fn notify_edit(&self, content: C) {
        if self.is_disposed() {
            return;
        }
        let _ = self.cmd_tx.send(Command::Edit(content));
    }

    /// Save `content` now, skipping the quiet period.
    ///
    /// Waits for any in-flight call to finish first; there is never more than
    /// one call at a time.
    ///
    /// # Returns
    /// The [`SaveOutcome`] once a save carrying this content (or newer) settles.
    ///
    /// # Errors
    /// Returns the [`PersistenceError`] reported by the persist call. The
    /// content stays unsaved and a later `save_now` retries it.
    pub async fn save_now(&self, content: C) -> Result<SaveOutcome, PersistenceError> {
        if self.is_disposed() {
            return Ok(SaveOutcome::Disposed);
        }
        let (reply, rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(Command::SaveNow { content, reply })
            .is_err()
        {
            return Ok(SaveOutcome::Disposed);
        }
        rx.await.unwrap_or(Ok(SaveOutcome::Disposed))
    }

    /// Turn autosaving on or off. Disabling cancels the pending timer; a call
    /// already in flight still settles.
    pub fn set_enabled(&self, enabled: bool) {
        if self.is_disposed() {
            return;
        }
        let _ = self.cmd_tx.send(Command::SetEnabled(enabled));
    }
}

impl<C> Drop for AutosaveHandle<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Start a coordinator for `document_id`.
///
/// `initial` is the content already stored for the document, if known. Edits
/// equal to it are not saved.
///
/// # Returns
/// The handle used to feed edits and observe status.
///
/// # Panics
/// Panics when called outside a tokio runtime.
pub fn spawn_autosave<C, P>(
    document_id: DocumentId,
    initial: Option<C>,
    options: AutosaveOptions,
    persist: P,
) -> AutosaveHandle<C>
where
    C: DraftContent,
    P: Persist<C>,
{
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SaveStatus::default());
    let disposed = Arc::new(AtomicBool::new(false));

    let coordinator = Coordinator {
        document_id: document_id.clone(),
        persist,
        tracker: ChangeTracker::new(initial, options.skip_empty),
        debouncer: Debouncer::new(options.debounce),
        gate: SaveGate::new(),
        status: StatusReporter::new(status_tx, options.status_display, disposed.clone()),
        enabled: options.enabled,
        disposed: disposed.clone(),
        in_flight: None,
    };
    tokio::spawn(coordinator.run(cmd_rx));

    AutosaveHandle {
        document_id,
        cmd_tx,
        status_rx,
        disposed,
    }
}

struct Coordinator<C, P> {
    document_id: DocumentId,
    persist: P,
    tracker: ChangeTracker<C>,
    debouncer: Debouncer<C>,
    gate: SaveGate<C, SaveReply>,
    status: StatusReporter,
    enabled: bool,
    disposed: Arc<AtomicBool>,
    in_flight: Option<PersistTask>,
}

async fn wait_for_settle(task: Option<&mut PersistTask>) -> Result<(), PersistenceError> {
    match task {
        Some(task) => match task.await {
            Ok(result) => result,
            Err(err) => Err(PersistenceError::Aborted(err.to_string())),
        },
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn reply_all(waiters: Vec<SaveReply>, result: Result<SaveOutcome, PersistenceError>) {
    for waiter in waiters {
        let _ = waiter.send(result.clone());
    }
}

impl<C, P> Coordinator<C, P>
where
    C: DraftContent,
    P: Persist<C>,
{
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command<C>>) {
        loop {
            if self.is_disposed() {
                break;
            }
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Dispose) | None => break,
                    Some(command) => self.handle(command),
                },
                result = wait_for_settle(self.in_flight.as_mut()) => {
                    self.in_flight = None;
                    self.on_settled(result);
                }
                _ = sleep_until_opt(self.debouncer.deadline()) => self.on_debounce_elapsed(),
                _ = sleep_until_opt(self.status.revert_deadline()) => {
                    self.status.expire(Instant::now());
                }
            }
        }
        self.shutdown();
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn handle(&mut self, command: Command<C>) {
        if self.is_disposed() {
            return;
        }
        match command {
            Command::Edit(content) => self.on_edit(content),
            Command::SaveNow { content, reply } => self.on_save_now(content, reply),
            Command::SetEnabled(enabled) => self.on_set_enabled(enabled),
            Command::Dispose => {}
        }
    }

    fn on_edit(&mut self, content: C) {
        if !self.enabled {
            return;
        }
        if self.tracker.suppresses(&content) {
            // Older pending content must not be sent in place of the blank draft.
            debug!(document = %self.document_id, "blank draft not scheduled");
            self.debouncer.cancel();
            self.gate.clear_deferred();
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::SkippedEmpty));
            self.status.settle_idle();
            return;
        }
        if self.debouncer.pending() == Some(&content) {
            return;
        }
        if self.gate.in_flight() == Some(&content) {
            // Edits returned to the content being written. Queue it behind the
            // call so a failure leaves it admitted again.
            self.debouncer.cancel();
            self.gate.promote_next_waiters();
            self.submit(content);
            return;
        }
        if !self.gate.is_busy() && !self.tracker.has_changed(&content) {
            // Edits returned to the stored content.
            self.debouncer.cancel();
            self.gate.clear_deferred();
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::Unchanged));
            self.status.settle_idle();
            return;
        }

        match self.debouncer.schedule(content, Instant::now()) {
            ScheduleOutcome::Scheduled => {
                debug!(document = %self.document_id, "autosave scheduled");
            }
            ScheduleOutcome::Restarted => {
                debug!(document = %self.document_id, "autosave timer restarted");
            }
            ScheduleOutcome::AlreadyPending => return,
        }
        self.status.pending_change();
    }

    fn on_debounce_elapsed(&mut self) {
        let Some(content) = self.debouncer.take_due(Instant::now()) else {
            return;
        };
        if !self.gate.is_busy() && !self.tracker.has_changed(&content) {
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::Unchanged));
            self.status.settle_idle();
            return;
        }
        self.submit(content);
    }

    fn on_save_now(&mut self, content: C, reply: SaveReply) {
        if !self.enabled {
            let _ = reply.send(Ok(SaveOutcome::Disabled));
            return;
        }
        if self.tracker.suppresses(&content) {
            let _ = reply.send(Ok(SaveOutcome::SkippedEmpty));
            return;
        }
        self.debouncer.cancel();

        if self.gate.is_busy() {
            if self.gate.in_flight() == Some(&content) {
                self.gate.clear_deferred();
                self.gate.promote_next_waiters();
                self.gate.wait_current(reply);
            } else {
                self.gate.wait_next(reply);
                self.submit(content);
            }
            return;
        }

        if !self.tracker.has_changed(&content) {
            let _ = reply.send(Ok(SaveOutcome::Unchanged));
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::Unchanged));
            self.status.settle_idle();
            return;
        }
        self.gate.wait_next(reply);
        self.submit(content);
    }

    fn on_set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        debug!(document = %self.document_id, enabled, "autosave toggled");
        if !enabled {
            self.debouncer.cancel();
            self.gate.clear_deferred();
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::Disabled));
            self.status.settle_idle();
        }
    }

    fn submit(&mut self, content: C) {
        match self.gate.admit(content) {
            Admission::Accepted(content) => self.start_persist(content),
            Admission::Deferred => {
                debug!(document = %self.document_id, "save in flight; newest content deferred");
            }
        }
    }

    fn start_persist(&mut self, content: C) {
        self.status.saving();
        let call = self.persist.persist(&self.document_id, content);
        self.in_flight = Some(tokio::spawn(call));
    }

    fn on_settled(&mut self, result: Result<(), PersistenceError>) {
        let Some(settled) = self.gate.settle() else {
            return;
        };
        if self.is_disposed() {
            return;
        }

        let now = Instant::now();
        let outcome = match result {
            Ok(()) => {
                info!(document = %self.document_id, "autosave completed");
                self.tracker.record_success(settled.content);
                self.status.saved(Utc::now(), now);
                Ok(SaveOutcome::Saved)
            }
            Err(err) => {
                warn!(document = %self.document_id, "autosave failed: {}", err);
                self.status.failed(err.to_string(), now);
                Err(err)
            }
        };
        reply_all(settled.waiters, outcome);

        self.admit_deferred();
        if !self.gate.is_busy() && self.debouncer.is_pending() {
            self.status.pending_change();
        }
    }

    /// Start the save that queued up behind the call that just settled.
    fn admit_deferred(&mut self) {
        let Some(deferred) = self.gate.take_deferred() else {
            return;
        };

        if self.debouncer.is_pending() {
            // A newer edit is waiting out its quiet period. Explicit savers
            // should not wait for it, everyone else can.
            if self.gate.has_next_waiters() {
                if let Some(newer) = self.debouncer.cancel() {
                    self.submit(newer);
                }
            } else {
                debug!(document = %self.document_id, "deferred save superseded by newer edit");
            }
            return;
        }

        if !self.tracker.has_changed(&deferred) {
            reply_all(self.gate.drain_next_waiters(), Ok(SaveOutcome::Unchanged));
            return;
        }
        self.submit(deferred);
    }

    fn shutdown(mut self) {
        self.disposed.store(true, Ordering::Release);
        self.debouncer.cancel();
        if self.in_flight.take().is_some() {
            debug!(document = %self.document_id, "detached in-flight save on dispose");
        }
        debug!(document = %self.document_id, "autosave coordinator stopped");
    }
}
