//! Quiet-period timer bookkeeping.
//!
//! The debouncer holds no timer itself. The coordinator loop sleeps until
//! [`Debouncer::deadline`] and then calls [`Debouncer::take_due`].

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Pending<C> {
    content: C,
    deadline: Instant,
}

/// What a call to [`Debouncer::schedule`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScheduleOutcome {
    /// Nothing was pending; a new timer started.
    Scheduled,
    /// Different content replaced the pending one and the timer restarted.
    Restarted,
    /// The same content is already pending; the deadline is unchanged.
    AlreadyPending,
}

#[derive(Debug)]
pub(crate) struct Debouncer<C> {
    interval: Duration,
    pending: Option<Pending<C>>,
}

impl<C: PartialEq> Debouncer<C> {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub(crate) fn schedule(&mut self, content: C, now: Instant) -> ScheduleOutcome {
        let outcome = match &self.pending {
            Some(pending) if pending.content == content => return ScheduleOutcome::AlreadyPending,
            Some(_) => ScheduleOutcome::Restarted,
            None => ScheduleOutcome::Scheduled,
        };
        self.pending = Some(Pending {
            content,
            deadline: now + self.interval,
        });
        outcome
    }

    pub(crate) fn cancel(&mut self) -> Option<C> {
        self.pending.take().map(|pending| pending.content)
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub(crate) fn pending(&self) -> Option<&C> {
        self.pending.as_ref().map(|pending| &pending.content)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand over the pending content once its quiet period has elapsed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<C> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now);
        if due {
            self.cancel()
        } else {
            None
        }
    }
}
