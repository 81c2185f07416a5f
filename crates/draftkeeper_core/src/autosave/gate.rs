//! Single in-flight save guard with one deferred slot.

use std::mem;

/// Result of offering content to the gate.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Admission<C> {
    /// No call was in flight; the caller must start persisting this content.
    Accepted(C),
    /// A call is in flight; the content replaced the deferred slot.
    Deferred,
}

/// The content and waiters released when the in-flight call finishes.
#[derive(Debug)]
pub(crate) struct Settled<C, W> {
    pub(crate) content: C,
    pub(crate) waiters: Vec<W>,
}

/// Enforces at most one persistence call at a time.
///
/// Waiters are explicit-save callers. `current` waiters resolve with the
/// in-flight call; `next` waiters resolve with whichever call is admitted next.
#[derive(Debug)]
pub(crate) struct SaveGate<C, W> {
    in_flight: Option<C>,
    deferred: Option<C>,
    current_waiters: Vec<W>,
    next_waiters: Vec<W>,
}

impl<C, W> SaveGate<C, W> {
    pub(crate) fn new() -> Self {
        Self {
            in_flight: None,
            deferred: None,
            current_waiters: Vec::new(),
            next_waiters: Vec::new(),
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn in_flight(&self) -> Option<&C> {
        self.in_flight.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn deferred(&self) -> Option<&C> {
        self.deferred.as_ref()
    }

    pub(crate) fn admit(&mut self, content: C) -> Admission<C>
    where
        C: Clone,
    {
        if self.in_flight.is_some() {
            self.deferred = Some(content);
            return Admission::Deferred;
        }
        self.in_flight = Some(content.clone());
        let next = mem::take(&mut self.next_waiters);
        self.current_waiters.extend(next);
        Admission::Accepted(content)
    }

    /// Release the in-flight slot. Returns `None` when nothing was in flight.
    pub(crate) fn settle(&mut self) -> Option<Settled<C, W>> {
        let content = self.in_flight.take()?;
        Some(Settled {
            content,
            waiters: mem::take(&mut self.current_waiters),
        })
    }

    pub(crate) fn take_deferred(&mut self) -> Option<C> {
        self.deferred.take()
    }

    pub(crate) fn clear_deferred(&mut self) {
        self.deferred = None;
    }

    pub(crate) fn wait_current(&mut self, waiter: W) {
        self.current_waiters.push(waiter);
    }

    pub(crate) fn wait_next(&mut self, waiter: W) {
        self.next_waiters.push(waiter);
    }

    /// Attach pending `next` waiters to the call already in flight.
    pub(crate) fn promote_next_waiters(&mut self) {
        let next = mem::take(&mut self.next_waiters);
        self.current_waiters.extend(next);
    }

    pub(crate) fn has_next_waiters(&self) -> bool {
        !self.next_waiters.is_empty()
    }

    pub(crate) fn drain_next_waiters(&mut self) -> Vec<W> {
        mem::take(&mut self.next_waiters)
    }
}

#[cfg(test)]
mod tests {
    use super::{Admission, SaveGate};

    #[test]
    fn admits_when_idle_and_defers_while_busy() {
        let mut gate: SaveGate<&str, u8> = SaveGate::new();
        assert_eq!(gate.admit("one"), Admission::Accepted("one"));
        assert!(gate.is_busy());
        assert_eq!(gate.in_flight(), Some(&"one"));

        assert_eq!(gate.admit("two"), Admission::Deferred);
        assert_eq!(gate.admit("three"), Admission::Deferred);
        assert_eq!(gate.deferred(), Some(&"three"));
        assert_eq!(gate.in_flight(), Some(&"one"));
    }

    #[test]
    fn settle_frees_the_slot_and_keeps_deferred() {
        let mut gate: SaveGate<&str, u8> = SaveGate::new();
        gate.admit("one");
        gate.admit("two");

        let settled = gate.settle().expect("in flight");
        assert_eq!(settled.content, "one");
        assert!(!gate.is_busy());
        assert_eq!(gate.take_deferred(), Some("two"));
        assert!(gate.settle().is_none());
    }

    #[test]
    fn next_waiters_join_the_following_admission() {
        let mut gate: SaveGate<&str, u8> = SaveGate::new();
        gate.admit("one");
        gate.wait_current(1);
        gate.wait_next(2);

        let first = gate.settle().expect("first");
        assert_eq!(first.waiters, vec![1]);

        gate.admit("two");
        let second = gate.settle().expect("second");
        assert_eq!(second.waiters, vec![2]);
    }

    #[test]
    fn promote_and_drain_move_next_waiters() {
        let mut gate: SaveGate<&str, u8> = SaveGate::new();
        gate.admit("one");
        gate.wait_next(7);
        gate.promote_next_waiters();
        assert!(gate.drain_next_waiters().is_empty());
        assert_eq!(gate.settle().expect("settled").waiters, vec![7]);

        gate.wait_next(8);
        assert_eq!(gate.drain_next_waiters(), vec![8]);
        gate.clear_deferred();
        assert_eq!(gate.deferred(), None);
    }
}
