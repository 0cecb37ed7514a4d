// Keyseq Dispatch - Pending Timers
// Deferred callbacks and the inactivity reset owned by one subscription

use std::time::Instant;

use crate::input::KeyboardEvent;
use crate::matcher::BindingId;

/// A matched callback waiting to see whether a longer sequence wins
#[derive(Debug, Clone)]
pub struct DeferredCall {
    pub deadline: Instant,
    pub binding: BindingId,
    pub event: KeyboardEvent,
}

/// Timers that came due in one poll
#[derive(Debug, Default)]
pub struct Due {
    /// Deferred calls in the order they were scheduled
    pub calls: Vec<DeferredCall>,
    /// The inactivity timer expired; history must be dropped
    pub reset: bool,
}

impl Due {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && !self.reset
    }
}

/// All timers of a subscription. Nothing runs on its own: the owner polls
/// with the current time.
#[derive(Debug, Clone, Default)]
pub struct PendingTimers {
    deferred: Vec<DeferredCall>,
    reset_at: Option<Instant>,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, binding: BindingId, event: KeyboardEvent, deadline: Instant) {
        self.deferred.push(DeferredCall {
            deadline,
            binding,
            event,
        });
    }

    /// Replace the inactivity timer
    pub fn arm_reset(&mut self, deadline: Instant) {
        self.reset_at = Some(deadline);
    }

    pub fn cancel_all(&mut self) {
        if !self.is_empty() {
            log::trace!(
                "Cancelling {} deferred calls and the reset timer",
                self.deferred.len()
            );
        }
        self.deferred.clear();
        self.reset_at = None;
    }

    /// Remove and return everything due at `now`
    pub fn take_due(&mut self, now: Instant) -> Due {
        let (calls, pending): (Vec<_>, Vec<_>) = self
            .deferred
            .drain(..)
            .partition(|call| call.deadline <= now);
        self.deferred = pending;

        let reset = self.reset_at.is_some_and(|at| at <= now);
        if reset {
            self.reset_at = None;
        }
        Due { calls, reset }
    }

    /// Earliest instant at which a poll would do something
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred
            .iter()
            .map(|call| call.deadline)
            .chain(self.reset_at)
            .min()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deferred.is_empty() && self.reset_at.is_none()
    }
}
