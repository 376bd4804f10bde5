//! Expiry Scheduler Module
//!
//! A single pending deadline per cache, fired by [`Expiring::tick`].
//!
//! The scheduler never runs anything by itself. Something drives it: a test
//! advancing a [`ManualClock`](crate::clock::ManualClock) and calling `tick`,
//! or the background task from [`crate::tasks`] sleeping until the deadline.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::debug;

// == Expiry Scheduler ==
/// Holds at most one armed deadline (Unix milliseconds).
///
/// States: idle (`deadline() == None`) and armed. Arming replaces any
/// previous deadline, so there is never more than one outstanding timer.
#[derive(Debug, Default)]
pub struct ExpiryScheduler {
    deadline: Option<u64>,
    waker: Option<Arc<Notify>>,
}

impl ExpiryScheduler {
    // == Constructor ==
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the armed deadline has been reached at `now`.
    pub fn is_due(&self, now: u64) -> bool {
        matches!(self.deadline, Some(deadline) if deadline <= now)
    }

    // == Arm ==
    /// Arms the timer for an absolute deadline, replacing the pending one.
    ///
    /// The waker is only signalled when the new deadline is earlier than the
    /// one a driver may already be sleeping on. A later deadline is picked up
    /// when the earlier one fires and finds nothing due.
    pub fn arm_at(&mut self, deadline: u64) {
        let sooner = self.deadline.map_or(true, |pending| deadline < pending);
        self.deadline = Some(deadline);
        if sooner {
            self.wake();
        }
    }

    /// Arms the timer `delay_ms` after `now`.
    pub fn arm_after(&mut self, now: u64, delay_ms: u64) {
        self.arm_at(now.saturating_add(delay_ms));
    }

    /// Arms for `deadline` clamped to `now`, or returns to idle without one.
    ///
    /// A deadline already in the past becomes `now`, which the next `tick`
    /// treats as immediately due.
    pub fn rearm(&mut self, deadline: Option<u64>, now: u64) {
        match deadline {
            Some(deadline) => self.arm_at(deadline.max(now)),
            None => self.cancel(),
        }
    }

    // == Cancel ==
    /// Returns to idle.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Installs the notifier signalled when a sooner deadline is armed.
    pub fn set_waker(&mut self, waker: Arc<Notify>) {
        self.waker = Some(waker);
    }

    fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker.notify_one();
        }
    }
}

// == Expiring Trait ==
/// A chained cache whose oldest entry is reaped by an [`ExpiryScheduler`].
///
/// Implementors provide access to their scheduler and their oldest entry;
/// the re-arm and fire logic is shared.
pub trait Expiring {
    fn scheduler(&self) -> &ExpiryScheduler;

    fn scheduler_mut(&mut self) -> &mut ExpiryScheduler;

    /// Current time on the cache's clock.
    fn now_ms(&self) -> u64;

    /// Reap deadline of the oldest entry. `None` when empty or without TTL.
    fn oldest_deadline(&self) -> Option<u64>;

    /// Removes the oldest entry as expired.
    fn reap_oldest(&mut self);

    /// The armed deadline, if any.
    fn next_deadline(&self) -> Option<u64> {
        self.scheduler().deadline()
    }

    // == Rearm ==
    /// Points the timer at the oldest entry, or idles it when there is none.
    fn rearm_oldest(&mut self, now: u64) {
        let deadline = self.oldest_deadline();
        self.scheduler_mut().rearm(deadline, now);
    }

    // == Tick ==
    /// Fires the timer if it is due and returns how many entries were reaped.
    ///
    /// Each round re-validates the oldest entry: a stale deadline whose entry
    /// was renewed in the meantime is pushed back instead of reaping. A newly
    /// exposed entry that is already due is handled in the next round rather
    /// than by recursion.
    fn tick(&mut self) -> usize {
        let now = self.now_ms();
        let mut reaped = 0;

        while self.scheduler().is_due(now) {
            match self.oldest_deadline() {
                // Fired against an empty chain
                None => self.scheduler_mut().cancel(),
                Some(deadline) if deadline > now => {
                    debug!("Expiry timer fired early, re-arming for {}", deadline);
                    self.scheduler_mut().arm_at(deadline);
                }
                Some(_) => {
                    self.reap_oldest();
                    reaped += 1;
                    self.rearm_oldest(now);
                }
            }
        }

        reaped
    }
}
