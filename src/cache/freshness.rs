//! Freshness Chain Module
//!
//! The entry chain, its single expiry deadline, and the options that govern
//! both. [`TtlCache`](crate::cache::TtlCache) and
//! [`DocumentCache`](crate::cache::DocumentCache) keep their own lookups on
//! top of it and leave ordering, renewal and re-arming to this type.

use crate::cache::builder::Settings;
use crate::cache::chain::{EntryChain, EntryId};
use crate::cache::entry::Stamp;
use crate::cache::scheduler::ExpiryScheduler;

// == Stamped Trait ==
/// A chained item carrying a freshness [`Stamp`].
pub(crate) trait Stamped {
    fn stamp(&self) -> &Stamp;

    fn stamp_mut(&mut self) -> &mut Stamp;
}

// == Freshness Chain ==
/// Entries ordered oldest-first, with the deadline armed for the oldest.
///
/// Invariant: while the chain is non-empty and a TTL is set, exactly one
/// deadline is armed, no earlier than the head's `touched_at + ttl` unless
/// clamped to the time it was re-armed.
#[derive(Debug)]
pub(crate) struct FreshnessChain<T> {
    pub(crate) chain: EntryChain<T>,
    pub(crate) scheduler: ExpiryScheduler,
    pub(crate) settings: Settings,
}

impl<T: Stamped> FreshnessChain<T> {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            chain: EntryChain::new(),
            scheduler: ExpiryScheduler::new(),
            settings,
        }
    }

    /// Reap deadline of the oldest entry. `None` when empty or without TTL.
    pub(crate) fn oldest_deadline(&self) -> Option<u64> {
        let ttl = self.settings.ttl_ms?;
        self.chain.front().map(|item| item.stamp().expires_at(ttl))
    }

    pub(crate) fn rearm_oldest(&mut self, now: u64) {
        let deadline = self.oldest_deadline();
        self.scheduler.rearm(deadline, now);
    }

    // == Push ==
    /// Appends an item as the newest entry.
    ///
    /// The first entry of an empty chain arms the timer. Later entries
    /// expire after the current head, so the pending deadline stands.
    pub(crate) fn push(&mut self, item: T, now: u64) -> EntryId {
        let was_empty = self.chain.is_empty();
        let id = self.chain.push_back(item);
        if was_empty {
            if let Some(ttl) = self.settings.ttl_ms {
                self.scheduler.arm_after(now, ttl);
            }
        }
        id
    }

    // == Renew ==
    /// Restamps an entry and moves it to the newest position.
    ///
    /// Renewing the oldest entry, including a lone one, re-arms the timer for
    /// whichever entry is oldest afterwards.
    pub(crate) fn renew(&mut self, id: EntryId, now: u64) {
        let Some(item) = self.chain.get_mut(id) else {
            return;
        };
        item.stamp_mut().renew(now);

        let was_head = self.chain.head() == Some(id);
        self.chain.move_to_back(id);
        if was_head {
            self.rearm_oldest(now);
        }
    }

    /// Whether a read at `now` may still renew the entry.
    pub(crate) fn renewable(&self, id: EntryId, now: u64) -> bool {
        self.chain
            .get(id)
            .is_some_and(|item| item.stamp().within_lifetime(self.settings.max_lifetime_ms, now))
    }

    pub(crate) fn over_capacity(&self) -> bool {
        self.settings
            .capacity
            .is_some_and(|capacity| self.chain.len() > capacity.get())
    }

    // == Unlink ==
    /// Removes an entry, re-arming the timer when it was the oldest.
    pub(crate) fn unlink(&mut self, id: EntryId, now: u64) -> Option<T> {
        let was_head = self.chain.head() == Some(id);
        let item = self.chain.remove(id)?;
        if was_head {
            self.rearm_oldest(now);
        }
        Some(item)
    }

    /// Removes the oldest entry for capacity and re-arms for its successor.
    pub(crate) fn evict_oldest(&mut self, now: u64) -> Option<(EntryId, T)> {
        let id = self.chain.head()?;
        let item = self.unlink(id, now)?;
        Some((id, item))
    }

    /// Removes the oldest entry without touching the timer.
    ///
    /// [`Expiring::tick`](crate::cache::Expiring::tick) re-arms after reaping.
    pub(crate) fn take_oldest(&mut self) -> Option<(EntryId, T)> {
        let id = self.chain.head()?;
        let item = self.chain.remove(id)?;
        Some((id, item))
    }

    pub(crate) fn clear(&mut self) {
        self.chain.clear();
        self.scheduler.cancel();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    const TTL: u64 = 50;

    #[derive(Debug)]
    struct Item {
        name: &'static str,
        stamp: Stamp,
    }

    impl Stamped for Item {
        fn stamp(&self) -> &Stamp {
            &self.stamp
        }

        fn stamp_mut(&mut self) -> &mut Stamp {
            &mut self.stamp
        }
    }

    fn item(name: &'static str, now: u64) -> Item {
        Item {
            name,
            stamp: Stamp::new(now),
        }
    }

    fn freshness(capacity: usize, max_lifetime_ms: Option<u64>) -> FreshnessChain<Item> {
        FreshnessChain::new(Settings {
            ttl_ms: Some(TTL),
            capacity: NonZeroUsize::new(capacity),
            renew_on_read: false,
            max_lifetime_ms,
        })
    }

    fn names(chain: &FreshnessChain<Item>) -> Vec<&'static str> {
        chain.chain.iter().map(|item| item.name).collect()
    }

    #[test]
    fn test_only_first_push_arms() {
        let mut chain = freshness(0, None);
        assert!(!chain.scheduler.is_armed());

        chain.push(item("able", 10), 10);
        assert_eq!(chain.scheduler.deadline(), Some(10 + TTL));

        chain.push(item("baker", 30), 30);
        assert_eq!(chain.scheduler.deadline(), Some(10 + TTL));
    }

    #[test]
    fn test_push_without_ttl_stays_idle() {
        let mut chain: FreshnessChain<Item> = FreshnessChain::new(Settings::default());
        chain.push(item("able", 0), 0);

        assert!(!chain.scheduler.is_armed());
        assert!(chain.oldest_deadline().is_none());
    }

    #[test]
    fn test_renewing_lone_entry_pushes_deadline() {
        let mut chain = freshness(0, None);
        let able = chain.push(item("able", 0), 0);

        chain.renew(able, 40);

        assert_eq!(chain.scheduler.deadline(), Some(40 + TTL));
        assert_eq!(chain.oldest_deadline(), Some(40 + TTL));
    }

    #[test]
    fn test_renewing_head_moves_it_and_rearms() {
        let mut chain = freshness(0, None);
        let able = chain.push(item("able", 0), 0);
        chain.push(item("baker", 20), 20);

        chain.renew(able, 30);

        assert_eq!(names(&chain), vec!["baker", "able"]);
        assert_eq!(chain.scheduler.deadline(), Some(20 + TTL));
    }

    #[test]
    fn test_renewing_tail_keeps_deadline() {
        let mut chain = freshness(0, None);
        chain.push(item("able", 0), 0);
        let baker = chain.push(item("baker", 20), 20);

        chain.renew(baker, 30);

        assert_eq!(names(&chain), vec!["able", "baker"]);
        assert_eq!(chain.scheduler.deadline(), Some(TTL));
    }

    #[test]
    fn test_renewable_within_lifetime() {
        let mut chain = freshness(0, Some(100));
        let able = chain.push(item("able", 0), 0);

        assert!(chain.renewable(able, 99));
        assert!(!chain.renewable(able, 100));

        chain.unlink(able, 0);
        assert!(!chain.renewable(able, 0));
    }

    #[test]
    fn test_unlink_head_rearms_and_last_cancels() {
        let mut chain = freshness(0, None);
        let able = chain.push(item("able", 0), 0);
        let baker = chain.push(item("baker", 15), 15);

        assert_eq!(chain.unlink(able, 20).map(|item| item.name), Some("able"));
        assert_eq!(chain.scheduler.deadline(), Some(15 + TTL));

        chain.unlink(baker, 20);
        assert!(!chain.scheduler.is_armed());
        assert!(chain.unlink(baker, 20).is_none());
    }

    #[test]
    fn test_evict_oldest_over_capacity() {
        let mut chain = freshness(2, None);
        let able = chain.push(item("able", 0), 0);
        chain.push(item("baker", 10), 10);
        assert!(!chain.over_capacity());

        chain.push(item("charlie", 20), 20);
        assert!(chain.over_capacity());

        let (id, evicted) = chain.evict_oldest(20).unwrap();
        assert_eq!(id, able);
        assert_eq!(evicted.name, "able");
        assert_eq!(chain.scheduler.deadline(), Some(10 + TTL));
        assert!(!chain.over_capacity());
    }

    #[test]
    fn test_take_oldest_leaves_timer() {
        let mut chain = freshness(0, None);
        chain.push(item("able", 0), 0);
        chain.push(item("baker", 10), 10);

        let (_, taken) = chain.take_oldest().unwrap();
        assert_eq!(taken.name, "able");
        assert_eq!(chain.scheduler.deadline(), Some(TTL));
    }

    #[test]
    fn test_past_deadline_is_clamped_on_rearm() {
        let mut chain = freshness(0, None);
        let able = chain.push(item("able", 0), 0);
        chain.push(item("baker", 10), 10);

        chain.unlink(able, 200);
        assert_eq!(chain.scheduler.deadline(), Some(200));
    }

    #[test]
    fn test_clear_cancels() {
        let mut chain = freshness(0, None);
        chain.push(item("able", 0), 0);

        chain.clear();
        assert!(chain.chain.is_empty());
        assert!(!chain.scheduler.is_armed());
    }
}
