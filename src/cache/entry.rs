//! Cache Entry Module
//!
//! Defines chain entries and the freshness stamp that decides when they expire.

use crate::cache::freshness::Stamped;

// == Stamp ==
/// Freshness metadata carried by every chained entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Last insert or renewal (Unix milliseconds)
    pub touched_at: u64,
    /// First insertion (Unix milliseconds), kept across renewals
    pub created_at: u64,
}

impl Stamp {
    /// Creates a stamp for an entry inserted at `now`.
    pub fn new(now: u64) -> Self {
        Self {
            touched_at: now,
            created_at: now,
        }
    }

    // == Renew ==
    /// Marks the entry as fresh at `now`.
    pub fn renew(&mut self, now: u64) {
        self.touched_at = now;
    }

    // == Expires At ==
    /// Returns the reap deadline for a cache-wide TTL.
    pub fn expires_at(&self, ttl_ms: u64) -> u64 {
        self.touched_at.saturating_add(ttl_ms)
    }

    // == Is Expired ==
    /// Checks whether the entry is due for reaping.
    ///
    /// Boundary condition: an entry is expired once `now` reaches its
    /// deadline, not only after it.
    pub fn is_expired(&self, ttl_ms: u64, now: u64) -> bool {
        now >= self.expires_at(ttl_ms)
    }

    // == Time To Live ==
    /// Returns the milliseconds left before the deadline, zero once passed.
    pub fn ttl_remaining_ms(&self, ttl_ms: u64, now: u64) -> u64 {
        self.expires_at(ttl_ms).saturating_sub(now)
    }

    // == Renewal Window ==
    /// Whether a read at `now` may still renew the entry.
    ///
    /// With no lifetime cap, reads may always renew.
    pub fn within_lifetime(&self, max_lifetime_ms: Option<u64>, now: u64) -> bool {
        match max_lifetime_ms {
            Some(max) => now.saturating_sub(self.created_at) < max,
            None => true,
        }
    }
}

// == Cache Entry ==
/// A keyed value in a [`TtlCache`](crate::cache::TtlCache) chain.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    /// The key, kept so a reaped entry can be removed from the lookup
    pub key: K,
    /// The stored value
    pub value: V,
    /// Freshness metadata
    pub stamp: Stamp,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry inserted at `now`.
    pub fn new(key: K, value: V, now: u64) -> Self {
        Self {
            key,
            value,
            stamp: Stamp::new(now),
        }
    }
}

impl<K, V> Stamped for Entry<K, V> {
    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut Stamp {
        &mut self.stamp
    }
}
