//! TTL Cache Module
//!
//! Keyed cache combining a hash lookup, an entry chain ordered by freshness,
//! and a single expiry deadline.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tracing::debug;

use crate::cache::builder::{CacheBuilder, Settings};
use crate::cache::chain::EntryId;
use crate::cache::entry::Entry;
use crate::cache::freshness::FreshnessChain;
use crate::cache::scheduler::{Expiring, ExpiryScheduler};
use crate::cache::CacheStats;
use crate::clock::{Clock, SystemClock};

// == Eviction Cause ==
/// Why an entry left the cache without an explicit `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionCause {
    /// Pushed out by a newer entry at capacity
    Capacity,
    /// Reaped after its TTL elapsed
    Expired,
}

/// Callback receiving evicted entries.
pub type EvictionListener<K, V> = Box<dyn FnMut(K, V, EvictionCause) + Send>;

// == TTL Cache ==
/// Cache whose entries expire a fixed time after their last insert or renewal.
///
/// Entries are chained oldest-first. The oldest entry is the only one the
/// expiry deadline tracks, and the first evicted at capacity. Expiry is lazy:
/// an entry past its TTL stays readable until [`Expiring::tick`] reaps it.
pub struct TtlCache<K, V, C = SystemClock> {
    /// Key to chain slot
    lookup: HashMap<K, EntryId>,
    /// Entries, oldest first, with their deadline
    entries: FreshnessChain<Entry<K, V>>,
    clock: C,
    stats: CacheStats,
    listener: Option<EvictionListener<K, V>>,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates an unbounded cache without expiry.
    pub fn new() -> Self {
        CacheBuilder::new().build()
    }

    /// Creates an unbounded cache whose entries expire after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        CacheBuilder::new().ttl(ttl).build()
    }

    /// Starts a [`CacheBuilder`].
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }
}

impl<K, V> Default for TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    pub(crate) fn from_parts(settings: Settings, clock: C) -> Self {
        Self {
            lookup: HashMap::new(),
            entries: FreshnessChain::new(settings),
            clock,
            stats: CacheStats::new(),
            listener: None,
        }
    }

    // == Set ==
    /// Stores a value, renewing the key if it is already cached.
    ///
    /// A new key is appended as the newest entry. If that pushes the cache
    /// past capacity, the oldest entry is evicted. An existing key gets the
    /// new value and moves to the newest position.
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        let now = self.clock.now_ms();

        if let Some(&id) = self.lookup.get(&key) {
            if let Some(entry) = self.entries.chain.get_mut(id) {
                entry.value = value;
            }
            self.entries.renew(id, now);
            return self;
        }

        let id = self.entries.push(Entry::new(key.clone(), value, now), now);
        self.lookup.insert(key, id);

        if self.entries.over_capacity() {
            self.evict_oldest(now);
        }

        self.stats.set_total_entries(self.lookup.len());
        self
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// With renew-on-read enabled this renews the entry exactly like `set`
    /// with its current value, unless the entry has outlived `max_lifetime`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.lookup.get(key) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();

        if self.entries.settings.renew_on_read {
            let now = self.clock.now_ms();
            if self.entries.renewable(id, now) {
                self.entries.renew(id, now);
            }
        }

        self.entries.chain.get(id).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Reads a value without renewing it or touching statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.lookup.get(key)?;
        self.entries.chain.get(id).map(|entry| &entry.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.contains_key(key)
    }

    // == Remove ==
    /// Removes an entry regardless of its expiry state and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup.remove(key)?;
        let now = self.clock.now_ms();
        let entry = self.entries.unlink(id, now)?;

        self.stats.set_total_entries(self.lookup.len());
        Some(entry.value)
    }

    // == Clear ==
    /// Drops every entry without notifying the eviction listener.
    pub fn clear(&mut self) {
        self.lookup.clear();
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    /// Registers a callback for capacity evictions and TTL reaps.
    pub fn on_evict<F>(&mut self, listener: F) -> &mut Self
    where
        F: FnMut(K, V, EvictionCause) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.chain.iter().map(|entry| &entry.key)
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.chain.iter().map(|entry| (&entry.key, &entry.value))
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.entries.settings.ttl_ms.map(Duration::from_millis)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.entries.settings.capacity.map(|capacity| capacity.get())
    }

    pub fn renews_on_read(&self) -> bool {
        self.entries.settings.renew_on_read
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.lookup.len());
        stats
    }

    fn evict_oldest(&mut self, now: u64) {
        if let Some((_, entry)) = self.entries.evict_oldest(now) {
            self.lookup.remove(&entry.key);
            self.stats.record_eviction();
            debug!("Capacity reached, evicted oldest entry ({} remain)", self.lookup.len());
            self.notify(entry, EvictionCause::Capacity);
        }
    }

    fn notify(&mut self, entry: Entry<K, V>, cause: EvictionCause) {
        if let Some(listener) = self.listener.as_mut() {
            listener(entry.key, entry.value, cause);
        }
    }
}

impl<K, V, C> Expiring for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    fn scheduler(&self) -> &ExpiryScheduler {
        &self.entries.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut ExpiryScheduler {
        &mut self.entries.scheduler
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn oldest_deadline(&self) -> Option<u64> {
        self.entries.oldest_deadline()
    }

    fn reap_oldest(&mut self) {
        if let Some((_, entry)) = self.entries.take_oldest() {
            self.lookup.remove(&entry.key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.lookup.len());
            debug!("Reaped expired entry ({} remain)", self.lookup.len());
            self.notify(entry, EvictionCause::Expired);
        }
    }
}

impl<K, V, C> fmt::Debug for TtlCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.lookup.len())
            .field("settings", &self.entries.settings)
            .field("scheduler", &self.entries.scheduler)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
