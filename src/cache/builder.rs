//! Cache Builder Module
//!
//! Collects the options shared by [`TtlCache`] and [`DocumentCache`].

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::cache::{Document, DocumentCache, TtlCache};
use crate::clock::{duration_ms, Clock, SystemClock};

// == Settings ==
/// Resolved cache options, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Cache-wide time to live; `None` disables expiry
    pub ttl_ms: Option<u64>,
    /// Maximum entry count; `None` is unbounded
    pub capacity: Option<NonZeroUsize>,
    /// Whether reads renew the entry they hit
    pub renew_on_read: bool,
    /// How long after insertion reads may keep renewing an entry
    pub max_lifetime_ms: Option<u64>,
}

// == Cache Builder ==
/// Builder for chained caches.
///
/// ```
/// use std::time::Duration;
/// use cachew::cache::TtlCache;
///
/// let mut cache: TtlCache<String, u32> = TtlCache::<String, u32>::builder()
///     .ttl(Duration::from_secs(30))
///     .capacity(1_000)
///     .renew_on_read(true)
///     .build();
/// cache.set("answer".to_string(), 42);
/// assert_eq!(cache.get("answer"), Some(&42));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder<C = SystemClock> {
    settings: Settings,
    clock: C,
}

impl CacheBuilder<SystemClock> {
    /// Starts from an unbounded, non-expiring cache on the system clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> CacheBuilder<C> {
    /// Sets the cache-wide TTL. A zero duration disables expiry.
    pub fn ttl(self, ttl: Duration) -> Self {
        self.ttl_ms(duration_ms(ttl))
    }

    /// Sets the cache-wide TTL in milliseconds. Zero disables expiry.
    pub fn ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.settings.ttl_ms = (ttl_ms > 0).then_some(ttl_ms);
        self
    }

    /// Caps the entry count. A capacity of zero leaves the cache unbounded.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.settings.capacity = NonZeroUsize::new(capacity);
        self
    }

    /// Makes reads renew the entry they hit.
    pub fn renew_on_read(mut self, renew: bool) -> Self {
        self.settings.renew_on_read = renew;
        self
    }

    /// Stops reads from renewing an entry once it is this old.
    /// A zero duration removes the cap.
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        let ms = duration_ms(lifetime);
        self.settings.max_lifetime_ms = (ms > 0).then_some(ms);
        self
    }

    /// Swaps the time source.
    pub fn clock<C2: Clock>(self, clock: C2) -> CacheBuilder<C2> {
        CacheBuilder {
            settings: self.settings,
            clock,
        }
    }

    /// The options collected so far.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Builds a keyed TTL cache.
    pub fn build<K, V>(self) -> TtlCache<K, V, C>
    where
        K: Eq + Hash + Clone,
    {
        TtlCache::from_parts(self.settings, self.clock)
    }

    /// Builds a document cache looked up by the given index fields.
    pub fn build_documents<D, I, S>(self, indices: I) -> DocumentCache<D, C>
    where
        D: Document,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DocumentCache::from_parts(indices, self.settings, self.clock)
    }
}
