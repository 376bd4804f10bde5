//! Document Cache Module
//!
//! A TTL cache of whole documents, reachable through several named index
//! fields instead of a single key. Chain ordering, capacity eviction and
//! reaping work exactly as in [`TtlCache`](crate::cache::TtlCache).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::cache::builder::Settings;
use crate::cache::chain::EntryId;
use crate::cache::entry::Stamp;
use crate::cache::freshness::{FreshnessChain, Stamped};
use crate::cache::scheduler::{Expiring, ExpiryScheduler};
use crate::cache::CacheStats;
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};

// == Document Trait ==
/// A record that exposes named fields for indexing.
pub trait Document {
    /// The value of field `name`, if the document has one.
    fn field(&self, name: &str) -> Option<String>;
}

impl Document for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Document for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Strings index as-is; numbers and booleans by their JSON text. Other
/// values, and non-object documents, have no indexable fields.
impl Document for Value {
    fn field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct DocEntry<D> {
    doc: D,
    stamp: Stamp,
}

impl<D> Stamped for DocEntry<D> {
    fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut Stamp {
        &mut self.stamp
    }
}

// == Document Cache ==
/// Expiring cache of documents looked up by any declared index field.
pub struct DocumentCache<D, C = SystemClock> {
    indices: Vec<String>,
    /// Index name, then field value, to chain slot
    lookup: HashMap<String, HashMap<String, EntryId>>,
    entries: FreshnessChain<DocEntry<D>>,
    clock: C,
    stats: CacheStats,
}

impl<D, C> DocumentCache<D, C>
where
    D: Document,
    C: Clock,
{
    pub(crate) fn from_parts<I, S>(indices: I, settings: Settings, clock: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in indices {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let lookup = names
            .iter()
            .map(|name| (name.clone(), HashMap::new()))
            .collect();

        Self {
            indices: names,
            lookup,
            entries: FreshnessChain::new(settings),
            clock,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a document as the newest entry.
    ///
    /// Any cached document sharing a value with it on any index is dropped
    /// first, and cleared from every index it was registered under.
    pub fn set(&mut self, doc: D) -> &mut Self {
        let now = self.clock.now_ms();

        let mut colliding: Vec<EntryId> = Vec::new();
        for name in &self.indices {
            let Some(value) = doc.field(name) else {
                continue;
            };
            if let Some(&id) = self.lookup.get(name).and_then(|by_value| by_value.get(&value)) {
                if !colliding.contains(&id) {
                    colliding.push(id);
                }
            }
        }
        for id in colliding {
            self.unlink(id, now);
        }

        let id = self.entries.push(
            DocEntry {
                doc,
                stamp: Stamp::new(now),
            },
            now,
        );
        self.register(id);

        if self.entries.over_capacity() {
            if let Some((oldest, entry)) = self.entries.evict_oldest(now) {
                self.unregister(oldest, &entry.doc);
                self.stats.record_eviction();
                debug!("Capacity reached, evicted oldest document");
            }
        }

        self.stats.set_total_entries(self.entries.chain.len());
        self
    }

    // == Get ==
    /// Finds a document by the value of one of its index fields.
    ///
    /// Renews the document when the cache renews on read.
    pub fn get(&mut self, index: &str, key: &str) -> Result<Option<&D>> {
        let renew = self.entries.settings.renew_on_read;
        self.fetch(index, key, renew)
    }

    /// Like [`get`](Self::get), but always renews the document it finds.
    pub fn get_renewed(&mut self, index: &str, key: &str) -> Result<Option<&D>> {
        self.fetch(index, key, true)
    }

    // == Remove ==
    /// Removes the document found through `index` and returns it.
    pub fn remove(&mut self, index: &str, key: &str) -> Result<Option<D>> {
        let Some(id) = self.find(index, key)? else {
            return Ok(None);
        };
        let now = self.clock.now_ms();
        let removed = self.unlink(id, now);
        self.stats.set_total_entries(self.entries.chain.len());
        Ok(removed)
    }

    /// Declared index names, in declaration order.
    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.entries.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.chain.is_empty()
    }

    /// Documents from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.entries.chain.iter().map(|entry| &entry.doc)
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.chain.len());
        stats
    }

    fn fetch(&mut self, index: &str, key: &str, renew: bool) -> Result<Option<&D>> {
        let Some(id) = self.find(index, key)? else {
            self.stats.record_miss();
            return Ok(None);
        };
        self.stats.record_hit();

        if renew {
            let now = self.clock.now_ms();
            if self.entries.renewable(id, now) {
                self.entries.renew(id, now);
            }
        }

        Ok(self.entries.chain.get(id).map(|entry| &entry.doc))
    }

    fn find(&self, index: &str, key: &str) -> Result<Option<EntryId>> {
        let by_value = self
            .lookup
            .get(index)
            .ok_or_else(|| CacheError::UnknownIndex(index.to_string()))?;
        Ok(by_value.get(key).copied())
    }

    /// Adds the entry under every index its document has a value for.
    fn register(&mut self, id: EntryId) {
        let Some(entry) = self.entries.chain.get(id) else {
            return;
        };
        for name in &self.indices {
            if let Some(value) = entry.doc.field(name) {
                if let Some(by_value) = self.lookup.get_mut(name) {
                    by_value.insert(value, id);
                }
            }
        }
    }

    /// Clears a removed entry from every index.
    fn unregister(&mut self, id: EntryId, doc: &D) {
        for name in &self.indices {
            let (Some(value), Some(by_value)) = (doc.field(name), self.lookup.get_mut(name)) else {
                continue;
            };
            if by_value.get(&value) == Some(&id) {
                by_value.remove(&value);
            }
        }
    }

    /// Removes an entry from the chain and every index.
    fn unlink(&mut self, id: EntryId, now: u64) -> Option<D> {
        let entry = self.entries.unlink(id, now)?;
        self.unregister(id, &entry.doc);
        Some(entry.doc)
    }
}

impl<D, C> Expiring for DocumentCache<D, C>
where
    D: Document,
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
        if let Some((id, entry)) = self.entries.take_oldest() {
            self.unregister(id, &entry.doc);
            let remaining = self.entries.chain.len();
            self.stats.record_expiration();
            self.stats.set_total_entries(remaining);
            debug!("Reaped expired document ({} remain)", remaining);
        }
    }
}

impl<D, C> fmt::Debug for DocumentCache<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCache")
            .field("indices", &self.indices)
            .field("len", &self.entries.chain.len())
            .field("settings", &self.entries.settings)
            .field("scheduler", &self.entries.scheduler)
            .finish_non_exhaustive()
    }
}
