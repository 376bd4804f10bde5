//! Cache Module
//!
//! Self-expiring caches built on an ordered entry chain.
//!
//! - [`TtlCache`]: keyed values with a cache-wide TTL and optional capacity
//! - [`DocumentCache`]: whole documents reachable through named index fields
//!
//! Both reap their oldest entry through a single [`ExpiryScheduler`]
//! deadline, fired by [`Expiring::tick`].

mod builder;
mod chain;
mod document;
mod entry;
mod freshness;
mod scheduler;
mod stats;
mod ttl;


// Re-export public types
pub use builder::{CacheBuilder, Settings};
pub use chain::{EntryChain, EntryId};
pub use document::{Document, DocumentCache};
pub use entry::{Entry, Stamp};
pub use scheduler::{Expiring, ExpiryScheduler};
pub use stats::CacheStats;
pub use ttl::{EvictionCause, EvictionListener, TtlCache};
