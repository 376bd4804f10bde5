//! cachew - self-expiring chain caches and a sorted numeric range index
//!
//! Provides TTL caches that reap their oldest entry on a single deadline,
//! a document cache looked up through several index fields, and a sorted
//! `f64`-keyed index for nearest-neighbour and range queries. A small axum
//! server exposes one cache and one index over JSON.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{
    CacheBuilder, CacheStats, Document, DocumentCache, EvictionCause, Expiring, ExpiryScheduler,
    TtlCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use index::RangeIndex;
pub use tasks::spawn_expiry_task;
