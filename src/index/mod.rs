//! Index Module
//!
//! Sorted numeric index for exact, nearest-neighbour and range lookups.

mod range;


pub use range::RangeIndex;
