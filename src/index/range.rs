//! Range Index Module
//!
//! Maps `f64` keys to values, kept in ascending key order in two parallel
//! vectors. Lookups are binary searches; inserts and removals shift the tail.

use tracing::debug;

use crate::error::{CacheError, Result};

// == Range Index ==
/// A sorted numeric index.
///
/// Keys are unique and strictly ascending. NaN is never stored, and `-0.0`
/// is folded into `0.0`.
#[derive(Debug, Clone)]
pub struct RangeIndex<V> {
    keys: Vec<f64>,
    values: Vec<V>,
    max_entries: Option<usize>,
}

impl<V> Default for RangeIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RangeIndex<V> {
    // == Constructors ==
    /// Creates an unbounded index.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            max_entries: None,
        }
    }

    /// Creates an index that rejects new keys past `max_entries`.
    /// Zero leaves it unbounded.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: (max_entries > 0).then_some(max_entries),
            ..Self::new()
        }
    }

    // == Seek ==
    /// Finds where `key` lives.
    ///
    /// Returns its position and value when present, otherwise the position
    /// it would be inserted at. A NaN key reports position 0 and no value.
    pub fn seek(&self, key: f64) -> (usize, Option<&V>) {
        if key.is_nan() {
            return (0, None);
        }
        let key = normalize(key);
        let position = self.keys.partition_point(|k| *k < key);
        let value = match self.keys.get(position) {
            Some(k) if *k == key => self.values.get(position),
            _ => None,
        };
        (position, value)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any value already there.
    ///
    /// Fails with [`CacheError::InvalidKey`] for NaN, and with
    /// [`CacheError::IndexFull`] when a new key would exceed the entry limit.
    /// The index is unchanged on failure.
    pub fn set(&mut self, key: f64, value: V) -> Result<&mut Self> {
        if key.is_nan() {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        let key = normalize(key);
        let (position, existing) = self.seek(key);

        if existing.is_some() {
            self.values[position] = value;
            return Ok(self);
        }

        if let Some(capacity) = self.max_entries {
            if self.keys.len() >= capacity {
                debug!("Rejected key {} from full index", key);
                return Err(CacheError::IndexFull { capacity });
            }
        }

        self.keys.insert(position, key);
        self.values.insert(position, value);
        Ok(self)
    }

    // == Get ==
    /// Exact lookup.
    pub fn get(&self, key: f64) -> Option<&V> {
        self.seek(key).1
    }

    // == Remove ==
    /// Removes `key` and returns its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: f64) -> Option<V> {
        let (position, existing) = self.seek(key);
        existing?;
        self.keys.remove(position);
        Some(self.values.remove(position))
    }

    // == Nearest ==
    /// Up to `count` values ordered by distance from `key`.
    ///
    /// Equal distances resolve toward the higher key.
    pub fn nearest(&self, key: f64, count: usize) -> Vec<&V> {
        if key.is_nan() {
            return Vec::new();
        }
        let start = self.keys.partition_point(|k| *k < key);
        // Next candidate below is `below - 1`, next above is `above`
        let mut below = start;
        let mut above = start;
        let mut found = Vec::with_capacity(count.min(self.len()));

        // Exact match first: for an infinite key the distance to itself is NaN
        if count > 0 && self.keys.get(start) == Some(&key) {
            found.push(&self.values[start]);
            above += 1;
        }

        while found.len() < count {
            let take_above = match (below.checked_sub(1), self.keys.get(above)) {
                (Some(lower), Some(upper)) => upper - key <= key - self.keys[lower],
                (None, Some(_)) => true,
                (Some(_), None) => false,
                (None, None) => break,
            };
            if take_above {
                found.push(&self.values[above]);
                above += 1;
            } else {
                below -= 1;
                found.push(&self.values[below]);
            }
        }

        found
    }

    /// The single value nearest to `key`.
    pub fn best(&self, key: f64) -> Option<&V> {
        self.nearest(key, 1).into_iter().next()
    }

    // == Nearest Above ==
    /// Up to `count` values with keys at or above `key`, ascending.
    pub fn nearest_above(&self, key: f64, count: usize) -> Vec<&V> {
        if key.is_nan() {
            return Vec::new();
        }
        let start = self.keys.partition_point(|k| *k < key);
        self.values[start..].iter().take(count).collect()
    }

    // == Nearest Below ==
    /// Up to `count` values with keys at or below `key`, descending.
    pub fn nearest_below(&self, key: f64, count: usize) -> Vec<&V> {
        if key.is_nan() {
            return Vec::new();
        }
        let end = self.keys.partition_point(|k| *k <= key);
        self.values[..end].iter().rev().take(count).collect()
    }

    // == Range ==
    /// Values with keys in `[min, max]`, ascending. Empty when `min > max`.
    pub fn range(&self, min: f64, max: f64) -> Vec<&V> {
        if min.is_nan() || max.is_nan() || min > max {
            return Vec::new();
        }
        let start = self.keys.partition_point(|k| *k < min);
        let end = self.keys.partition_point(|k| *k <= max);
        self.values[start..end].iter().collect()
    }

    /// The value with the smallest key.
    pub fn lowest(&self) -> Option<&V> {
        self.values.first()
    }

    /// The value with the largest key.
    pub fn highest(&self) -> Option<&V> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether a new key would be rejected.
    pub fn is_full(&self) -> bool {
        self.max_entries.is_some_and(|max| self.keys.len() >= max)
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Key and value pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &V)> {
        self.keys.iter().copied().zip(self.values.iter())
    }
}

/// Folds `-0.0` into `0.0`.
fn normalize(key: f64) -> f64 {
    key + 0.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn phonetic() -> RangeIndex<&'static str> {
        let mut index = RangeIndex::new();
        for (key, value) in [
            (0.0, "zebra"),
            (10.0, "able"),
            (20.0, "baker"),
            (30.0, "charlie"),
            (40.0, "dog"),
            (50.0, "easy"),
            (60.0, "fox"),
            (70.0, "george"),
        ] {
            index.set(key, value).unwrap();
        }
        index
    }

    #[test]
    fn test_set_get_overwrite_remove() {
        let mut index = RangeIndex::new();
        let names = ["able", "baker", "charlie", "dog", "easy", "fox", "george"];
        for (i, name) in names.iter().enumerate() {
            index.set((i + 1) as f64, name.to_string()).unwrap();
        }
        for (i, name) in names.iter().enumerate() {
            assert_eq!(index.get((i + 1) as f64), Some(&name.to_string()));
        }

        for (i, name) in names.iter().enumerate() {
            index.set((i + 1) as f64, name.to_uppercase()).unwrap();
        }
        assert_eq!(index.get(1.0).map(String::as_str), Some("ABLE"));
        assert_eq!(index.len(), 7);

        assert_eq!(index.remove(3.0), Some("CHARLIE".to_string()));
        index.remove(5.0);
        index.remove(6.0);
        assert_eq!(index.get(3.0), None);
        assert_eq!(index.get(5.0), None);

        // Absent keys are a no-op
        assert_eq!(index.remove(9.0), None);
        assert_eq!(index.remove(5.5), None);
        assert_eq!(index.remove(-1.0), None);

        let remaining: Vec<_> = index.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(remaining, vec!["ABLE", "BAKER", "DOG", "GEORGE"]);
    }

    #[test]
    fn test_seek_reports_insertion_point() {
        let index = phonetic();
        assert_eq!(index.seek(20.0), (2, Some(&"baker")));
        assert_eq!(index.seek(25.0), (3, None));
        assert_eq!(index.seek(-5.0), (0, None));
        assert_eq!(index.seek(99.0), (8, None));
    }

    #[test]
    fn test_nearest_single() {
        let index = phonetic();
        assert_eq!(index.nearest(7.0, 1), vec![&"able"]);
        assert_eq!(index.nearest(67.0, 1), vec![&"george"]);
        assert_eq!(index.nearest(33.0, 1), vec![&"charlie"]);
        assert_eq!(index.nearest(0.0, 1), vec![&"zebra"]);
    }

    #[test]
    fn test_nearest_group() {
        let index = phonetic();
        assert_eq!(
            index.nearest(17.0, 4),
            vec![&"baker", &"able", &"charlie", &"zebra"]
        );
        assert_eq!(index.nearest(50.0, 4), vec![&"easy", &"fox", &"dog", &"george"]);
        assert_eq!(index.nearest(50.0, 3), vec![&"easy", &"fox", &"dog"]);
    }

    #[test]
    fn test_nearest_exhausts_index() {
        let index = phonetic();
        assert_eq!(index.nearest(-100.0, 20).len(), 8);
        assert!(index.nearest(10.0, 0).is_empty());
        assert!(RangeIndex::<u8>::new().nearest(1.0, 3).is_empty());
    }

    #[test]
    fn test_nearest_above() {
        let index = phonetic();
        assert_eq!(
            index.nearest_above(13.0, 4),
            vec![&"baker", &"charlie", &"dog", &"easy"]
        );
        assert_eq!(
            index.nearest_above(40.0, 4),
            vec![&"dog", &"easy", &"fox", &"george"]
        );
        assert!(index.nearest_above(71.0, 4).is_empty());
    }

    #[test]
    fn test_nearest_below() {
        let index = phonetic();
        assert_eq!(index.nearest_below(99.0, 3), vec![&"george", &"fox", &"easy"]);
        assert_eq!(index.nearest_below(41.0, 3), vec![&"dog", &"charlie", &"baker"]);
        assert_eq!(index.nearest_below(39.0, 3), vec![&"charlie", &"baker", &"able"]);
        assert!(index.nearest_below(-1.0, 3).is_empty());
    }

    #[test]
    fn test_best() {
        let index = phonetic();
        assert_eq!(index.best(17.0), Some(&"baker"));
        assert_eq!(index.best(20.0), Some(&"baker"));
        assert_eq!(index.best(11.0), Some(&"able"));
        // Ties go to the higher key
        assert_eq!(index.best(5.0), Some(&"able"));
        assert_eq!(index.best(4.0), Some(&"zebra"));
        assert_eq!(RangeIndex::<u8>::new().best(4.0), None);
    }

    #[test]
    fn test_range() {
        let index = phonetic();
        assert_eq!(index.range(40.0, 50.0), vec![&"dog", &"easy"]);
        assert_eq!(index.range(11.0, 21.0), vec![&"baker"]);
        assert_eq!(index.range(-10.0, 17.0), vec![&"zebra", &"able"]);
        assert!(index.range(50.0, 40.0).is_empty());
        assert!(index.range(71.0, 80.0).is_empty());
    }

    #[test]
    fn test_lowest_and_highest() {
        let mut index = phonetic();
        assert_eq!(index.lowest(), Some(&"zebra"));
        assert_eq!(index.highest(), Some(&"george"));

        index.set(-3.5, "xray").unwrap();
        assert_eq!(index.lowest(), Some(&"xray"));
        assert_eq!(RangeIndex::<u8>::new().highest(), None);
    }

    #[test]
    fn test_max_entries() {
        let mut index = RangeIndex::with_max_entries(2);
        index.set(1.0, "able").unwrap().set(2.0, "baker").unwrap();
        assert!(index.is_full());

        assert_eq!(
            index.set(3.0, "charlie").unwrap_err(),
            CacheError::IndexFull { capacity: 2 }
        );
        assert_eq!(index.get(3.0), None);
        assert_eq!(index.len(), 2);

        // Overwrites still succeed when full
        index.set(2.0, "BAKER").unwrap();
        assert_eq!(index.get(2.0), Some(&"BAKER"));
        assert_eq!(RangeIndex::<u8>::with_max_entries(0).max_entries(), None);
    }

    #[test]
    fn test_nan_keys() {
        let mut index = phonetic();
        assert!(matches!(
            index.set(f64::NAN, "nothing"),
            Err(CacheError::InvalidKey(_))
        ));
        assert_eq!(index.len(), 8);
        assert_eq!(index.get(f64::NAN), None);
        assert_eq!(index.remove(f64::NAN), None);
        assert!(index.nearest(f64::NAN, 3).is_empty());
        assert!(index.range(f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let mut index = RangeIndex::new();
        index.set(-0.0, "signed").unwrap();
        index.set(0.0, "unsigned").unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(-0.0), Some(&"unsigned"));
    }

    #[test]
    fn test_infinite_keys() {
        let mut index = RangeIndex::new();
        index.set(f64::NEG_INFINITY, "low").unwrap();
        index.set(0.0, "zero").unwrap();
        index.set(f64::INFINITY, "high").unwrap();

        assert_eq!(index.nearest(f64::INFINITY, 1), vec![&"high"]);
        assert_eq!(index.nearest(f64::INFINITY, 2), vec![&"high", &"zero"]);
        assert_eq!(index.best(f64::INFINITY), Some(&"high"));
        assert_eq!(index.best(f64::NEG_INFINITY), Some(&"low"));
        assert_eq!(index.nearest(f64::NEG_INFINITY, 3), vec![&"low", &"zero", &"high"]);
        assert!(index.nearest(f64::INFINITY, 0).is_empty());

        // Finite queries never prefer an infinite neighbour
        assert_eq!(index.best(1e300), Some(&"zero"));
        assert_eq!(index.range(f64::NEG_INFINITY, 0.0), vec![&"low", &"zero"]);
        assert_eq!(index.lowest(), Some(&"low"));
        assert_eq!(index.highest(), Some(&"high"));
    }
}
