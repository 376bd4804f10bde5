//! Request DTOs for the cachew API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

// == Limits ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Request body for the cache SET operation (PUT /set)
///
/// Entries expire after the cache-wide TTL; there is no per-entry TTL.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        validate_value(&self.value)
    }
}

/// Request body for the index SET operation (PUT /index)
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSetRequest {
    /// Numeric position in the index
    pub key: f64,
    /// The value to store
    pub value: String,
}

impl IndexSetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_value(&self.value)
    }
}

fn validate_value(value: &str) -> Option<String> {
    if value.len() > MAX_VALUE_SIZE {
        return Some(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        ));
    }
    None
}

/// Query for the nearest, above and below lookups (`?key=..&count=..`)
#[derive(Debug, Clone, Deserialize)]
pub struct NearestQuery {
    pub key: f64,
    /// How many values to return
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

/// Query for the range lookup (`?min=..&max=..`)
#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub min: f64,
    pub max: f64,
}

/// Query for the best-match lookup (`?key=..`)
#[derive(Debug, Clone, Deserialize)]
pub struct BestQuery {
    pub key: f64,
}
