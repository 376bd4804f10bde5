//! API Handlers
//!
//! HTTP request handlers for the cache and range index endpoints.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::index::RangeIndex;
use crate::models::{
    BestQuery, DeleteResponse, GetResponse, HealthResponse, IndexEntryResponse, IndexSetRequest,
    IndexValuesResponse, NearestQuery, RangeQuery, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache sits behind a single mutex since reads mutate it (stats and
/// renewal); the index only mutates on writes, so it takes a RwLock.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe TTL cache, also driven by the expiry task
    pub cache: Arc<Mutex<TtlCache<String, String>>>,
    /// Thread-safe range index
    pub index: Arc<RwLock<RangeIndex<String>>>,
}

impl AppState {
    /// Creates a new AppState from a cache and an index.
    pub fn new(cache: TtlCache<String, String>, index: RangeIndex<String>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            index: Arc::new(RwLock::new(index)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cache_builder().build(),
            RangeIndex::with_max_entries(config.index_max_entries),
        )
    }
}

// == Cache Handlers ==

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache, renewing the key if present.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.lock().await;
    cache.set(req.key.clone(), req.value);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Reads record stats and may renew, so take the lock exclusively
    let mut cache = state.cache.lock().await;
    let value = cache
        .get(key.as_str())
        .cloned()
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.lock().await;
    cache
        .remove(key.as_str())
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.lock().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Index Handlers ==

/// Handler for PUT /index
///
/// Stores a value at a numeric key. Fails with 503 when the index is full.
pub async fn index_set_handler(
    State(state): State<AppState>,
    Json(req): Json<IndexSetRequest>,
) -> Result<Json<IndexEntryResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut index = state.index.write().await;
    index.set(req.key, req.value.clone())?;

    Ok(Json(IndexEntryResponse::new(req.key, req.value)))
}

/// Handler for GET /index/get/:key
pub async fn index_get_handler(
    State(state): State<AppState>,
    Path(key): Path<f64>,
) -> Result<Json<IndexEntryResponse>> {
    let index = state.index.read().await;
    let value = index
        .get(key)
        .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

    Ok(Json(IndexEntryResponse::new(key, value.as_str())))
}

/// Handler for DELETE /index/del/:key
///
/// Returns the removed entry.
pub async fn index_delete_handler(
    State(state): State<AppState>,
    Path(key): Path<f64>,
) -> Result<Json<IndexEntryResponse>> {
    let mut index = state.index.write().await;
    let value = index
        .remove(key)
        .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

    Ok(Json(IndexEntryResponse::new(key, value)))
}

/// Handler for GET /index/nearest?key=..&count=..
pub async fn index_nearest_handler(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(index.nearest(query.key, query.count)))
}

/// Handler for GET /index/above?key=..&count=..
pub async fn index_above_handler(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(
        index.nearest_above(query.key, query.count),
    ))
}

/// Handler for GET /index/below?key=..&count=..
pub async fn index_below_handler(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(
        index.nearest_below(query.key, query.count),
    ))
}

/// Handler for GET /index/range?min=..&max=..
pub async fn index_range_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(index.range(query.min, query.max)))
}

/// Handler for GET /index/best?key=..
///
/// At most one value; none when the index is empty.
pub async fn index_best_handler(
    State(state): State<AppState>,
    Query(query): Query<BestQuery>,
) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(index.best(query.key)))
}

/// Handler for GET /index/lowest
pub async fn index_lowest_handler(State(state): State<AppState>) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(index.lowest()))
}

/// Handler for GET /index/highest
pub async fn index_highest_handler(State(state): State<AppState>) -> Json<IndexValuesResponse> {
    let index = state.index.read().await;
    Json(IndexValuesResponse::new(index.highest()))
}
