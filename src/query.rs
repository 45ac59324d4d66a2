//! Client-side query cache with in-flight de-duplication.
//!
//! [`QueryClient`] keeps the last resolved value per [`QueryKey`] and
//! collapses concurrent identical fetches into one shared future, so N
//! callers racing on the same key produce exactly one network call and all
//! observe the same result. A failed fetch records the error but never
//! clobbers previously cached data.

use crate::error::ApiError;
use crate::keys::QueryKey;
use crate::models::Paginated;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Fetch state of one cache entry, as the UI layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Last fetch failed (previous data, if any, is retained).
    Error,
    /// Last fetch succeeded.
    Success,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Option<Value>,
    error: Option<ApiError>,
    fetched_at: Instant,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Process-wide query cache. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct QueryClient {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<QueryKey, SharedFetch>>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `key`, fetching through `fetcher` unless a cached value
    /// younger than `stale_after` exists. Concurrent callers with the
    /// same key share one in-flight fetch.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_after: Duration,
        fetcher: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.fresh_value(&key, stale_after) {
            return from_value(value);
        }

        let shared = {
            let mut in_flight = self.lock_in_flight();
            if let Some(existing) = in_flight.get(&key) {
                existing.clone()
            } else {
                let entries = Arc::clone(&self.entries);
                let slots = Arc::clone(&self.in_flight);
                let fetch_key = key.clone();
                let future = fetcher();
                let shared: SharedFetch = async move {
                    let result = future.await.and_then(|t| to_value(&t));
                    record(&entries, &fetch_key, &result);
                    slots
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&fetch_key);
                    result
                }
                .boxed()
                .shared();
                in_flight.insert(key.clone(), shared.clone());
                shared
            }
        };

        // Locks are released before suspending here.
        let value = shared.await?;
        from_value(value)
    }

    /// Synchronous read of the last successful value for `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.lock_entries().get(key)?.value.clone()?;
        serde_json::from_value(value).ok()
    }

    /// Directly overwrites the entry for `key`, as a mutation's
    /// completion handler does (e.g. login priming the profile).
    pub fn set<T: Serialize>(&self, key: QueryKey, value: &T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.lock_entries().insert(
                key,
                CacheEntry {
                    value: Some(value),
                    error: None,
                    fetched_at: Instant::now(),
                },
            );
        }
    }

    /// Drops the entry for `key`; the next fetch goes to the network.
    pub fn invalidate(&self, key: &QueryKey) {
        self.lock_entries().remove(key);
    }

    /// Drops every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        self.lock_entries().retain(|key, _| !key.starts_with(prefix));
    }

    /// Drops everything. Used by logout, where all user-scoped data
    /// becomes stale at once.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Current fetch state for `key`.
    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        if self.lock_in_flight().contains_key(key) {
            return QueryStatus::Loading;
        }
        match self.lock_entries().get(key) {
            Some(entry) if entry.error.is_some() => QueryStatus::Error,
            Some(_) => QueryStatus::Success,
            None => QueryStatus::Idle,
        }
    }

    fn fresh_value(&self, key: &QueryKey, stale_after: Duration) -> Option<Value> {
        let entries = self.lock_entries();
        let entry = entries.get(key)?;
        if entry.error.is_none() && entry.fetched_at.elapsed() < stale_after {
            entry.value.clone()
        } else {
            None
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<QueryKey, SharedFetch>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn record(
    entries: &Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
    key: &QueryKey,
    result: &Result<Value, ApiError>,
) {
    let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());
    match result {
        Ok(value) => {
            entries.insert(
                key.clone(),
                CacheEntry {
                    value: Some(value.clone()),
                    error: None,
                    fetched_at: Instant::now(),
                },
            );
        }
        Err(error) => {
            // Keep any previously cached data; only the status changes.
            let entry = entries.entry(key.clone()).or_insert(CacheEntry {
                value: None,
                error: None,
                fetched_at: Instant::now(),
            });
            entry.error = Some(error.clone());
            entry.fetched_at = Instant::now();
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::bad_response(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::bad_response(e.to_string()))
}

/// Accumulator for infinite (offset-paginated) queries.
///
/// Pages are appended in order; the next request offset follows the
/// `offset + limit` advance rule and stops once the total is reached.
#[derive(Debug, Clone)]
pub struct InfinitePages<T> {
    pages: Vec<Paginated<T>>,
}

impl<T> Default for InfinitePages<T> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<T> InfinitePages<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fetched page.
    pub fn push(&mut self, page: Paginated<T>) {
        self.pages.push(page);
    }

    /// Offset to request next: 0 before the first page, then
    /// `offset + limit` of the last page, or `None` once exhausted.
    pub fn next_offset(&self) -> Option<u64> {
        match self.pages.last() {
            None => Some(0),
            Some(page) => page.next_offset(),
        }
    }

    /// True when no further pages remain.
    pub fn is_exhausted(&self) -> bool {
        self.next_offset().is_none()
    }

    /// Total item count reported by the most recent page.
    pub fn total(&self) -> u64 {
        self.pages.last().map_or(0, |page| page.total)
    }

    /// All items fetched so far, in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.data.iter())
    }
}
