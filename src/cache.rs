//! Response cache stores used by [`crate::plugin::Cache`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::future::{self, BoxFuture};
use thiserror::Error;

use simplehttp_interface::{HttpVersion, Response, ResponseBody, TransferInfo};

/// A fully buffered response as kept in a cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase.
    pub reason: Option<String>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Protocol version.
    pub version: HttpVersion,
    /// The complete body.
    pub body: Bytes,
}

impl CachedResponse {
    /// Creates an entry with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: None,
            headers: vec![],
            version: HttpVersion::default(),
            body: body.into(),
        }
    }

    /// Turns the entry back into a response carrying `info`.
    pub fn into_response(self, info: TransferInfo) -> Response {
        Response {
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            version: self.version,
            body: ResponseBody::from_bytes(self.body),
            info,
        }
    }
}

/// An error raised by a cache backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key is not acceptable to the backend.
    #[error("Invalid cache key \"{0}\"")]
    InvalidKey(String),
    /// The backend could not be reached or failed internally.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// A key-value store for responses.
///
/// Stores are shared between concurrent requests, so implementations must tolerate parallel
/// `get` and `set` calls. Overwrites need not be transactional.
pub trait CacheStore: Send + Sync + 'static {
    /// Looks up a live entry.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<CachedResponse>, CacheError>>;

    /// Stores an entry. `None` keeps it until evicted.
    fn set<'a>(
        &'a self,
        key: &'a str,
        response: CachedResponse,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, Result<(), CacheError>>;
}

/// An in-process cache with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (CachedResponse, Option<Instant>)>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (CachedResponse, Option<Instant>)>> {
        // A poisoned map only ever holds complete entries.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<CachedResponse>, CacheError>> {
        let mut entries = self.lock();
        let hit = match entries.get(key) {
            Some((_, Some(deadline))) if *deadline <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((response, _)) => Some(response.clone()),
            None => None,
        };
        Box::pin(future::ready(Ok(hit)))
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        response: CachedResponse,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.lock().insert(key.to_string(), (response, deadline));
        Box::pin(future::ready(Ok(())))
    }
}
