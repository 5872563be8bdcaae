//! In-memory OGP cache with a freshness window.
//!
//! Fetched metadata is kept for [`DEFAULT_TTL_HOURS`] and evicted
//! oldest-first once the cache reaches capacity. Lookups key on the
//! normalized URL so equivalent spellings share one entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use url::Url;

use super::fetch::{FetchError, PageFetcher};
use super::parse::{parse_document, OgpRecord};

pub const DEFAULT_TTL_HOURS: i64 = 24;
pub const DEFAULT_CAPACITY: usize = 256;

/// Canonical cache key for a URL.
///
/// Parsing and re-serializing lowercases the scheme and host and adds the
/// root path, so `HTTPS://Example.COM` and `https://example.com/` land on
/// the same entry. Unparseable input falls back to the trimmed raw string.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Thread-safe OGP metadata cache.
pub struct OgpCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<String, OgpRecord>>,
}

impl Default for OgpCache {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS), DEFAULT_CAPACITY)
    }
}

impl OgpCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve metadata for `url`, fetching only when the cached entry is
    /// missing or older than the TTL. A fetch failure is returned as-is;
    /// any previous snapshot stays in the cache for fallback rendering.
    pub fn resolve(
        &self,
        url: &str,
        fetcher: &dyn PageFetcher,
    ) -> Result<OgpRecord, FetchError> {
        self.resolve_at(url, fetcher, Utc::now())
    }

    fn resolve_at(
        &self,
        url: &str,
        fetcher: &dyn PageFetcher,
        now: DateTime<Utc>,
    ) -> Result<OgpRecord, FetchError> {
        let key = normalize_url(url);
        if let Some(record) = self.lock().get(&key) {
            if !record.is_stale(self.ttl, now) {
                log::debug!("ogp cache hit for {key}");
                return Ok(record.clone());
            }
        }

        let page = fetcher.fetch(url)?;
        let record = parse_document(&page.body, &page.url);
        self.store(key, record.clone());
        Ok(record)
    }

    /// Last known snapshot for `url`, fresh or stale. Used as a fallback
    /// when a refresh fails.
    pub fn cached(&self, url: &str) -> Option<OgpRecord> {
        self.lock().get(&normalize_url(url)).cloned()
    }

    /// Store a record keyed by its own URL.
    pub fn insert(&self, record: OgpRecord) {
        self.store(normalize_url(&record.url), record);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn store(&self, key: String, record: OgpRecord) {
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, r)| r.fetched_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                log::debug!("ogp cache full, evicting {oldest}");
                entries.remove(&oldest);
            }
        }
        entries.insert(key, record);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, OgpRecord>> {
        // A poisoned map is still a valid map; a panicked reader cannot
        // have left an entry half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
