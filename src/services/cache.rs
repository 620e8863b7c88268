use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::GigFilters;

/// Default time-to-live for cached query results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    json: String,
    stored_at: Instant,
}

/// TTL-keyed memoization over catalog query results.
///
/// Values are stored JSON-serialized so one cache can hold both plain
/// gig lists and scored results. Expired entries are evicted lazily on
/// the next read of their key; there is no background sweeper. A single
/// mutex guards the map, which is enough because every critical section
/// is a short, non-blocking map operation.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a cached value, evicting it first if the TTL has elapsed
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                tracing::trace!("cache hit: {}", key);
                serde_json::from_str(&entry.json).ok()
            }
            Some(_) => {
                tracing::trace!("cache expired: {}", key);
                entries.remove(key);
                None
            }
            None => {
                tracing::trace!("cache miss: {}", key);
                None
            }
        }
    }

    /// Store a value under a key, replacing any previous entry
    pub fn put<T>(&self, key: &str, value: &T)
    where
        T: Serialize,
    {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize cache value for {}: {}", key, e);
                return;
            }
        };

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                json,
                stored_at: Instant::now(),
            },
        );
        tracing::trace!("cache put: {}", key);
    }

    /// Drop all entries unconditionally (manual cache-busting, e.g.
    /// after a profile edit changes what scores are valid)
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let dropped = entries.len();
        entries.clear();
        tracing::debug!("cache cleared ({} entries dropped)", dropped);
    }

    /// Number of entries currently held, including not-yet-evicted
    /// expired ones
    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key builder.
///
/// Keys serialize the normalized filter set with a fixed field order so
/// the same logical query always produces the same key.
pub struct CacheKey;

impl CacheKey {
    /// Key for a plain gig listing
    pub fn gigs(filters: &GigFilters) -> String {
        format!("gigs:{}", Self::filter_fragment(filters))
    }

    /// Key for a scored listing for one user
    pub fn matching(user_id: &str, filters: &GigFilters) -> String {
        format!("matching:{}:{}", user_id, Self::filter_fragment(filters))
    }

    /// Key for a text search
    pub fn search(query: &str, filters: &GigFilters) -> String {
        format!(
            "search:{}:{}",
            query.to_lowercase(),
            Self::filter_fragment(filters)
        )
    }

    /// Key for a single gig lookup
    pub fn gig(id: &str) -> String {
        format!("gig:{}", id)
    }

    fn filter_fragment(filters: &GigFilters) -> String {
        let platform = filters.platform.map(|p| p.as_str()).unwrap_or("-");
        let skills = if filters.skills.is_empty() {
            "-".to_string()
        } else {
            let mut skills: Vec<String> =
                filters.skills.iter().map(|s| s.to_lowercase()).collect();
            skills.sort();
            skills.join(",")
        };
        let min_match = filters
            .min_match
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        let location = filters
            .location
            .as_deref()
            .map(|l| l.to_lowercase())
            .unwrap_or_else(|| "-".to_string());
        let sort_by = filters.sort_by.map(|s| s.as_str()).unwrap_or("-");

        format!("p={};s={};m={};l={};o={}", platform, skills, min_match, location, sort_by)
    }
}
