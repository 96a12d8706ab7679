//! In-memory LRU analysis cache with TTL.
//! Key: blake3 hash of (lowercase(trim(text)) | sorted hints joined by ",").
//! Capacity: 500, TTL: 15 minutes by default.
//! Expiry is lazy on lookup; once occupancy passes 80% an insert also sweeps
//! every expired entry. Full cache → least recently touched entry goes first.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::AnalysisResult;

const TOP_ENTRIES: usize = 5;
const TOP_ENTRY_TEXT_CHARS: usize = 50;

/// Time source for entry ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

struct CacheEntry {
    value: AnalysisResult,
    text: String,
    languages: String,
    touched_at: Instant,
    access_count: u64,
}

/// Snapshot returned by [`AnalysisCache::stats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_minutes: u64,
    pub hit_rate: f64,
    pub top_entries: Vec<TopEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub text: String,
    pub languages: String,
    pub access_count: u64,
}

pub struct AnalysisCache {
    inner: Mutex<LruCache<[u8; 32], CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AnalysisCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    fn normalize<S: AsRef<str>>(text: &str, languages: &[S]) -> (String, String) {
        let mut langs: Vec<&str> = languages.iter().map(|l| l.as_ref()).collect();
        langs.sort_unstable();
        (text.trim().to_lowercase(), langs.join(","))
    }

    /// Compute the cache key from normalized text and hint list.
    pub fn compute_key<S: AsRef<str>>(text: &str, languages: &[S]) -> [u8; 32] {
        let (text, langs) = Self::normalize(text, languages);
        Self::hash(&text, &langs)
    }

    fn hash(text: &str, langs: &str) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(text.as_bytes());
        hasher.update(b"|");
        hasher.update(langs.as_bytes());
        *hasher.finalize().as_bytes()
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched_at) > self.ttl
    }

    /// Look up a cached analysis. Returns None if absent or expired; a hit
    /// refreshes recency and bumps the access count.
    pub fn get<S: AsRef<str>>(&self, text: &str, languages: &[S]) -> Option<AnalysisResult> {
        let key = Self::compute_key(text, languages);
        let now = self.clock.now();
        let mut cache = self.inner.lock();

        let expired = self.is_expired(cache.peek(&key)?, now);
        if expired {
            // Expired, drop it.
            cache.pop(&key);
            debug!("cache entry expired on lookup");
            return None;
        }

        let entry = cache.get_mut(&key)?;
        entry.touched_at = now;
        entry.access_count += 1;
        Some(entry.value.clone())
    }

    /// Insert or overwrite an analysis result.
    pub fn set<S: AsRef<str>>(&self, text: &str, languages: &[S], value: AnalysisResult) {
        let (norm_text, norm_langs) = Self::normalize(text, languages);
        let key = Self::hash(&norm_text, &norm_langs);
        let now = self.clock.now();
        let mut cache = self.inner.lock();
        let capacity = cache.cap().get();

        if cache.len() * 5 > capacity * 4 {
            self.purge_expired(&mut cache, now);
        }

        if !cache.contains(&key) && cache.len() >= capacity {
            if let Some((_, evicted)) = cache.pop_lru() {
                debug!(
                    text = %truncate(&evicted.text, TOP_ENTRY_TEXT_CHARS),
                    access_count = evicted.access_count,
                    "cache evicted least recently used entry"
                );
            }
        }

        cache.put(
            key,
            CacheEntry {
                value,
                text: norm_text,
                languages: norm_langs,
                touched_at: now,
                access_count: 1,
            },
        );
    }

    fn purge_expired(&self, cache: &mut LruCache<[u8; 32], CacheEntry>, now: Instant) {
        let stale: Vec<[u8; 32]> = cache
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(key, _)| *key)
            .collect();
        for key in &stale {
            cache.pop(key);
        }
        if !stale.is_empty() {
            debug!(removed = stale.len(), "cache expiry sweep");
        }
    }

    /// True if an entry is stored for the pair. Does not touch recency.
    pub fn contains<S: AsRef<str>>(&self, text: &str, languages: &[S]) -> bool {
        self.inner
            .lock()
            .contains(&Self::compute_key(text, languages))
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
        debug!("analysis cache cleared");
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.inner.lock();
        let size = cache.len();
        let total_accesses: u64 = cache.iter().map(|(_, e)| e.access_count).sum();
        let hit_rate = if size == 0 {
            0.0
        } else {
            total_accesses as f64 / size as f64
        };

        let mut top: Vec<TopEntry> = cache
            .iter()
            .map(|(_, e)| TopEntry {
                text: truncate(&e.text, TOP_ENTRY_TEXT_CHARS),
                languages: e.languages.clone(),
                access_count: e.access_count,
            })
            .collect();
        top.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.text.cmp(&b.text))
        });
        top.truncate(TOP_ENTRIES);

        CacheStats {
            size,
            max_size: cache.cap().get(),
            ttl_minutes: self.ttl.as_secs() / 60,
            hit_rate,
            top_entries: top,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
