//! Time-bounded memoization of summary results.
//!
//! Results are keyed by the SHA-256 of the input text plus the length
//! parameters used. An entry is served only while it is younger than the
//! configured TTL; stale entries are dropped on lookup. When full, the
//! least recently used entry is evicted.

use condense_core::LengthParams;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::summarize::SummaryReport;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text_hash: String,
    params: LengthParams,
}

impl CacheKey {
    pub fn new(text: &str, params: LengthParams) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self {
            text_hash: format!("{:x}", hasher.finalize()),
            params,
        }
    }
}

struct Entry {
    report: SummaryReport,
    stored_at: Instant,
}

pub struct SummaryCache {
    ttl: Duration,
    entries: Mutex<LruCache<CacheKey, Entry>>,
}

impl SummaryCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache described by `[cache]`, or `None` when disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(Duration::from_secs(config.ttl_secs), config.max_entries))
    }

    /// A copy of the stored report if it is still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<SummaryReport> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<SummaryReport> {
        let mut entries = self.lock();
        let fresh = entries
            .peek(key)
            .map(|e| now.saturating_duration_since(e.stored_at) < self.ttl)?;
        if fresh {
            entries.get(key).map(|e| e.report.clone())
        } else {
            entries.pop(key);
            None
        }
    }

    pub fn insert(&self, key: CacheKey, report: SummaryReport) {
        self.insert_at(key, report, Instant::now());
    }

    fn insert_at(&self, key: CacheKey, report: SummaryReport, now: Instant) {
        self.lock().put(
            key,
            Entry {
                report,
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, Entry>> {
        // A poisoned map only means a panic mid-insert; the data is still usable.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}
