// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory classification cache keyed by prompt fingerprint.
//!
//! Bounded to 1000 entries with a one-hour TTL. Expired entries are
//! evicted lazily on read; when the cache is full on insert, the entry
//! with the oldest insertion time is dropped. All mutation happens under
//! one mutex held only for map operations.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clawrouter_core::Tier;

/// Maximum number of cached classifications.
pub const CACHE_CAPACITY: usize = 1000;

/// How long a cached classification stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// How many characters of the normalized user text feed the fingerprint.
const FINGERPRINT_CHARS: usize = 500;

/// Stable fingerprint of a user message: lowercased, whitespace
/// normalized, truncated to the first 500 characters, then hashed.
pub fn fingerprint(user_text: &str) -> String {
    let normalized = user_text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let head: String = normalized.chars().take(FINGERPRINT_CHARS).collect();

    let mut hasher = DefaultHasher::new();
    head.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Storage interface for cached classifications, so unit tests can stub
/// the cache out from under the LLM classifier.
pub trait ClassificationStore: Send + Sync {
    /// Look up a still-valid classification.
    fn lookup(&self, fingerprint: &str) -> Option<Tier>;

    /// Record a classification.
    fn insert(&self, fingerprint: &str, tier: Tier);

    /// Drop everything.
    fn invalidate(&self);

    /// Number of stored entries (stale entries count until evicted).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct StoredEntry {
    tier: Tier,
    inserted_at: Instant,
}

struct CacheInner {
    map: HashMap<String, StoredEntry>,
    /// Insertion order for oldest-first eviction.
    order: VecDeque<String>,
}

/// The production cache: bounded, TTL-checked, mutex-protected.
pub struct TtlCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
            ttl,
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY, CACHE_TTL)
    }
}

impl ClassificationStore for TtlCache {
    fn lookup(&self, fingerprint: &str) -> Option<Tier> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        match inner.map.get(fingerprint) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => Some(entry.tier),
            Some(_) => {
                inner.map.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    fn insert(&self, fingerprint: &str, tier: Tier) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        if let Some(existing) = inner.map.get_mut(fingerprint) {
            existing.tier = tier;
            return;
        }

        while inner.map.len() >= self.capacity {
            // Skip order entries whose key was already removed by lazy
            // TTL eviction.
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }

        inner.map.insert(
            fingerprint.to_string(),
            StoredEntry {
                tier,
                inserted_at: Instant::now(),
            },
        );
        inner.order.push_back(fingerprint.to_string());
    }

    fn invalidate(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.map.clear();
        inner.order.clear();
    }

    fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").map.len()
    }
}
