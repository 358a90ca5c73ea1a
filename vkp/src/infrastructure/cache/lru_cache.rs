// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process recency-ordered response cache (§4.9). Used when `redis_url`
//! is not configured. A single `parking_lot::Mutex` covers both the `lru`
//! map and its recency list, matching the spec's "single reentrant mutex"
//! shared-resource policy (§5) — `parking_lot`'s mutex is not reentrant, but
//! none of this adapter's own methods call each other while holding the
//! lock, so the distinction is moot here.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

use vkp_domain::repositories::{CacheStats, ResponseCache};
use vkp_domain::PipelineError;

struct Entry {
    value: String,
    expires_at: Instant,
}

pub struct LruResponseCache {
    entries: Mutex<LruCache<String, Entry>>,
    hits: Mutex<u64>,
    misses: Mutex<u64>,
}

impl LruResponseCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is non-zero after max(1)");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: Mutex::new(0),
            misses: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ResponseCache for LruResponseCache {
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError> {
        let mut entries = self.entries.lock();
        let hit = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        };
        drop(entries);

        if hit.is_some() {
            *self.hits.lock() += 1;
        } else {
            *self.misses.lock() += 1;
        }
        Ok(hit)
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), PipelineError> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries.lock().put(key.to_string(), Entry { value: value.to_string(), expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PipelineError> {
        self.entries.lock().pop(key);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, PipelineError> {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        let mut entries = self.entries.lock();
        let matching: Vec<String> =
            entries.iter().filter(|(k, _)| k.starts_with(prefix)).map(|(k, _)| k.clone()).collect();
        for key in &matching {
            entries.pop(key);
        }
        Ok(matching.len() as u64)
    }

    async fn stats(&self) -> Result<CacheStats, PipelineError> {
        Ok(CacheStats {
            hits: *self.hits.lock(),
            misses: *self.misses.lock(),
            size: self.entries.lock().len(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "in-memory-lru"
    }
}
