//! Caching Content Resolver
//!
//! LRU cache of successful resolutions in front of any `ContentResolver`.
//! Failures are never cached, so a transient miss is retried on the next
//! page fetch or refresh.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{ContentId, MetadataRecord, ResolveError};
use crate::ports::outbound::ContentResolver;

/// Default number of cached records.
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Resolver wrapper with an LRU cache.
pub struct CachingResolver<R: ContentResolver> {
    inner: R,
    cache: Mutex<LruCache<ContentId, MetadataRecord>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R: ContentResolver> CachingResolver<R> {
    /// Wrap `inner` with a cache of `capacity` records (at least 1).
    pub fn new(inner: R, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups forwarded to the wrapped resolver.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R: ContentResolver> ContentResolver for CachingResolver<R> {
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError> {
        let cached = self.cache.lock().get(content_id).cloned();
        if let Some(record) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(record);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let record = self.inner.resolve(content_id).await?;
        self.cache.lock().put(content_id.clone(), record.clone());
        Ok(record)
    }
}
