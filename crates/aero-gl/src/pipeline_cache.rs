use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::pipeline_hash::PipelineStateHash;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: u64,
}

/// LRU cache of compiled pipeline objects keyed by [`PipelineStateHash`].
///
/// Evicted pipelines are not dropped in place: they may still be referenced by command buffers
/// in flight, so they queue up for [`PipelineCache::take_evicted`] and the caller retires them
/// through its deferred deletion path.
pub struct PipelineCache<P> {
    cache: LruCache<PipelineStateHash, P>,
    evicted: Vec<P>,
    stats: PipelineCacheStats,
}

impl<P> PipelineCache<P> {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            evicted: Vec::new(),
            stats: PipelineCacheStats::default(),
        }
    }

    pub fn stats(&self) -> PipelineCacheStats {
        PipelineCacheStats {
            entries: self.cache.len() as u64,
            ..self.stats
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, hash: PipelineStateHash) -> bool {
        self.cache.contains(&hash)
    }

    /// Look up a pipeline, refreshing its recency.
    pub fn get(&mut self, hash: PipelineStateHash) -> Option<&P> {
        let found = self.cache.get(&hash);
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Return the cached pipeline for `hash`, building it with `create` on a miss. A failed
    /// build caches nothing.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        hash: PipelineStateHash,
        create: impl FnOnce() -> Result<P, E>,
    ) -> Result<&P, E> {
        if self.cache.contains(&hash) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let pipeline = create()?;
            self.insert(hash, pipeline);
        }
        Ok(self
            .cache
            .get(&hash)
            .unwrap_or_else(|| unreachable!("pipeline {hash:#018x} inserted above")))
    }

    /// Insert or replace the pipeline for `hash`. A replaced pipeline goes to the evicted list.
    pub fn insert(&mut self, hash: PipelineStateHash, pipeline: P) {
        if let Some((old_hash, old)) = self.cache.push(hash, pipeline) {
            if old_hash != hash {
                self.stats.evictions += 1;
                debug!(hash = old_hash, "evicted pipeline");
            }
            self.evicted.push(old);
        }
    }

    /// Pipelines pushed out of the cache since the last call.
    pub fn take_evicted(&mut self) -> Vec<P> {
        std::mem::take(&mut self.evicted)
    }

    /// Move every cached pipeline to the evicted list.
    pub fn clear(&mut self) {
        while let Some((_, pipeline)) = self.cache.pop_lru() {
            self.evicted.push(pipeline);
        }
    }
}

impl<P> Default for PipelineCache<P> {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(Self::DEFAULT_CAPACITY).expect("non-zero capacity"))
    }
}

impl<P> std::fmt::Debug for PipelineCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCache")
            .field("cap", &self.cache.cap())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
