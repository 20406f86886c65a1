//! Adaptive surface cache.
//!
//! Every request bumps the usage record of its pixel size. Once a size has
//! been requested `min_requests_for_pooling` times it is pool-eligible:
//! returned surfaces of that size are cleared and parked in a bounded
//! [`SurfacePool`], and later requests are served from it. The number of
//! distinct sizes tracked is capped; reaching the cap evicts the least
//! recently requested quarter along with their pools.

use crate::surface_key::{SurfaceKey, UsageStats};
use crate::surface_pool::SurfacePool;
use crate::{DisposeManager, RasterSurface, SurfaceBackend, SurfaceError};
use lru::LruCache;
use rastra_core::collections::map::{self, HashMap};
use rastra_core::sync::lock;
use std::sync::{Arc, Mutex};
use web_time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceCacheConfig {
    /// Requests a size needs before its surfaces are pooled.
    pub min_requests_for_pooling: u64,
    /// Surfaces kept per size.
    pub max_pool_size: usize,
    /// Distinct sizes tracked before the oldest are evicted.
    pub max_tracked_sizes: usize,
}

impl Default for SurfaceCacheConfig {
    fn default() -> Self {
        Self {
            min_requests_for_pooling: 1,
            max_pool_size: 10,
            max_tracked_sizes: 100,
        }
    }
}

impl SurfaceCacheConfig {
    pub fn with_min_requests_for_pooling(mut self, requests: u64) -> Self {
        self.min_requests_for_pooling = requests;
        self
    }

    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn with_max_tracked_sizes(mut self, sizes: usize) -> Self {
        self.max_tracked_sizes = sizes.max(1);
        self
    }
}

type SharedPool<S> = Arc<SurfacePool<S>>;

pub struct SurfaceCacheManager<B: SurfaceBackend> {
    backend: B,
    disposer: Arc<dyn DisposeManager<B::Surface>>,
    config: SurfaceCacheConfig,
    /// Usage per size, least recently requested first.
    stats: Mutex<LruCache<SurfaceKey, UsageStats>>,
    pools: Mutex<HashMap<SurfaceKey, SharedPool<B::Surface>>>,
    /// Serializes eviction passes.
    eviction_lock: Mutex<()>,
}

impl<B: SurfaceBackend> SurfaceCacheManager<B> {
    pub fn new(backend: B, disposer: Arc<dyn DisposeManager<B::Surface>>) -> Self {
        Self::with_config(backend, disposer, SurfaceCacheConfig::default())
    }

    pub fn with_config(
        backend: B,
        disposer: Arc<dyn DisposeManager<B::Surface>>,
        config: SurfaceCacheConfig,
    ) -> Self {
        Self {
            backend,
            disposer,
            config,
            stats: Mutex::new(LruCache::unbounded()),
            pools: Mutex::new(map::new_map()),
            eviction_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> SurfaceCacheConfig {
        self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Hands out a surface of exactly `width` x `height` pixels, pooled when
    /// the size is eligible and a pooled surface is available.
    pub fn get_surface(&self, width: u32, height: u32) -> Result<B::Surface, SurfaceError> {
        let key = SurfaceKey::new(width, height);
        if key.is_empty() {
            return Err(SurfaceError::EmptySize { width, height });
        }

        self.maybe_evict();

        let request_count = self.record_request(key);
        if request_count >= self.config.min_requests_for_pooling {
            if let Some(surface) = self.pool(key).and_then(|pool| pool.try_take()) {
                log::debug!("reused pooled {width}x{height} surface");
                return Ok(surface);
            }
        }

        self.backend.create_surface(width, height)
    }

    /// Takes a surface back. It is cleared and pooled when its size will be
    /// eligible on the next request; otherwise it goes to the disposer.
    pub fn return_surface(&self, mut surface: B::Surface) {
        let key = SurfaceKey::new(surface.width(), surface.height());

        if !key.is_empty() && self.pools_on_return(key) {
            let pool = self.pool_or_insert(key);
            surface.clear();
            match pool.try_add(surface) {
                Ok(()) => {
                    // An eviction may have retired the pool between the
                    // lookup and the push; whoever sees the flag drains.
                    if pool.is_retired() {
                        self.drain_pool(&pool);
                    }
                    return;
                }
                Err(rejected) => surface = rejected,
            }
        }

        self.disposer.dispose_object(surface);
    }

    /// Tears down every pool, disposing the surfaces they hold, and forgets
    /// all usage statistics.
    pub fn dispose(&self) {
        let pools = {
            let _eviction = lock(&self.eviction_lock);
            let pools = std::mem::take(&mut *lock(&self.pools));
            lock(&self.stats).clear();
            pools
        };

        let mut disposed = 0;
        for pool in pools.values() {
            pool.retire();
            disposed += self.drain_pool(pool);
        }
        log::debug!(
            "surface cache disposed {} pools, {disposed} surfaces",
            pools.len()
        );
    }

    pub fn tracked_sizes(&self) -> usize {
        lock(&self.stats).len()
    }

    /// Usage record for `key`, without refreshing its recency.
    pub fn usage(&self, key: SurfaceKey) -> Option<UsageStats> {
        lock(&self.stats).peek(&key).copied()
    }

    pub fn pooled_count(&self, key: SurfaceKey) -> usize {
        self.pool(key).map_or(0, |pool| pool.current_size())
    }

    fn record_request(&self, key: SurfaceKey) -> u64 {
        let mut stats = lock(&self.stats);
        let now = Instant::now();
        match stats.get_mut(&key) {
            Some(usage) => {
                usage.touch(now);
                usage.request_count
            }
            None => {
                stats.put(key, UsageStats::first(now));
                1
            }
        }
    }

    fn pools_on_return(&self, key: SurfaceKey) -> bool {
        lock(&self.stats).peek(&key).is_some_and(|usage| {
            usage.request_count.saturating_add(1) >= self.config.min_requests_for_pooling
        })
    }

    fn pool(&self, key: SurfaceKey) -> Option<SharedPool<B::Surface>> {
        lock(&self.pools).get(&key).cloned()
    }

    fn pool_or_insert(&self, key: SurfaceKey) -> SharedPool<B::Surface> {
        let max_pool_size = self.config.max_pool_size;
        lock(&self.pools)
            .entry(key)
            .or_insert_with(|| Arc::new(SurfacePool::new(max_pool_size)))
            .clone()
    }

    fn drain_pool(&self, pool: &SurfacePool<B::Surface>) -> usize {
        pool.drain(|surface| self.disposer.dispose_object(surface))
    }

    fn maybe_evict(&self) {
        let limit = self.config.max_tracked_sizes;
        if lock(&self.stats).len() < limit {
            return;
        }

        let evicted: Vec<(SurfaceKey, SharedPool<B::Surface>)> = {
            let _eviction = lock(&self.eviction_lock);
            let mut stats = lock(&self.stats);
            if stats.len() < limit {
                return;
            }

            let remove_count = (stats.len() / 4).max(1);
            for _ in 0..remove_count {
                stats.pop_lru();
            }

            // Pools can outlive their statistics when a return races an
            // earlier eviction, so sweep every untracked size.
            let mut pools = lock(&self.pools);
            let untracked: Vec<SurfaceKey> = pools
                .keys()
                .filter(|key| !stats.contains(*key))
                .copied()
                .collect();
            untracked
                .into_iter()
                .filter_map(|key| pools.remove(&key).map(|pool| (key, pool)))
                .collect()
        };

        let mut disposed = 0;
        for (_, pool) in &evicted {
            pool.retire();
            disposed += self.drain_pool(pool);
        }
        log::debug!(
            "evicted surface pools for {} sizes, disposed {disposed} surfaces",
            evicted.len()
        );
    }
}

impl<B: SurfaceBackend> std::fmt::Debug for SurfaceCacheManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceCacheManager")
            .field("config", &self.config)
            .field("tracked_sizes", &self.tracked_sizes())
            .field("pools", &lock(&self.pools).len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/surface_cache_tests.rs"]
mod tests;
