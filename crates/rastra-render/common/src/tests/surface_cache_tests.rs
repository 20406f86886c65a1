use super::*;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

#[derive(Debug, PartialEq)]
struct Canvas {
    id: u32,
    width: u32,
    height: u32,
    dirty: bool,
}

impl RasterSurface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.dirty = false;
    }
}

#[derive(Default)]
struct CountingBackend {
    next_id: AtomicU32,
    fail: bool,
}

impl SurfaceBackend for CountingBackend {
    type Surface = Canvas;

    fn create_surface(&self, width: u32, height: u32) -> Result<Canvas, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::allocation(width, height, "out of memory"));
        }
        Ok(Canvas {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            width,
            height,
            dirty: false,
        })
    }
}

impl CountingBackend {
    fn created(&self) -> u32 {
        self.next_id.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct DisposedIds {
    ids: Mutex<Vec<u32>>,
    count: AtomicUsize,
}

impl DisposeManager<Canvas> for DisposedIds {
    fn dispose_object(&self, resource: Canvas) {
        self.count.fetch_add(1, Ordering::SeqCst);
        lock(&self.ids).push(resource.id);
    }
}

fn manager(config: SurfaceCacheConfig) -> (SurfaceCacheManager<CountingBackend>, Arc<DisposedIds>) {
    let disposed = Arc::new(DisposedIds::default());
    let disposer: Arc<dyn DisposeManager<Canvas>> = disposed.clone();
    let cache = SurfaceCacheManager::with_config(CountingBackend::default(), disposer, config);
    (cache, disposed)
}

#[test]
fn returned_surface_is_reused_for_same_size() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default());

    let first = cache.get_surface(100, 50).unwrap();
    let id = first.id;
    cache.return_surface(first);
    assert_eq!(cache.pooled_count(SurfaceKey::new(100, 50)), 1);

    let second = cache.get_surface(100, 50).unwrap();
    assert_eq!(second.id, id);
    assert_eq!(cache.backend().created(), 1);
    assert_eq!(disposed.count.load(Ordering::SeqCst), 0);
}

#[test]
fn pooled_surfaces_are_cleared_before_reuse() {
    let (cache, _) = manager(SurfaceCacheConfig::default());

    let mut surface = cache.get_surface(8, 8).unwrap();
    surface.dirty = true;
    cache.return_surface(surface);

    assert!(!cache.get_surface(8, 8).unwrap().dirty);
}

#[test]
fn different_sizes_never_share_surfaces() {
    let (cache, _) = manager(SurfaceCacheConfig::default());

    let small = cache.get_surface(10, 10).unwrap();
    cache.return_surface(small);
    let large = cache.get_surface(10, 11).unwrap();

    assert_eq!((large.width, large.height), (10, 11));
    assert_eq!(cache.backend().created(), 2);
}

#[test]
fn second_request_is_pooled_with_threshold_two() {
    let (cache, _) = manager(SurfaceCacheConfig::default().with_min_requests_for_pooling(2));
    let key = SurfaceKey::new(100, 100);

    let first = cache.get_surface(100, 100).unwrap();
    assert_eq!(cache.pooled_count(key), 0);
    let first_id = first.id;
    cache.return_surface(first);

    let second = cache.get_surface(100, 100).unwrap();
    assert_eq!(second.id, first_id);
    assert_eq!(cache.backend().created(), 1);
}

#[test]
fn cold_sizes_go_to_the_disposer() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default().with_min_requests_for_pooling(3));

    let surface = cache.get_surface(40, 40).unwrap();
    cache.return_surface(surface);

    assert_eq!(disposed.count.load(Ordering::SeqCst), 1);
    assert_eq!(cache.pooled_count(SurfaceKey::new(40, 40)), 0);
}

#[test]
fn untracked_size_is_disposed_on_return() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default());
    let stray = Canvas {
        id: 77,
        width: 3,
        height: 3,
        dirty: true,
    };

    cache.return_surface(stray);

    assert_eq!(*lock(&disposed.ids), vec![77]);
}

#[test]
fn full_pool_spills_to_disposer() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default().with_max_pool_size(2));

    let surfaces: Vec<_> = (0..3).map(|_| cache.get_surface(16, 16).unwrap()).collect();
    for surface in surfaces {
        cache.return_surface(surface);
    }

    assert_eq!(cache.pooled_count(SurfaceKey::new(16, 16)), 2);
    assert_eq!(*lock(&disposed.ids), vec![2]);
}

#[test]
fn empty_request_is_rejected_without_tracking() {
    let (cache, _) = manager(SurfaceCacheConfig::default());

    assert_eq!(
        cache.get_surface(0, 20).unwrap_err(),
        SurfaceError::EmptySize {
            width: 0,
            height: 20
        }
    );
    assert_eq!(cache.tracked_sizes(), 0);
}

#[test]
fn allocation_failure_propagates() {
    let disposer: Arc<dyn DisposeManager<Canvas>> = Arc::new(DisposedIds::default());
    let backend = CountingBackend {
        fail: true,
        ..Default::default()
    };
    let cache = SurfaceCacheManager::new(backend, disposer);

    let error = cache.get_surface(64, 64).unwrap_err();
    assert!(matches!(error, SurfaceError::Allocation { width: 64, height: 64, .. }));
    assert_eq!(cache.usage(SurfaceKey::new(64, 64)).map(|usage| usage.request_count), Some(1));
}

#[test]
fn usage_counts_every_request() {
    let (cache, _) = manager(SurfaceCacheConfig::default());
    for _ in 0..4 {
        let surface = cache.get_surface(5, 7).unwrap();
        cache.return_surface(surface);
    }

    let usage = cache.usage(SurfaceKey::new(5, 7)).unwrap();
    assert_eq!(usage.request_count, 4);
}

#[test]
fn eviction_drops_least_recently_requested_quarter() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default().with_max_tracked_sizes(8));

    for width in 1..=7 {
        let surface = cache.get_surface(width, 1).unwrap();
        cache.return_surface(surface);
    }
    // Refresh the oldest size so the next two become the eviction victims.
    let refreshed = cache.get_surface(1, 1).unwrap();
    cache.return_surface(refreshed);
    let eighth = cache.get_surface(8, 1).unwrap();
    cache.return_surface(eighth);
    assert_eq!(cache.tracked_sizes(), 8);

    let ninth = cache.get_surface(9, 1).unwrap();
    cache.return_surface(ninth);

    assert_eq!(cache.tracked_sizes(), 7);
    assert!(cache.usage(SurfaceKey::new(1, 1)).is_some());
    assert!(cache.usage(SurfaceKey::new(2, 1)).is_none());
    assert!(cache.usage(SurfaceKey::new(3, 1)).is_none());
    assert_eq!(cache.pooled_count(SurfaceKey::new(2, 1)), 0);

    let mut ids = lock(&disposed.ids).clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn dispose_drains_every_pool_and_forgets_stats() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default());
    for width in [10, 20, 30] {
        let a = cache.get_surface(width, width).unwrap();
        let b = cache.get_surface(width, width).unwrap();
        cache.return_surface(a);
        cache.return_surface(b);
    }

    cache.dispose();

    assert_eq!(disposed.count.load(Ordering::SeqCst), 6);
    assert_eq!(cache.tracked_sizes(), 0);
    assert_eq!(cache.pooled_count(SurfaceKey::new(10, 10)), 0);
}

#[test]
fn return_into_retired_pool_is_disposed_once() {
    let (cache, disposed) = manager(SurfaceCacheConfig::default());
    let key = SurfaceKey::new(12, 12);

    let surface = cache.get_surface(12, 12).unwrap();
    let stale_pool = cache.pool_or_insert(key);
    stale_pool.retire();

    cache.return_surface(surface);

    // The manager still maps the retired pool, so the surface is rejected
    // up front and disposed rather than stranded.
    assert_eq!(disposed.count.load(Ordering::SeqCst), 1);
    assert_eq!(stale_pool.current_size(), 0);
}

/// Disposer that calls back into the cache the first time it is used.
#[derive(Default)]
struct ReentrantDisposer {
    cache: std::sync::OnceLock<std::sync::Weak<SurfaceCacheManager<CountingBackend>>>,
    reentered: std::sync::atomic::AtomicBool,
    count: AtomicUsize,
}

impl DisposeManager<Canvas> for ReentrantDisposer {
    fn dispose_object(&self, _resource: Canvas) {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.reentered.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(cache) = self.cache.get().and_then(|cache| cache.upgrade()) {
            cache.dispose();
        }
    }
}

fn reentrant_manager(
    config: SurfaceCacheConfig,
) -> (Arc<SurfaceCacheManager<CountingBackend>>, Arc<ReentrantDisposer>) {
    let reentrant = Arc::new(ReentrantDisposer::default());
    let disposer: Arc<dyn DisposeManager<Canvas>> = reentrant.clone();
    let cache = Arc::new(SurfaceCacheManager::with_config(
        CountingBackend::default(),
        disposer,
        config,
    ));
    assert!(reentrant.cache.set(Arc::downgrade(&cache)).is_ok());
    (cache, reentrant)
}

#[test]
fn disposer_may_reenter_cache_during_dispose() {
    let (cache, disposer) = reentrant_manager(SurfaceCacheConfig::default());
    for width in 1..=3 {
        let surface = cache.get_surface(width, 8).unwrap();
        cache.return_surface(surface);
    }

    cache.dispose();

    assert_eq!(disposer.count.load(Ordering::SeqCst), 3);
    assert_eq!(cache.tracked_sizes(), 0);
}

#[test]
fn disposer_may_reenter_cache_during_eviction() {
    let (cache, disposer) =
        reentrant_manager(SurfaceCacheConfig::default().with_max_tracked_sizes(4));
    for width in 1..=4 {
        let surface = cache.get_surface(width, 8).unwrap();
        cache.return_surface(surface);
    }

    // Evicts width 1; its disposal tears the rest of the cache down.
    let surface = cache.get_surface(5, 8).unwrap();

    assert_eq!(disposer.count.load(Ordering::SeqCst), 4);
    assert_eq!(cache.tracked_sizes(), 1);
    cache.return_surface(surface);
}
