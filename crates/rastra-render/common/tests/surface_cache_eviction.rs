use rastra_render_common::{RasterSurface, SurfaceCacheConfig, SurfaceKey};
use rastra_testing::recording_cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn exceeding_tracked_sizes_evicts_a_quarter() {
    let config = SurfaceCacheConfig::default();
    let (cache, disposer) = recording_cache(config);

    // Two surfaces per size so every pool holds something to dispose.
    for width in 1..=config.max_tracked_sizes as u32 {
        let a = cache.get_surface(width, 4).unwrap();
        let b = cache.get_surface(width, 4).unwrap();
        cache.return_surface(a);
        cache.return_surface(b);
    }
    assert_eq!(cache.tracked_sizes(), 100);
    assert_eq!(disposer.disposed_count(), 0);

    let extra = cache.get_surface(1_000, 4).unwrap();

    assert_eq!(cache.tracked_sizes(), 76);
    for width in 1..=25 {
        assert!(cache.usage(SurfaceKey::new(width, 4)).is_none());
        assert_eq!(cache.pooled_count(SurfaceKey::new(width, 4)), 0);
    }
    assert!(cache.usage(SurfaceKey::new(26, 4)).is_some());

    let ids = disposer.disposed_ids();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(unique.len(), ids.len());

    cache.return_surface(extra);
}

#[test]
fn concurrent_returns_and_evictions_lose_no_surface() {
    let config = SurfaceCacheConfig::default()
        .with_max_tracked_sizes(8)
        .with_max_pool_size(4);
    let (cache, disposer) = recording_cache(config);
    let cache = Arc::new(cache);

    let workers: Vec<_> = (0..6u32)
        .map(|worker| {
            let cache = cache.clone();
            thread::spawn(move || {
                let mut seen = Vec::new();
                for round in 0..300u32 {
                    // Overlapping size ranges keep sizes hot on some threads
                    // while others push them out.
                    let width = 1 + (round * 7 + worker * 3) % 24;
                    let surface = cache.get_surface(width, 2).unwrap();
                    assert_eq!((surface.width(), surface.height()), (width, 2));
                    seen.push(surface.id());
                    cache.return_surface(surface);
                }
                seen
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let allocated = cache.backend().allocated();
    cache.dispose();

    let ids = disposer.disposed_ids();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "a surface was disposed twice");
    assert_eq!(ids.len() as u64, allocated, "a surface was stranded in a pool");
}
