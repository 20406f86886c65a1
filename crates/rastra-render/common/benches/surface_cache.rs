use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rastra_render_common::SurfaceCacheConfig;
use rastra_testing::recording_cache;

const SIZE_CLASS_SAMPLES: &[u32] = &[4, 64, 256];

fn bench_hot_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_cache_hot");
    for &size_classes in SIZE_CLASS_SAMPLES {
        group.bench_with_input(
            BenchmarkId::new("size_classes", size_classes),
            &size_classes,
            |b, &size_classes| {
                let (cache, disposer) = recording_cache(SurfaceCacheConfig::default());
                b.iter(|| {
                    for width in 1..=size_classes {
                        let surface = cache.get_surface(width, 16).unwrap();
                        cache.return_surface(black_box(surface));
                    }
                    // Keep the recorder from growing across iterations.
                    black_box(disposer.take_disposed().len());
                });
            },
        );
    }
    group.finish();
}

fn bench_cold_request(c: &mut Criterion) {
    c.bench_function("surface_cache_cold", |b| {
        let (cache, disposer) =
            recording_cache(SurfaceCacheConfig::default().with_min_requests_for_pooling(u64::MAX));
        b.iter(|| {
            let surface = cache.get_surface(64, 64).unwrap();
            cache.return_surface(surface);
            black_box(disposer.take_disposed().len());
        });
    });
}

criterion_group!(surface_cache, bench_hot_sizes, bench_cold_request);
criterion_main!(surface_cache);
