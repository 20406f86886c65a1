use super::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn add_beyond_capacity_returns_surface() {
    let pool = SurfacePool::new(3);
    for id in 0..3 {
        assert!(pool.try_add(id).is_ok());
    }

    assert_eq!(pool.try_add(99), Err(99));
    assert_eq!(pool.current_size(), 3);
}

#[test]
fn take_from_empty_pool_is_none() {
    let pool: SurfacePool<u32> = SurfacePool::new(2);
    assert_eq!(pool.try_take(), None);
    assert_eq!(pool.current_size(), 0);
}

#[test]
fn take_frees_a_slot() {
    let pool = SurfacePool::new(1);
    pool.try_add(1).unwrap();
    assert_eq!(pool.try_take(), Some(1));
    assert_eq!(pool.current_size(), 0);
    assert!(pool.try_add(2).is_ok());
}

#[test]
fn zero_capacity_rejects_everything() {
    let pool = SurfacePool::new(0);
    assert_eq!(pool.try_add(7), Err(7));
    assert_eq!(pool.current_size(), 0);
}

#[test]
fn retired_pool_rejects_adds_but_can_be_drained() {
    let pool = SurfacePool::new(4);
    pool.try_add(1).unwrap();
    pool.try_add(2).unwrap();

    pool.retire();
    assert_eq!(pool.try_add(3), Err(3));

    let mut drained = Vec::new();
    assert_eq!(pool.drain(|surface| drained.push(surface)), 2);
    assert_eq!(drained, vec![1, 2]);
    assert_eq!(pool.current_size(), 0);
}

#[test]
fn concurrent_adds_never_exceed_bound() {
    let pool = Arc::new(SurfacePool::new(10));

    let adders: Vec<_> = (0..8u32)
        .map(|thread_id| {
            let pool = pool.clone();
            thread::spawn(move || {
                let mut rejected = Vec::new();
                for index in 0..50u32 {
                    let surface = thread_id * 1_000 + index;
                    if let Err(surface) = pool.try_add(surface) {
                        rejected.push(surface);
                    }
                    assert!(pool.current_size() <= 10);
                    if index % 3 == 0 {
                        if let Some(taken) = pool.try_take() {
                            rejected.push(taken);
                        }
                    }
                }
                rejected
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for adder in adders {
        for surface in adder.join().unwrap() {
            assert!(seen.insert(surface));
        }
    }
    pool.drain(|surface| assert!(seen.insert(surface)));

    assert_eq!(seen.len(), 8 * 50);
    assert_eq!(pool.current_size(), 0);
}
