//! Concrete usage scenarios and storage accounting

use std::mem::size_of;
use std::sync::Arc;

use cowbits::{AllocSnapshot, AllocStats, Bitset, BitsetConfig, BitsetError, Block, BlockBitset};
use tracing_subscriber::filter::LevelFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

fn tracked(stats: &Arc<AllocStats>) -> BitsetConfig {
    BitsetConfig::default().with_tracker(stats.clone())
}

#[test]
fn test_duplicate_then_clear() {
    init_tracing();

    let mut s = Bitset::new(200).unwrap();
    s.set(5).unwrap();
    s.set(130).unwrap();
    s.set(199).unwrap();
    assert_eq!(s.population_count(), 3);
    assert!(s.test(130).unwrap());
    assert!(!s.test(6).unwrap());

    let mut d = s.duplicate().unwrap();
    d.clear(5).unwrap();
    assert!(s.test(5).unwrap());
    assert!(!d.test(5).unwrap());
    assert_eq!(d.population_count(), 2);
    assert_eq!(s.population_count(), 3);
}

#[test]
fn test_overlapping_ranges() {
    let a = Bitset::from_ones(128, 0..64).unwrap();
    let b = Bitset::from_ones(128, 32..96).unwrap();

    let union = a.union(&b).unwrap();
    assert_eq!(union.population_count(), 96);
    assert!(union.iter_ones().eq(0..96));

    let intersect = a.intersect(&b).unwrap();
    assert_eq!(intersect.population_count(), 32);
    assert!(intersect.iter_ones().eq(32..64));

    let difference = a.difference(&b).unwrap();
    assert_eq!(difference.population_count(), 32);
    assert!(difference.iter_ones().eq(0..32));
}

#[test]
fn test_out_of_range_leaves_bitset_unmodified() {
    let mut s = Bitset::from_ones(200, [1, 2, 3]).unwrap();
    let before = s.duplicate().unwrap();

    assert!(matches!(s.set(200), Err(BitsetError::OutOfRange { .. })));
    assert!(matches!(s.clear(usize::MAX), Err(BitsetError::OutOfRange { .. })));
    assert!(matches!(s.test(200), Err(BitsetError::OutOfRange { .. })));
    assert_eq!(s, before);
}

#[test]
fn test_storage_is_released() {
    init_tracing();
    let stats = Arc::new(AllocStats::new());

    {
        let mut a = BlockBitset::<1>::with_config(1000, tracked(&stats)).unwrap();
        let mut b = BlockBitset::<1>::with_config(1000, tracked(&stats)).unwrap();
        for index in (0..1000).step_by(7) {
            a.set(index).unwrap();
        }
        for index in (0..500).step_by(3) {
            b.set(index).unwrap();
        }

        let c = a.union(&b).unwrap();
        let mut d = c.inverse().unwrap();
        d.subtract(&a).unwrap();
        a.and(&b).unwrap();
        b.invert().unwrap();

        assert!(stats.snapshot().live_blocks > 0);
        assert!(stats.snapshot().live_bytes > 0);
    }

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.live_bytes, 0);
    assert_eq!(snapshot.live_blocks, 0);
    assert!(snapshot.allocations > 0);
}

#[test]
fn test_duplicate_copies_no_blocks() {
    let stats = Arc::new(AllocStats::new());
    let mut a = BlockBitset::<1>::with_config(640, tracked(&stats)).unwrap();
    for index in (0..640).step_by(10) {
        a.set(index).unwrap();
    }
    assert_eq!(stats.snapshot().live_blocks, 10);

    let mut d = a.duplicate().unwrap();
    assert_eq!(stats.snapshot().live_blocks, 10);
    assert_eq!(d.shared_blocks(), 10);

    // Setting a bit that is already set must not unshare
    let allocations = stats.snapshot().allocations;
    d.set(0).unwrap();
    assert_eq!(stats.snapshot().allocations, allocations);

    // The first real write copies exactly one block
    d.set(1).unwrap();
    assert_eq!(stats.snapshot().live_blocks, 11);
    assert_eq!(stats.snapshot().allocations, allocations + 1);
    assert_eq!(a.shared_blocks(), 9);
}

#[test]
fn test_memory_limit_surfaces_as_allocation_failure() {
    init_tracing();

    // A slot is a single nullable pointer
    let slot_bytes = 2 * size_of::<usize>();
    let stats = Arc::new(AllocStats::new().with_memory_limit(slot_bytes + Block::<1>::SIZE));
    let mut a = BlockBitset::<1>::with_config(128, tracked(&stats)).unwrap();

    a.set(0).unwrap();
    assert_eq!(a.set(64), Err(BitsetError::AllocationFailure));
    assert!(!a.test(64).unwrap());
    assert_eq!(a.population_count(), 1);
    assert_eq!(a.allocated_blocks(), 1);

    // No room for another slot vector either
    assert_eq!(a.duplicate().unwrap_err(), BitsetError::AllocationFailure);
    assert_eq!(a.inverse().unwrap_err(), BitsetError::AllocationFailure);
    assert_eq!(a.population_count(), 1);

    // In-place complement gets through the first slot, then runs out
    assert_eq!(a.invert(), Err(BitsetError::AllocationFailure));
    assert_eq!(a.population_count(), 63);
    assert_eq!(a.allocated_blocks(), 1);

    drop(a);
    assert_eq!(stats.snapshot().live_bytes, 0);
}

#[test]
fn test_failed_slot_allocation_is_not_counted() {
    init_tracing();
    let stats = Arc::new(AllocStats::new());

    assert_eq!(
        Bitset::with_config(usize::MAX, tracked(&stats)).unwrap_err(),
        BitsetError::AllocationFailure
    );
    assert_eq!(stats.snapshot(), AllocSnapshot::default());
}

#[test]
fn test_untracked_block_shared_into_tracked_bitset() {
    init_tracing();
    let stats = Arc::new(AllocStats::new().with_memory_limit(4096));

    {
        let mut a = BlockBitset::<1>::with_config(64, tracked(&stats)).unwrap();
        let b = BlockBitset::<1>::from_ones(64, [0]).unwrap();
        let empty = BlockBitset::<1>::new(64).unwrap();

        // `a` takes over the only handle to a block it never reserved
        a.or(&b).unwrap();
        drop(b);
        assert_eq!(stats.snapshot().live_blocks, 0);

        a.and(&empty).unwrap();
        assert_eq!(a.allocated_blocks(), 0);
        assert_eq!(stats.snapshot().live_bytes, size_of::<usize>());
        assert_eq!(stats.snapshot().live_blocks, 0);

        // The limit still has room for a block of its own
        a.set(1).unwrap();
        assert_eq!(stats.snapshot().live_blocks, 1);
        assert_eq!(
            stats.snapshot().live_bytes,
            size_of::<usize>() + Block::<1>::SIZE
        );
    }

    assert_eq!(stats.snapshot().live_bytes, 0);
    assert_eq!(stats.snapshot().live_blocks, 0);
}

#[test]
fn test_tracked_block_outlives_its_bitset() {
    init_tracing();
    let stats = Arc::new(AllocStats::new());
    let mut plain = BlockBitset::<1>::new(64).unwrap();

    {
        let mut a = BlockBitset::<1>::with_config(64, tracked(&stats)).unwrap();
        a.set(3).unwrap();
        plain.or(&a).unwrap();
    }

    // Still alive in `plain`, so still charged to the tracker that paid for it
    assert_eq!(stats.snapshot().live_blocks, 1);
    assert_eq!(stats.snapshot().live_bytes, Block::<1>::SIZE);

    plain.clear(3).unwrap();
    plain.set(4).unwrap();
    assert_eq!(stats.snapshot().allocations, 2);

    drop(plain);
    assert_eq!(stats.snapshot().live_blocks, 0);
    assert_eq!(stats.snapshot().live_bytes, 0);
}

#[test]
fn test_shared_blocks_readable_across_threads() {
    let mut original = Bitset::from_ones(10_000, (0..10_000).step_by(3)).unwrap();
    let copy = original.duplicate().unwrap();

    let reader = std::thread::spawn(move || copy.population_count());
    original.clear(0).unwrap();

    assert_eq!(reader.join().unwrap(), 3334);
    assert_eq!(original.population_count(), 3333);
}

#[cfg(feature = "serde")]
#[test]
fn test_snapshot_serializes() {
    let stats = AllocStats::new();
    let json = serde_json::to_string(&stats.snapshot()).unwrap();
    assert!(json.contains("\"live_bytes\":0"));
}
