//! # Arena Scenario Tests
//!
//! End-to-end checks of the allocators working together:
//!
//! 1. **Pool**: the capacity-3 alloc/free/reuse walkthrough
//! 2. **Carving**: every structure carved out of one configured bump arena
//! 3. **Directory listing**: entry records holding string handles in a dense set
//!
//! Run with: cargo test --package arenakit_core --test arena_scenarios

use arenakit_core::{
    text::concat_str_in, ArenaConfig, ArenaError, BumpArena, DenseSet, PoolArena, StringHandle,
    StringStore, FRAGMENT_CAPACITY,
};
use bytemuck::{Pod, Zeroable};

// ============================================================================
// POOL WALKTHROUGH
// ============================================================================

#[test]
fn pool_capacity_three_walkthrough() {
    let mut pool: PoolArena<'_, [u8; 4]> = PoolArena::new(3);

    let a = pool.allocate(*b"AAAA").unwrap();
    let b = pool.allocate(*b"BBBB").unwrap();
    let c = pool.allocate(*b"CCCC").unwrap();
    assert_eq!(pool.count(), 3);

    // D does not fit.
    assert_eq!(
        pool.allocate(*b"DDDD").unwrap_err(),
        ArenaError::ArenaFull { capacity: 3 }
    );

    // Free B, then E takes B's slot.
    pool.free(b).unwrap();
    assert_eq!(pool.free_list_len(), 1);
    let e = pool.allocate(*b"EEEE").unwrap();
    assert_eq!(e.index(), b.index());
    assert_eq!(pool.free_list_len(), 0);

    // C is the last slot: count drops, the free list stays empty.
    pool.free(c).unwrap();
    assert_eq!(pool.count(), 2);
    assert_eq!(pool.free_list_len(), 0);

    assert_eq!(pool.get(a), Some(b"AAAA"));
    assert_eq!(pool.get(e), Some(b"EEEE"));
}

#[test]
fn freed_slot_reused_before_high_water_mark_grows() {
    let mut pool: PoolArena<'_, u32> = PoolArena::new(16);

    let handles: Vec<_> = (0..8).map(|v| pool.allocate(v).unwrap()).collect();
    pool.free(handles[2]).unwrap();
    pool.free(handles[5]).unwrap();

    let reused: Vec<u32> = (0..2).map(|v| pool.allocate(v).unwrap().index()).collect();
    assert_eq!(reused, vec![5, 2]);
    assert_eq!(pool.count(), 8);

    assert_eq!(pool.allocate(99).unwrap().index(), 8);
}

// ============================================================================
// ONE MEMORY GRANT
// ============================================================================

#[test]
fn everything_carved_from_one_configured_arena() {
    let config = ArenaConfig::from_toml_str(
        r"
        bump_capacity = 8192
        pool_capacity = 16
        set_capacity = 16
        string_segments = 32
        ",
    )
    .unwrap();
    config.check_budget::<u64>().unwrap();

    let mut backing = config.allocate_backing();
    let mut bump = BumpArena::new(&mut backing);
    {
        let mut pool = PoolArena::<u64>::carve(&bump, config.pool_capacity).unwrap();
        let mut set = DenseSet::<u64>::carve(&bump, config.set_capacity).unwrap();
        let mut strings = StringStore::carve(&bump, config.string_segments).unwrap();
        let scratch = bump.alloc_slice::<u8>(100).unwrap();
        assert!(bump.used() <= config.required_bytes::<u64>().unwrap() + 100);

        for v in 0..16 {
            let _ = pool.allocate(v).unwrap();
            set.add(v * 2).unwrap();
        }
        let handle = strings.store(&[b'x'; 200]).unwrap();
        scratch.fill(7);

        assert!(pool.is_full());
        assert_eq!(set.iter().sum::<u64>(), (0..16).map(|v| v * 2).sum());
        assert_eq!(strings.load_vec(handle).unwrap(), vec![b'x'; 200]);
    }

    // Every carved structure is gone, so the arena can be reset.
    let first_used = bump.used();
    bump.reset();
    assert_eq!(bump.used(), 0);

    let again = PoolArena::<u64>::carve(&bump, config.pool_capacity).unwrap();
    assert_eq!(again.live_count(), 0);
    assert!(bump.used() < first_used);
}

#[test]
fn carving_stops_at_capacity() {
    let mut buffer = vec![0u8; 512];
    let bump = BumpArena::new(&mut buffer);

    let mut carved = 0;
    while let Ok(set) = DenseSet::<u32>::carve(&bump, 8) {
        assert_eq!(set.capacity(), 8);
        carved += 1;
    }
    assert!(carved > 0);
    assert!(bump.remaining() < DenseSet::<u32>::footprint(8).unwrap());
}

// ============================================================================
// DIRECTORY LISTING
// ============================================================================

/// A listed filesystem entry. The path lives in the string store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct Entry {
    path: StringHandle,
    is_dir: u32,
}

#[test]
fn entry_set_with_fragmented_paths() {
    let names = [
        ("src", true),
        ("Cargo.toml", false),
        ("a-very-long-generated-file-name-that-needs-more-than-one-segment-to-store.rs", false),
        ("target", true),
    ];

    let mut buffer = vec![0u8; 16 * 1024];
    let bump = BumpArena::new(&mut buffer);
    let mut paths = StringStore::carve(&bump, 32).unwrap();
    let mut entries = DenseSet::<Entry>::carve(&bump, 32).unwrap();

    for (name, is_dir) in names {
        let joined = concat_str_in(&bump, &[".", "/", name]).unwrap();
        let path = paths.store(joined.as_bytes()).unwrap();
        entries
            .add(Entry {
                path,
                is_dir: u32::from(is_dir),
            })
            .unwrap();
    }
    assert_eq!(entries.len(), 4);
    assert!(names[2].0.len() + 2 > FRAGMENT_CAPACITY);

    // Drop the manifest; the last entry moves into its place.
    let removed = entries.remove(1).unwrap();
    assert!(paths.matches(removed.path, b"./Cargo.toml").unwrap());
    paths.free(removed.path).unwrap();

    let listed: Vec<Vec<u8>> = entries
        .iter()
        .map(|entry| paths.load_vec(entry.path).unwrap())
        .collect();
    assert_eq!(
        listed,
        vec![
            b"./src".to_vec(),
            b"./target".to_vec(),
            format!("./{}", names[2].0).into_bytes(),
        ]
    );
    assert_eq!(entries.iter().filter(|entry| entry.is_dir == 1).count(), 2);
}

#[test]
fn string_boundary_lengths_consume_expected_segments() {
    let f = FRAGMENT_CAPACITY;
    let mut store = StringStore::new(64);

    for len in [0, 1, f - 1, f, f + 1, 3 * f] {
        let before = store.segments_in_use();
        let bytes: Vec<u8> = (b'a'..=b'z').cycle().take(len).collect();

        let handle = store.store(&bytes).unwrap();
        let consumed = (store.segments_in_use() - before) as usize;
        assert_eq!(consumed, len.div_ceil(f).max(1), "length {len}");
        assert_eq!(handle.segment_count(), consumed);

        let mut buffer = vec![0u8; len];
        let out = BumpArena::new(&mut buffer);
        assert_eq!(store.load(handle, &out).unwrap(), &bytes[..]);
    }
}
