// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the engine driven through its public surface.
//!
//! These cover the layout guarantees (tiling, coalescing, index bijection),
//! both fit policies on a known hole set, the capacity boundary, and the
//! dump/bitmap encoders, then hammer the engine with a seeded random
//! workload and re-check every invariant after each step.

use memory_manager::{
    best_fit, worst_fit, BestFit, Bitmap, HoleList, ManagerConfig, MemoryError, MemoryManager,
    RegionState, Regions, WorstFit, MAX_ARENA_WORDS,
};
use std::ptr::NonNull;

// ── Helpers ────────────────────────────────────────────────────

fn manager(word_size: usize, words: usize) -> MemoryManager {
    let mut mm = MemoryManager::new(word_size, Box::new(BestFit));
    mm.initialize(words);
    mm
}

fn layout(mm: &MemoryManager) -> Vec<(usize, usize, RegionState)> {
    let regions: Regions<'_> = mm.regions();
    regions.map(|r| (r.offset, r.size, r.state)).collect()
}

fn word_offset(mm: &MemoryManager, address: NonNull<u8>) -> usize {
    let base = mm.memory_start().unwrap().as_ptr() as usize;
    (address.as_ptr() as usize - base) / mm.word_size()
}

/// Deterministic xorshift generator so the stress run is reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

// ── Fit Policies ───────────────────────────────────────────────

#[test]
fn test_best_fit_selection() {
    let holes = HoleList::from_pairs(&[(0, 10), (10, 4), (14, 20)]);
    assert_eq!(best_fit(4, &holes), Some(10));
}

#[test]
fn test_worst_fit_selection() {
    let holes = HoleList::from_pairs(&[(0, 10), (10, 4), (14, 20)]);
    assert_eq!(worst_fit(4, &holes), Some(14));
}

#[test]
fn test_policies_drive_engine() {
    // One-word spacers keep the three holes apart.
    let mut mm = manager(1, 37);
    let a = mm.allocate(10).unwrap(); // 0..10
    let _s1 = mm.allocate(1).unwrap(); // 10
    let b = mm.allocate(4).unwrap(); // 11..15
    let _s2 = mm.allocate(1).unwrap(); // 15
    let c = mm.allocate(20).unwrap(); // 16..36
    let _s3 = mm.allocate(1).unwrap(); // 36
    mm.free(a);
    mm.free(b);
    mm.free(c);
    assert_eq!(
        mm.get_list().unwrap(),
        HoleList::from_pairs(&[(0, 10), (11, 4), (16, 20)])
    );

    let p = mm.allocate(4).unwrap();
    assert_eq!(word_offset(&mm, p), 11);
    mm.free(p);

    mm.set_allocator(Box::new(WorstFit));
    let p = mm.allocate(4).unwrap();
    assert_eq!(word_offset(&mm, p), 16);
    assert_eq!(
        mm.get_list().unwrap(),
        HoleList::from_pairs(&[(0, 10), (11, 4), (20, 16)])
    );
}

#[test]
fn test_adjacent_frees_coalesce() {
    let mut mm = manager(1, 36);
    let a = mm.allocate(10).unwrap(); // 0..10
    let b = mm.allocate(4).unwrap(); // 10..14
    let c = mm.allocate(20).unwrap(); // 14..34
    let _pin = mm.allocate(2).unwrap(); // 34..36
    mm.free(b);
    mm.free(a);
    mm.free(c);
    assert_eq!(mm.get_list().unwrap(), HoleList::from_pairs(&[(0, 34)]));
    mm.check_invariants().unwrap();
}

// ── Split / Merge ──────────────────────────────────────────────

#[test]
fn test_split_correctness() {
    let mut mm = manager(8, 100);
    mm.allocate(80).unwrap();
    assert_eq!(
        layout(&mm),
        vec![(0, 10, RegionState::Used), (10, 90, RegionState::Hole)]
    );
    mm.check_invariants().unwrap();
}

#[test]
fn test_merge_correctness() {
    let mut mm = manager(4, 120);
    let a = mm.allocate(40).unwrap();
    let b = mm.allocate(40).unwrap();
    let c = mm.allocate(40).unwrap();

    mm.free(b);
    mm.free(a);
    assert_eq!(
        layout(&mm),
        vec![
            (0, 20, RegionState::Hole),
            (20, 10, RegionState::Used),
            (30, 90, RegionState::Hole)
        ]
    );

    mm.free(c);
    assert_eq!(layout(&mm), vec![(0, 120, RegionState::Hole)]);
}

#[test]
fn test_free_between_two_holes() {
    let mut mm = manager(1, 30);
    let a = mm.allocate(10).unwrap();
    let b = mm.allocate(10).unwrap();
    let c = mm.allocate(10).unwrap();
    mm.free(a);
    mm.free(c);
    assert_eq!(mm.get_list().unwrap().len(), 2);

    mm.free(b);
    assert_eq!(layout(&mm), vec![(0, 30, RegionState::Hole)]);
    assert_eq!(mm.stats().merges, 2);
}

#[test]
fn test_round_trip_restores_hole_list() {
    let mut mm = manager(8, 256);
    let keep = mm.allocate(64).unwrap();
    let before = mm.get_list().unwrap();

    let tmp = mm.allocate(200).unwrap();
    assert_ne!(mm.get_list().unwrap(), before);
    mm.free(tmp);

    assert_eq!(mm.get_list().unwrap(), before);
    mm.free(keep);
    assert_eq!(mm.get_list().unwrap(), HoleList::from_pairs(&[(0, 256)]));
}

// ── Capacity & Lifecycle ───────────────────────────────────────

#[test]
fn test_capacity_boundary() {
    let mut mm = MemoryManager::new(1, Box::new(BestFit));
    mm.initialize(MAX_ARENA_WORDS);
    assert_eq!(mm.memory_limit(), 65536);
    assert_eq!(layout(&mm), vec![(0, 65536, RegionState::Hole)]);

    let mut mm = MemoryManager::new(1, Box::new(BestFit));
    mm.initialize(MAX_ARENA_WORDS + 1);
    assert!(!mm.is_initialized());
    assert_eq!(mm.regions().count(), 0);
    assert!(mm.memory_start().is_none());
}

#[test]
fn test_full_arena_allocates_everything() {
    let mut mm = manager(1, MAX_ARENA_WORDS);
    let all = mm.allocate(MAX_ARENA_WORDS).unwrap();
    assert!(mm.get_list().unwrap().is_empty());
    assert!(mm.allocate(1).is_none());
    mm.free(all);
    assert_eq!(mm.free_words(), MAX_ARENA_WORDS);
}

#[test]
fn test_full_hole_does_not_encode() {
    let mm = manager(1, MAX_ARENA_WORDS);
    assert!(matches!(
        mm.get_list().unwrap().encode(),
        Err(MemoryError::EncodingOverflow { value: 65536 })
    ));
}

#[test]
fn test_strict_surface() {
    let mut mm = MemoryManager::new(8, Box::new(BestFit));
    assert!(matches!(
        mm.try_initialize(70_000),
        Err(MemoryError::CapacityExceeded {
            requested_words: 70_000,
            max_words: 65536
        })
    ));
    mm.try_initialize(16).unwrap();
    assert!(matches!(
        mm.try_allocate(17 * 8),
        Err(MemoryError::NoFit { requested_words: 17 })
    ));
    let stray = 7u64;
    assert!(matches!(
        mm.try_free(NonNull::from(&stray).cast()),
        Err(MemoryError::UnknownAddress { .. })
    ));
}

// ── Encoders & Dump ────────────────────────────────────────────

#[test]
fn test_bitmap_round_trip() {
    let mut mm = manager(2, 20);
    let a = mm.allocate(6).unwrap(); // 0..3
    let _b = mm.allocate(4).unwrap(); // 3..5
    let c = mm.allocate(10).unwrap(); // 5..10
    let _d = mm.allocate(2).unwrap(); // 10..11
    mm.free(a);
    mm.free(c);

    let bitmap = mm.get_bitmap().unwrap();
    let decoded = Bitmap::from_bytes(bitmap.as_bytes(), 20).unwrap();

    let mut expected = vec![false; 20];
    for region in mm.regions().filter(|r| r.state == RegionState::Used) {
        for word in region.offset..region.end() {
            expected[word] = true;
        }
    }
    assert_eq!(decoded.occupancy(), expected);
    assert_eq!(decoded.count_used(), mm.used_words());
    assert_eq!(&bitmap.as_bytes()[..2], &[3, 0]);
}

#[test]
fn test_dump_memory_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.txt");

    let mut mm = manager(1, 64);
    let a = mm.allocate(10).unwrap();
    let _b = mm.allocate(16).unwrap();
    mm.free(a);

    // Pre-existing longer content must be replaced, not overwritten in place.
    std::fs::write(&path, "x".repeat(200)).unwrap();
    mm.dump_memory_map(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[0, 10] - [26, 38]");
}

#[test]
fn test_dump_failures() {
    let dir = tempfile::tempdir().unwrap();

    let mm = manager(1, 8);
    let missing_dir = dir.path().join("no-such-dir").join("map.txt");
    assert!(matches!(
        mm.dump_memory_map(&missing_dir),
        Err(MemoryError::Io(_))
    ));

    let idle = MemoryManager::new(1, Box::new(BestFit));
    let path = dir.path().join("idle.txt");
    assert!(matches!(
        idle.dump_memory_map(&path),
        Err(MemoryError::NotInitialized)
    ));
    assert!(!path.exists());
}

#[test]
fn test_hole_list_wire_form_feeds_policies() {
    let mut mm = manager(1, 50);
    let a = mm.allocate(5).unwrap();
    let _b = mm.allocate(5).unwrap();
    mm.free(a);

    let wire = mm.get_list().unwrap().encode().unwrap();
    assert_eq!(wire, vec![2, 0, 5, 10, 40]);
    let decoded = HoleList::decode(&wire).unwrap();
    assert_eq!(best_fit(3, &decoded), Some(0));
    assert_eq!(worst_fit(3, &decoded), Some(10));
}

// ── Configuration ──────────────────────────────────────────────

#[test]
fn test_config_builds_engine() {
    let config = ManagerConfig::from_toml(
        r#"
word_size = 4
size_in_words = 16
policy = "worst-fit"
"#,
    )
    .unwrap();
    let mut mm = config.build().unwrap();
    assert_eq!(mm.memory_limit(), 64);
    let a = mm.allocate(8).unwrap();
    assert_eq!(word_offset(&mm, a), 0);
}

// ── Randomized Workload ────────────────────────────────────────

fn stress(policy_name: &str, seed: u64) {
    let mut mm = MemoryManager::new(4, memory_manager::policy_by_name(policy_name).unwrap());
    mm.initialize(512);

    let mut rng = XorShift(seed);
    let mut live: Vec<NonNull<u8>> = Vec::new();

    for step in 0..2000 {
        if live.is_empty() || rng.below(100) < 55 {
            let bytes = 1 + rng.below(96) as usize;
            if let Some(address) = mm.allocate(bytes) {
                live.push(address);
            }
        } else {
            let victim = live.swap_remove(rng.below(live.len() as u64) as usize);
            mm.free(victim);
        }

        if let Err(e) = mm.check_invariants() {
            panic!("{policy_name} seed {seed} step {step}: {e}");
        }
        let holes = mm.get_list().unwrap();
        assert_eq!(holes.total_words() + mm.used_words(), 512);
        assert_eq!(mm.get_bitmap().unwrap().count_used(), mm.used_words());
    }

    for address in live.drain(..) {
        mm.free(address);
    }
    assert_eq!(layout(&mm), vec![(0, 512, RegionState::Hole)]);
    assert_eq!(mm.stats().ignored_frees, 0);
}

#[test]
fn test_random_workload_best_fit() {
    for seed in [1, 42, 0xDEAD_BEEF] {
        stress("best-fit", seed);
    }
}

#[test]
fn test_random_workload_worst_fit() {
    for seed in [7, 99, 0x1234_5678] {
        stress("worst-fit", seed);
    }
}
