// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocator engine.
//!
//! A [`MemoryManager`] owns one arena of `word_size * size_in_words` bytes
//! and hands out word-aligned blocks from it. Every request:
//!
//! 1. Takes a [`HoleList`] snapshot of the current free spans.
//! 2. Asks the active [`FitPolicy`] which hole to use.
//! 3. Marks the hole used, splitting off the remainder when it is larger
//!    than the request.
//!
//! `free` marks a block as a hole again and coalesces it with any hole
//! neighbours, so the region list never holds two adjacent holes.
//!
//! # Compatibility Surface
//! `initialize`, `allocate` and `free` keep the lenient contract of the
//! classic simulator: an oversized arena or an unknown address is ignored
//! and a failed allocation is just `None`. The `try_*` variants report the
//! same conditions as [`MemoryError`]s.

use crate::bitmap::Bitmap;
use crate::hole_list::Hole;
use crate::region::{RegionList, Regions};
use crate::{AllocationStats, FitPolicy, HoleList, MemoryError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::ptr::NonNull;

/// Largest arena, in words, that the 16-bit hole-list fields can address.
pub const MAX_ARENA_WORDS: usize = 65536;

/// Backing buffer plus the bookkeeping that describes it.
struct Arena {
    memory: Box<[u8]>,
    words: usize,
    regions: RegionList,
}

impl Arena {
    /// Converts an address into a word offset inside this arena.
    fn offset_of(&self, address: NonNull<u8>, word_size: usize) -> Option<usize> {
        let delta = (address.as_ptr() as usize).checked_sub(self.memory.as_ptr() as usize)?;
        if delta % word_size != 0 {
            return None;
        }
        let offset = delta / word_size;
        (offset < self.words).then_some(offset)
    }

    /// Byte range of a used region starting at `address`.
    fn used_block(&self, address: NonNull<u8>, word_size: usize) -> Option<std::ops::Range<usize>> {
        let offset = self.offset_of(address, word_size)?;
        let region = self.regions.region(self.regions.lookup(offset)?);
        if region.is_hole() {
            return None;
        }
        Some(region.offset * word_size..region.end() * word_size)
    }
}

/// Hole-list allocator over a single simulated arena.
///
/// # Example
/// ```
/// use memory_manager::{BestFit, MemoryManager};
///
/// let mut mm = MemoryManager::new(8, Box::new(BestFit));
/// mm.initialize(100);
///
/// let a = mm.allocate(80).unwrap(); // 10 words
/// assert_eq!(mm.get_list().unwrap().to_string(), "[10, 90]");
///
/// mm.free(a);
/// assert_eq!(mm.get_list().unwrap().to_string(), "[0, 100]");
/// ```
pub struct MemoryManager {
    word_size: usize,
    policy: Box<dyn FitPolicy>,
    arena: Option<Arena>,
    stats: AllocationStats,
}

impl MemoryManager {
    /// Creates an engine with no arena.
    ///
    /// # Panics
    /// Panics if `word_size` is zero.
    pub fn new(word_size: usize, policy: Box<dyn FitPolicy>) -> Self {
        assert!(word_size > 0, "word size must be at least one byte");
        Self {
            word_size,
            policy,
            arena: None,
            stats: AllocationStats::default(),
        }
    }

    /// Creates a fresh arena of `size_in_words` words.
    ///
    /// Requests above [`MAX_ARENA_WORDS`] (or of zero words) are ignored and
    /// leave the engine as it was. Use [`try_initialize`](Self::try_initialize)
    /// to find out why.
    pub fn initialize(&mut self, size_in_words: usize) {
        if let Err(e) = self.try_initialize(size_in_words) {
            tracing::warn!("initialize({size_in_words}) ignored: {e}");
        }
    }

    /// Creates a fresh arena, discarding any previous one.
    pub fn try_initialize(&mut self, size_in_words: usize) -> Result<(), MemoryError> {
        if size_in_words > MAX_ARENA_WORDS {
            return Err(MemoryError::CapacityExceeded {
                requested_words: size_in_words,
                max_words: MAX_ARENA_WORDS,
            });
        }
        if size_in_words == 0 {
            return Err(MemoryError::EmptyArena);
        }

        self.shutdown();

        let bytes = self.word_size * size_in_words;
        self.arena = Some(Arena {
            memory: vec![0u8; bytes].into_boxed_slice(),
            words: size_in_words,
            regions: RegionList::with_hole(size_in_words),
        });
        self.stats = AllocationStats::for_arena(size_in_words);

        tracing::info!(
            "arena initialized: {size_in_words} words × {} B = {bytes} B, policy '{}'",
            self.word_size,
            self.policy.name(),
        );
        Ok(())
    }

    /// Releases the arena and all bookkeeping. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if let Some(arena) = self.arena.take() {
            tracing::info!(
                "arena released: {} words, {} regions",
                arena.words,
                arena.regions.len(),
            );
        }
        self.stats = AllocationStats::default();
    }

    /// Returns `true` while an arena exists.
    pub fn is_initialized(&self) -> bool {
        self.arena.is_some()
    }

    /// Allocates `size_in_bytes`, rounded up to whole words.
    ///
    /// Returns `None` if the engine is not initialized, the request is
    /// empty, or the active policy finds no hole.
    pub fn allocate(&mut self, size_in_bytes: usize) -> Option<NonNull<u8>> {
        match self.try_allocate(size_in_bytes) {
            Ok(address) => Some(address),
            Err(e) => {
                tracing::debug!("allocate({size_in_bytes}) failed: {e}");
                None
            }
        }
    }

    /// Allocates `size_in_bytes`, reporting why a request failed.
    ///
    /// Nothing is mutated on failure. A policy that names an offset which is
    /// not the start of a large-enough hole is treated as "no fit".
    pub fn try_allocate(&mut self, size_in_bytes: usize) -> Result<NonNull<u8>, MemoryError> {
        let word_size = self.word_size;
        let arena = self.arena.as_mut().ok_or(MemoryError::NotInitialized)?;
        if size_in_bytes == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }

        let words = size_in_bytes.div_ceil(word_size);
        let holes = arena.regions.holes();
        let target = self
            .policy
            .select(words, &holes)
            .and_then(|offset| arena.regions.lookup(offset))
            .filter(|&id| {
                let region = arena.regions.region(id);
                region.is_hole() && region.size >= words
            });

        let Some(id) = target else {
            self.stats.record_failed_allocation();
            return Err(MemoryError::NoFit {
                requested_words: words,
            });
        };

        let hole = *arena.regions.region(id);
        let split = hole.size != words;
        if split {
            arena.regions.split(id, words);
        } else {
            arena.regions.mark_used(id);
        }
        self.stats.record_allocation(words, split);

        tracing::debug!(
            "allocated {words} words at offset {} ({}{})",
            hole.offset,
            self.policy.name(),
            if split { ", split" } else { "" },
        );

        Ok(NonNull::from(&mut arena.memory[hole.offset * word_size]))
    }

    /// Returns the block starting at `address` to the arena.
    ///
    /// Addresses that do not start a used block are ignored.
    pub fn free(&mut self, address: NonNull<u8>) {
        if let Err(e) = self.try_free(address) {
            tracing::warn!("free ignored: {e}");
        }
    }

    /// Returns the block starting at `address`, reporting invalid targets.
    pub fn try_free(&mut self, address: NonNull<u8>) -> Result<(), MemoryError> {
        let word_size = self.word_size;
        let arena = self.arena.as_mut().ok_or(MemoryError::NotInitialized)?;

        let target = arena
            .offset_of(address, word_size)
            .and_then(|offset| arena.regions.lookup(offset));
        let Some(id) = target else {
            self.stats.record_ignored_free();
            return Err(MemoryError::UnknownAddress {
                address: address.as_ptr() as usize,
            });
        };

        let block = *arena.regions.region(id);
        if block.is_hole() {
            self.stats.record_ignored_free();
            return Err(MemoryError::DoubleFree {
                offset: block.offset,
            });
        }

        let (_, merges) = arena.regions.release(id);
        self.stats.record_deallocation(block.size, merges);
        tracing::debug!(
            "freed {} words at offset {} ({merges} merges)",
            block.size,
            block.offset,
        );
        Ok(())
    }

    /// Replaces the fit policy used by subsequent allocations.
    pub fn set_allocator(&mut self, policy: Box<dyn FitPolicy>) {
        tracing::debug!("fit policy: '{}' → '{}'", self.policy.name(), policy.name());
        self.policy = policy;
    }

    /// Name of the active fit policy.
    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Writes the hole list as `[offset, size] - ...` text to `path`.
    ///
    /// The file is created if absent and truncated otherwise.
    pub fn dump_memory_map(&self, path: impl AsRef<Path>) -> Result<(), MemoryError> {
        let holes = self.get_list().ok_or(MemoryError::NotInitialized)?;
        let path = path.as_ref();

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(holes.to_string().as_bytes())?;
        file.sync_all()?;

        tracing::debug!("memory map ({} holes) written to {}", holes.len(), path.display());
        Ok(())
    }

    /// Snapshot of all holes, or `None` before `initialize`.
    pub fn get_list(&self) -> Option<HoleList> {
        self.arena.as_ref().map(|a| a.regions.holes())
    }

    /// Occupancy bitmap, or `None` before `initialize`.
    pub fn get_bitmap(&self) -> Option<Bitmap> {
        self.arena
            .as_ref()
            .map(|a| Bitmap::from_regions(a.regions.iter(), a.words))
    }

    /// Bytes per word.
    pub fn word_size(&self) -> usize {
        self.word_size
    }

    /// Base address of the arena, or `None` before `initialize`.
    pub fn memory_start(&self) -> Option<NonNull<u8>> {
        self.arena
            .as_ref()
            .and_then(|a| NonNull::new(a.memory.as_ptr().cast_mut()))
    }

    /// Capacity of the arena in bytes (0 before `initialize`).
    pub fn memory_limit(&self) -> usize {
        self.arena.as_ref().map_or(0, |a| a.memory.len())
    }

    /// Capacity of the arena in words (0 before `initialize`).
    pub fn arena_words(&self) -> usize {
        self.arena.as_ref().map_or(0, |a| a.words)
    }

    /// Regions in ascending offset order (empty before `initialize`).
    pub fn regions(&self) -> Regions<'_> {
        self.arena
            .as_ref()
            .map_or_else(Regions::empty, |a| a.regions.iter())
    }

    /// Words currently handed out.
    pub fn used_words(&self) -> usize {
        self.stats.used_words
    }

    /// Words currently available.
    pub fn free_words(&self) -> usize {
        self.arena_words() - self.stats.used_words
    }

    /// The first largest hole, if any.
    pub fn largest_hole(&self) -> Option<Hole> {
        self.get_list().and_then(|holes| holes.largest())
    }

    /// Statistics for the current arena generation.
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Read access to the used block starting at `address`.
    pub fn block(&self, address: NonNull<u8>) -> Option<&[u8]> {
        let arena = self.arena.as_ref()?;
        let range = arena.used_block(address, self.word_size)?;
        Some(&arena.memory[range])
    }

    /// Write access to the used block starting at `address`.
    pub fn block_mut(&mut self, address: NonNull<u8>) -> Option<&mut [u8]> {
        let word_size = self.word_size;
        let arena = self.arena.as_mut()?;
        let range = arena.used_block(address, word_size)?;
        Some(&mut arena.memory[range])
    }

    /// Verifies that the regions tile the arena, that no two holes touch,
    /// and that the offset index matches the list.
    pub fn check_invariants(&self) -> Result<(), MemoryError> {
        match &self.arena {
            Some(arena) => arena
                .regions
                .check(arena.words)
                .map_err(MemoryError::Corruption),
            None => Ok(()),
        }
    }
}

impl Drop for MemoryManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("word_size", &self.word_size)
            .field("policy", &self.policy.name())
            .field("arena_words", &self.arena_words())
            .field("used_words", &self.used_words())
            .finish()
    }
}
