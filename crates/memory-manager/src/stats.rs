// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.
//!
//! [`AllocationStats`] tracks what the engine has done since the last
//! `initialize`: request counts, split/merge activity and the occupancy
//! high-water mark. Comparing these across fit policies is the main way to
//! see how each one fragments the arena.

/// Cumulative statistics for one arena generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Size of the arena in words.
    pub arena_words: usize,
    /// Number of successful allocations.
    pub total_allocations: u64,
    /// Number of allocation requests that found no hole.
    pub failed_allocations: u64,
    /// Number of blocks returned to the arena.
    pub total_deallocations: u64,
    /// Number of `free` calls that matched no used block.
    pub ignored_frees: u64,
    /// Number of allocations that had to split a larger hole.
    pub splits: u64,
    /// Number of hole coalescing steps performed by `free`.
    pub merges: u64,
    /// Words currently in used regions.
    pub used_words: usize,
    /// Highest value `used_words` has reached.
    pub peak_used_words: usize,
}

impl AllocationStats {
    pub(crate) fn for_arena(arena_words: usize) -> Self {
        Self {
            arena_words,
            ..Self::default()
        }
    }

    /// Fraction of the arena currently in use, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` when no arena is initialized.
    pub fn utilisation(&self) -> f64 {
        if self.arena_words == 0 {
            return 0.0;
        }
        self.used_words as f64 / self.arena_words as f64
    }

    pub(crate) fn record_allocation(&mut self, words: usize, split: bool) {
        self.total_allocations += 1;
        if split {
            self.splits += 1;
        }
        self.used_words += words;
        if self.used_words > self.peak_used_words {
            self.peak_used_words = self.used_words;
        }
    }

    pub(crate) fn record_failed_allocation(&mut self) {
        self.failed_allocations += 1;
    }

    pub(crate) fn record_deallocation(&mut self, words: usize, merges: usize) {
        self.total_deallocations += 1;
        self.merges += merges as u64;
        self.used_words -= words;
    }

    pub(crate) fn record_ignored_free(&mut self) {
        self.ignored_frees += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {} ok, {} failed, {} splits; frees: {} ok, {} ignored, {} merges; \
             used {}/{} words ({:.0}%), peak {}",
            self.total_allocations,
            self.failed_allocations,
            self.splits,
            self.total_deallocations,
            self.ignored_frees,
            self.merges,
            self.used_words,
            self.arena_words,
            self.utilisation() * 100.0,
            self.peak_used_words,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = AllocationStats::default();
        assert_eq!(s.total_allocations, 0);
        assert_eq!(s.utilisation(), 0.0);
    }

    #[test]
    fn test_peak_tracking() {
        let mut s = AllocationStats::for_arena(100);
        s.record_allocation(30, true);
        s.record_allocation(20, true);
        s.record_deallocation(30, 1);
        assert_eq!(s.used_words, 20);
        assert_eq!(s.peak_used_words, 50); // Doesn't decrease.
        s.record_allocation(40, false);
        assert_eq!(s.peak_used_words, 60);
        assert_eq!(s.splits, 2);
    }

    #[test]
    fn test_utilisation() {
        let mut s = AllocationStats::for_arena(200);
        s.record_allocation(50, true);
        assert!((s.utilisation() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_summary() {
        let mut s = AllocationStats::for_arena(64);
        s.record_allocation(16, true);
        s.record_failed_allocation();
        s.record_ignored_free();
        let summary = s.summary();
        assert!(summary.contains("1 ok, 1 failed"));
        assert!(summary.contains("1 ignored"));
        assert!(summary.contains("16/64 words"));
    }

    #[test]
    fn test_serialize() {
        let mut s = AllocationStats::for_arena(8);
        s.record_allocation(2, true);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["arena_words"], 8);
        assert_eq!(json["used_words"], 2);
        assert_eq!(json["splits"], 1);
    }
}
