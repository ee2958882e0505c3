// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`FitPolicy`] trait and the built-in hole-selection policies.

pub mod best_fit;
pub mod worst_fit;

use crate::HoleList;

/// Chooses which hole satisfies an allocation request.
///
/// Policies are pure functions of the hole snapshot: no engine state, no
/// I/O. They return the word offset of the chosen hole, or `None` when no
/// hole is large enough.
///
/// Any closure `Fn(usize, &HoleList) -> Option<usize>` is also a policy:
///
/// ```
/// use memory_manager::{FitPolicy, HoleList};
///
/// let first_fit = |words: usize, holes: &HoleList| {
///     holes.iter().find(|h| h.size >= words).map(|h| h.offset)
/// };
/// let holes = HoleList::from_pairs(&[(0, 2), (5, 8)]);
/// assert_eq!(first_fit.select(4, &holes), Some(5));
/// ```
pub trait FitPolicy {
    /// Human-readable name of this policy.
    fn name(&self) -> &str;

    /// Picks a hole of at least `requested_words` words.
    fn select(&self, requested_words: usize, holes: &HoleList) -> Option<usize>;
}

impl<F> FitPolicy for F
where
    F: Fn(usize, &HoleList) -> Option<usize>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn select(&self, requested_words: usize, holes: &HoleList) -> Option<usize> {
        self(requested_words, holes)
    }
}
