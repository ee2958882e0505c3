// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Best-fit hole selection.
//!
//! Picks the smallest hole that can hold the request, keeping large holes
//! intact for large requests at the cost of leaving small slivers behind.

use crate::policy::FitPolicy;
use crate::HoleList;

/// Smallest hole with `size >= requested`; the first one wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        Self
    }
}

impl FitPolicy for BestFit {
    fn name(&self) -> &str {
        "best-fit"
    }

    fn select(&self, requested_words: usize, holes: &HoleList) -> Option<usize> {
        best_fit(requested_words, holes)
    }
}

/// Returns the offset of the smallest hole that can hold `requested_words`.
pub fn best_fit(requested_words: usize, holes: &HoleList) -> Option<usize> {
    let mut chosen = None;
    let mut smallest = usize::MAX;

    for hole in holes {
        // Strictly smaller only, so earlier holes win ties.
        if hole.size >= requested_words && hole.size < smallest {
            chosen = Some(hole.offset);
            smallest = hole.size;
        }
    }
    chosen
}
