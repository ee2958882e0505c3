// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worst-fit hole selection.
//!
//! Carves every request out of the largest hole, so the leftover is as
//! large as possible and more likely to be useful later.

use crate::policy::FitPolicy;
use crate::HoleList;

/// Largest hole with `size >= requested`; the first one wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstFit;

impl WorstFit {
    pub fn new() -> Self {
        Self
    }
}

impl FitPolicy for WorstFit {
    fn name(&self) -> &str {
        "worst-fit"
    }

    fn select(&self, requested_words: usize, holes: &HoleList) -> Option<usize> {
        worst_fit(requested_words, holes)
    }
}

/// Returns the offset of the largest hole that can hold `requested_words`.
pub fn worst_fit(requested_words: usize, holes: &HoleList) -> Option<usize> {
    let mut chosen = None;
    let mut largest = 0;

    for hole in holes {
        // Strictly larger only, so earlier holes win ties.
        if hole.size >= requested_words && hole.size > largest {
            chosen = Some(hole.offset);
            largest = hole.size;
        }
    }
    chosen
}
