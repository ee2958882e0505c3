// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Hole-list snapshots.
//!
//! A [`HoleList`] is the input to every [`FitPolicy`](crate::FitPolicy) and
//! the content of a memory-map dump. Its wire form is a stream of 16-bit
//! values:
//!
//! ```text
//! [count, offset0, size0, offset1, size1, ...]
//! ```
//!
//! and its text form is `[offset, size] - [offset, size] - ...`.

use crate::MemoryError;
use std::fmt;

/// A free span of the arena, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Hole {
    pub offset: usize,
    pub size: usize,
}

/// Every hole of the arena, in region-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct HoleList {
    holes: Vec<Hole>,
}

impl HoleList {
    /// Builds a list from `(offset, size)` pairs.
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        pairs
            .iter()
            .map(|&(offset, size)| Hole { offset, size })
            .collect()
    }

    /// Number of holes.
    pub fn len(&self) -> usize {
        self.holes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hole> {
        self.holes.iter()
    }

    /// Sum of all hole sizes, in words.
    pub fn total_words(&self) -> usize {
        self.holes.iter().map(|h| h.size).sum()
    }

    /// The first hole of maximal size, if any.
    pub fn largest(&self) -> Option<Hole> {
        self.holes
            .iter()
            .copied()
            .fold(None, |best: Option<Hole>, h| match best {
                Some(b) if b.size >= h.size => Some(b),
                _ => Some(h),
            })
    }

    /// Encodes the list as `[count, offset, size, ...]` 16-bit values.
    ///
    /// Fails with [`MemoryError::EncodingOverflow`] when a value does not fit
    /// in 16 bits, which only happens for a single hole spanning a full
    /// 65536-word arena.
    pub fn encode(&self) -> Result<Vec<u16>, MemoryError> {
        let mut out = Vec::with_capacity(1 + self.holes.len() * 2);
        out.push(to_u16(self.holes.len())?);
        for hole in &self.holes {
            out.push(to_u16(hole.offset)?);
            out.push(to_u16(hole.size)?);
        }
        Ok(out)
    }

    /// Parses the 16-bit wire form produced by [`encode`](Self::encode).
    pub fn decode(words: &[u16]) -> Result<Self, MemoryError> {
        let (&count, pairs) = words
            .split_first()
            .ok_or_else(|| MemoryError::MalformedEncoding("empty hole list".into()))?;

        let count = count as usize;
        if pairs.len() != count * 2 {
            return Err(MemoryError::MalformedEncoding(format!(
                "header announces {count} holes but {} values follow",
                pairs.len()
            )));
        }

        Ok(pairs
            .chunks_exact(2)
            .map(|pair| Hole {
                offset: pair[0] as usize,
                size: pair[1] as usize,
            })
            .collect())
    }
}

fn to_u16(value: usize) -> Result<u16, MemoryError> {
    u16::try_from(value).map_err(|_| MemoryError::EncodingOverflow { value })
}

impl FromIterator<Hole> for HoleList {
    fn from_iter<I: IntoIterator<Item = Hole>>(iter: I) -> Self {
        Self {
            holes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HoleList {
    type Item = &'a Hole;
    type IntoIter = std::slice::Iter<'a, Hole>;

    fn into_iter(self) -> Self::IntoIter {
        self.holes.iter()
    }
}

/// Renders the dump text: `[offset, size] - [offset, size]`.
impl fmt::Display for HoleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hole) in self.holes.iter().enumerate() {
            if i > 0 {
                f.write_str(" - ")?;
            }
            write!(f, "[{}, {}]", hole.offset, hole.size)?;
        }
        Ok(())
    }
}
