// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Occupancy bitmap: one bit per word, `1` = used, `0` = free.
//!
//! # Wire Format
//! ```text
//! byte 0..2   packed length N in bytes, u16 little-endian
//! byte 2..    N bytes; byte i bit j (LSB = 0) is word 8*i + j
//! ```
//!
//! Read as a bit string, the highest word comes first and word 0 is the
//! rightmost bit of the first map byte. Padding bits in the last byte are 0.

use crate::region::Region;
use crate::MemoryError;

const HEADER_LEN: usize = 2;

/// Packed occupancy map of an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Header followed by the packed map.
    bytes: Vec<u8>,
    words: usize,
}

impl Bitmap {
    /// Packs the occupancy of `regions`, which must tile `[0, words)`.
    pub(crate) fn from_regions<'a>(regions: impl Iterator<Item = &'a Region>, words: usize) -> Self {
        let map_len = words.div_ceil(8);
        let mut bytes = vec![0u8; HEADER_LEN + map_len];
        bytes[..HEADER_LEN].copy_from_slice(&(map_len as u16).to_le_bytes());

        for region in regions.filter(|r| !r.is_hole()) {
            for word in region.offset..region.end() {
                bytes[HEADER_LEN + word / 8] |= 1 << (word % 8);
            }
        }
        Self { bytes, words }
    }

    /// Parses a wire-format bitmap describing an arena of `words` words.
    pub fn from_bytes(bytes: &[u8], words: usize) -> Result<Self, MemoryError> {
        if bytes.len() < HEADER_LEN {
            return Err(MemoryError::MalformedEncoding(
                "bitmap shorter than its header".into(),
            ));
        }
        let announced = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        let expected = words.div_ceil(8);
        if announced != expected || bytes.len() - HEADER_LEN != expected {
            return Err(MemoryError::MalformedEncoding(format!(
                "bitmap for {words} words needs {expected} map bytes, header says {announced}, got {}",
                bytes.len() - HEADER_LEN
            )));
        }
        let tail_bits = words % 8;
        if tail_bits != 0 && bytes[bytes.len() - 1] >> tail_bits != 0 {
            return Err(MemoryError::MalformedEncoding(format!(
                "bitmap for {words} words has padding bits set in its last byte"
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
            words,
        })
    }

    /// The full wire form, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The packed map without its header.
    pub fn map(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Number of words the map describes.
    pub fn words(&self) -> usize {
        self.words
    }

    /// Whether `word` is occupied. Words past the arena read as free.
    pub fn is_used(&self, word: usize) -> bool {
        word < self.words && self.map()[word / 8] & (1 << (word % 8)) != 0
    }

    /// Number of occupied words.
    pub fn count_used(&self) -> usize {
        self.map().iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Per-word occupancy in ascending word order.
    pub fn occupancy(&self) -> Vec<bool> {
        (0..self.words).map(|w| self.is_used(w)).collect()
    }

    /// Bit string with the highest word first, e.g. `"0011"` for words 0..2 used.
    pub fn to_bit_string(&self) -> String {
        (0..self.words)
            .rev()
            .map(|w| if self.is_used(w) { '1' } else { '0' })
            .collect()
    }
}
