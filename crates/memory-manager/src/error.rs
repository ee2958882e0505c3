// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the allocator engine.

/// Errors reported by the strict (`try_*`) surface of the
/// [`MemoryManager`](crate::MemoryManager) and by the encoders.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// `initialize` was asked for more words than the 16-bit encodings can address.
    #[error("arena of {requested_words} words exceeds the {max_words}-word limit")]
    CapacityExceeded {
        requested_words: usize,
        max_words: usize,
    },

    /// `initialize` was asked for a zero-word arena.
    #[error("cannot initialize an empty arena")]
    EmptyArena,

    /// The active fit policy found no hole large enough.
    #[error("no hole can hold {requested_words} words")]
    NoFit { requested_words: usize },

    /// Attempted to allocate zero bytes.
    #[error("cannot allocate zero-sized block")]
    ZeroSizedAllocation,

    /// The address passed to `free` is not the start of any region.
    #[error("address {address:#x} is not the start of a region in this arena")]
    UnknownAddress { address: usize },

    /// The address passed to `free` names a region that is already a hole.
    #[error("block at word offset {offset} is already free")]
    DoubleFree { offset: usize },

    /// The operation needs an arena but `initialize` has not succeeded.
    #[error("memory manager is not initialized")]
    NotInitialized,

    /// A hole offset or size does not fit in the 16-bit hole-list encoding.
    #[error("value {value} does not fit in a 16-bit hole-list field")]
    EncodingOverflow { value: usize },

    /// An encoded hole list or bitmap is truncated or inconsistent.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The region list or offset index no longer describes the arena.
    #[error("region list integrity error: {0}")]
    Corruption(String),

    /// Writing the memory map failed.
    #[error("failed to write memory map: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
