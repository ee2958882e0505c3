// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! A word-granular allocator simulated over a single pre-reserved arena,
//! for studying classic dynamic-storage-allocation policies.
//!
//! # Key Components
//!
//! - [`MemoryManager`] - the engine: owns the arena, serves
//!   `allocate`/`free`, splits holes and coalesces freed blocks.
//! - [`FitPolicy`] - pluggable hole selection, with [`BestFit`] and
//!   [`WorstFit`] built in.
//! - [`HoleList`] / [`Bitmap`] - introspection snapshots, also the
//!   formats used for dumps.
//! - [`ManagerConfig`] - TOML-backed configuration.
//! - [`AllocationStats`] - per-arena counters (splits, merges, peak usage).
//!
//! # Layout Model
//!
//! ```text
//!  word:  0         10   14                 34            100
//!         ├── Used ──┤Hole├────── Used ──────┤──── Hole ────┤
//! ```
//!
//! The arena is always tiled by regions in offset order, and no two holes
//! are ever adjacent. An offset index resolves a block address back to its
//! region in logarithmic time.
//!
//! # Example
//! ```
//! use memory_manager::{MemoryManager, WorstFit};
//!
//! let mut mm = MemoryManager::new(4, Box::new(WorstFit));
//! mm.initialize(64);
//!
//! let a = mm.allocate(10).unwrap();   // 3 words
//! let b = mm.allocate(16).unwrap();   // 4 words
//! mm.free(a);
//!
//! assert_eq!(mm.get_list().unwrap().to_string(), "[0, 3] - [7, 57]");
//! # let _ = b;
//! ```

mod bitmap;
mod config;
mod error;
mod hole_list;
mod manager;
pub mod policy;
mod region;
mod stats;

pub use bitmap::Bitmap;
pub use config::{policy_by_name, ManagerConfig};
pub use error::MemoryError;
pub use hole_list::{Hole, HoleList};
pub use manager::{MemoryManager, MAX_ARENA_WORDS};
pub use policy::best_fit::{best_fit, BestFit};
pub use policy::worst_fit::{worst_fit, WorstFit};
pub use policy::FitPolicy;
pub use region::{Region, RegionState, Regions};
pub use stats::AllocationStats;
