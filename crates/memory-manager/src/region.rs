// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The region list and its offset index.
//!
//! The arena is tiled by a doubly-linked list of [`Region`]s, each either a
//! hole or a used block. Nodes live in a slot table and are addressed by a
//! stable [`RegionId`], so splitting or merging only relinks the touched
//! neighbours; nothing else in the list has to be renumbered.
//!
//! ```text
//!  slot table:   [0: Used 0..10] [1: Hole 10..100] [2: <free>]
//!  list order:    head ─► 0 ◄─► 1
//!  offset index:  {0 → 0, 10 → 1}
//! ```
//!
//! The offset index is a `BTreeMap` keyed by word offset, so it iterates in
//! the same order as the list.

use crate::hole_list::{Hole, HoleList};
use std::collections::BTreeMap;

/// Whether a region is available for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionState {
    Hole,
    Used,
}

/// A contiguous span of the arena, measured in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Region {
    /// Word offset from the arena base.
    pub offset: usize,
    /// Number of words covered. Always positive.
    pub size: usize,
    pub state: RegionState,
}

impl Region {
    /// One past the last word of this region.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn is_hole(&self) -> bool {
        self.state == RegionState::Hole
    }
}

/// Stable handle to a node in the slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegionId(u32);

impl RegionId {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    region: Region,
    prev: Option<RegionId>,
    next: Option<RegionId>,
}

/// Ordered, gap-free list of regions covering `[0, total_words)`.
#[derive(Debug, Clone)]
pub(crate) struct RegionList {
    slots: Vec<Option<Node>>,
    free_slots: Vec<RegionId>,
    head: Option<RegionId>,
    len: usize,
    /// Start offset → node. Exactly one entry per live region.
    index: BTreeMap<usize, RegionId>,
}

impl RegionList {
    /// Creates a list holding a single hole that spans the whole arena.
    pub(crate) fn with_hole(total_words: usize) -> Self {
        let mut list = Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            head: None,
            len: 0,
            index: BTreeMap::new(),
        };
        let id = list.insert_node(Node {
            region: Region {
                offset: 0,
                size: total_words,
                state: RegionState::Hole,
            },
            prev: None,
            next: None,
        });
        list.head = Some(id);
        list.index.insert(0, id);
        list
    }

    /// Number of regions currently in the list.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Resolves a word offset to the region starting there, if any.
    pub(crate) fn lookup(&self, offset: usize) -> Option<RegionId> {
        self.index.get(&offset).copied()
    }

    pub(crate) fn region(&self, id: RegionId) -> &Region {
        &self.node(id).region
    }

    /// Marks a region as used. Only valid for a hole of exactly the right size.
    pub(crate) fn mark_used(&mut self, id: RegionId) {
        self.node_mut(id).region.state = RegionState::Used;
    }

    /// Carves a used region of `words` off the front of hole `id`.
    ///
    /// The hole keeps its handle; its offset advances by `words` and its size
    /// shrinks by the same amount. Returns the handle of the new used region.
    pub(crate) fn split(&mut self, id: RegionId, words: usize) -> RegionId {
        let (offset, prev) = {
            let node = self.node(id);
            debug_assert!(node.region.is_hole());
            debug_assert!(node.region.size > words && words > 0);
            (node.region.offset, node.prev)
        };

        let used = self.insert_node(Node {
            region: Region {
                offset,
                size: words,
                state: RegionState::Used,
            },
            prev,
            next: Some(id),
        });

        match prev {
            Some(p) => self.node_mut(p).next = Some(used),
            None => self.head = Some(used),
        }

        let hole = self.node_mut(id);
        hole.prev = Some(used);
        hole.region.offset += words;
        hole.region.size -= words;
        let hole_offset = hole.region.offset;

        self.index.insert(offset, used);
        self.index.insert(hole_offset, id);
        used
    }

    /// Turns region `id` into a hole and coalesces it with hole neighbours.
    ///
    /// Both neighbours are checked: a block freed between two holes folds all
    /// three into one. Returns the surviving handle and the number of merges.
    pub(crate) fn release(&mut self, id: RegionId) -> (RegionId, usize) {
        self.node_mut(id).region.state = RegionState::Hole;

        let mut merges = 0;
        if self.absorb_next(id) {
            merges += 1;
        }

        let mut survivor = id;
        if let Some(prev) = self.node(id).prev {
            if self.absorb_next(prev) {
                survivor = prev;
                merges += 1;
            }
        }
        (survivor, merges)
    }

    /// Iterates over regions in ascending offset order.
    pub(crate) fn iter(&self) -> Regions<'_> {
        Regions {
            list: Some(self),
            cursor: self.head,
        }
    }

    /// Snapshot of every hole in list order.
    pub(crate) fn holes(&self) -> HoleList {
        self.iter()
            .filter(|r| r.is_hole())
            .map(|r| Hole {
                offset: r.offset,
                size: r.size,
            })
            .collect()
    }

    /// Verifies tiling, coalescing, and index bijection.
    pub(crate) fn check(&self, total_words: usize) -> Result<(), String> {
        let mut expected_offset = 0;
        let mut previous_was_hole = false;
        let mut count = 0;

        for region in self.iter() {
            if region.offset != expected_offset {
                return Err(format!(
                    "gap or overlap: region starts at {} but previous ended at {expected_offset}",
                    region.offset
                ));
            }
            if region.size == 0 {
                return Err(format!("zero-sized region at offset {}", region.offset));
            }
            if region.is_hole() && previous_was_hole {
                return Err(format!("adjacent holes at offset {}", region.offset));
            }
            match self.lookup(region.offset) {
                Some(id) if self.region(id) == region => {}
                _ => {
                    return Err(format!(
                        "offset index does not resolve {} to its region",
                        region.offset
                    ))
                }
            }
            previous_was_hole = region.is_hole();
            expected_offset = region.end();
            count += 1;
        }

        if expected_offset != total_words {
            return Err(format!(
                "regions end at {expected_offset}, arena has {total_words} words"
            ));
        }
        if count != self.len || self.index.len() != self.len {
            return Err(format!(
                "{count} regions linked, {} counted, {} indexed",
                self.len,
                self.index.len()
            ));
        }
        Ok(())
    }

    /// Folds `id`'s successor into `id` when both are holes.
    fn absorb_next(&mut self, id: RegionId) -> bool {
        let Some(next) = self.node(id).next else {
            return false;
        };
        if !self.node(id).region.is_hole() || !self.node(next).region.is_hole() {
            return false;
        }

        let removed = self.remove_node(next);
        self.index.remove(&removed.region.offset);
        if let Some(after) = removed.next {
            self.node_mut(after).prev = Some(id);
        }

        let node = self.node_mut(id);
        node.region.size += removed.region.size;
        node.next = removed.next;
        true
    }

    fn insert_node(&mut self, node: Node) -> RegionId {
        self.len += 1;
        match self.free_slots.pop() {
            Some(id) => {
                self.slots[id.slot()] = Some(node);
                id
            }
            None => {
                let id = RegionId(self.slots.len() as u32);
                self.slots.push(Some(node));
                id
            }
        }
    }

    fn remove_node(&mut self, id: RegionId) -> Node {
        let node = self.slots[id.slot()]
            .take()
            .expect("region handle already released");
        self.free_slots.push(id);
        self.len -= 1;
        node
    }

    fn node(&self, id: RegionId) -> &Node {
        self.slots[id.slot()]
            .as_ref()
            .expect("stale region handle")
    }

    fn node_mut(&mut self, id: RegionId) -> &mut Node {
        self.slots[id.slot()]
            .as_mut()
            .expect("stale region handle")
    }
}

/// Iterator over the regions of a [`RegionList`], in offset order.
pub struct Regions<'a> {
    list: Option<&'a RegionList>,
    cursor: Option<RegionId>,
}

impl Regions<'_> {
    /// An iterator that yields nothing, for a manager without an arena.
    pub(crate) fn empty() -> Self {
        Self {
            list: None,
            cursor: None,
        }
    }
}

impl<'a> Iterator for Regions<'a> {
    type Item = &'a Region;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list?.node(self.cursor?);
        self.cursor = node.next;
        Some(&node.region)
    }
}
