// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operation traces: parsing and replay against a [`MemoryManager`].
//!
//! A trace is a list of operations separated by commas or newlines:
//!
//! ```text
//! alloc:64        # allocate 64 bytes (allocation #0)
//! alloc:16        # allocation #1
//! free:0          # free allocation #0
//! policy:worst    # switch fit policy
//! ```

use memory_manager::{policy_by_name, MemoryManager};
use std::ptr::NonNull;

/// One step of a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Allocate this many bytes.
    Alloc(usize),
    /// Free the n-th allocation of the trace (0-based).
    Free(usize),
    /// Switch to the named fit policy.
    Policy(String),
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Alloc(bytes) => write!(f, "alloc:{bytes}"),
            Op::Free(n) => write!(f, "free:{n}"),
            Op::Policy(name) => write!(f, "policy:{name}"),
        }
    }
}

/// Parses a trace. Blank entries and `#` comments are skipped.
pub fn parse(source: &str) -> anyhow::Result<Vec<Op>> {
    source
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_op)
        .collect()
}

fn parse_op(token: &str) -> anyhow::Result<Op> {
    let (kind, arg) = token
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("malformed operation '{token}': expected kind:argument"))?;
    let arg = arg.trim();

    let number = || {
        arg.parse::<usize>()
            .map_err(|_| anyhow::anyhow!("operation '{token}' needs a non-negative integer"))
    };

    match kind.trim().to_lowercase().as_str() {
        "alloc" | "a" => Ok(Op::Alloc(number()?)),
        "free" | "f" => Ok(Op::Free(number()?)),
        "policy" | "p" => Ok(Op::Policy(arg.to_string())),
        other => anyhow::bail!("unknown operation '{other}'; expected alloc, free or policy"),
    }
}

/// What happened when one operation was applied.
#[derive(Debug, Clone)]
pub struct Step {
    pub op: Op,
    pub outcome: String,
}

/// What the trace knows about the n-th allocation.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Live(NonNull<u8>),
    Failed,
    Freed,
}

/// Applies `ops` in order and reports the outcome of each.
///
/// Failed allocations and invalid frees are outcomes, not errors; only a
/// reference to an allocation that was never requested, or an unknown
/// policy name, aborts the replay.
pub fn replay(mm: &mut MemoryManager, ops: &[Op]) -> anyhow::Result<Vec<Step>> {
    let mut allocations: Vec<Slot> = Vec::new();
    let mut steps = Vec::with_capacity(ops.len());

    for op in ops {
        let outcome = match op {
            Op::Alloc(bytes) => match mm.try_allocate(*bytes) {
                Ok(address) => {
                    allocations.push(Slot::Live(address));
                    format!("#{} at word {}", allocations.len() - 1, word_offset(mm, address))
                }
                Err(e) => {
                    allocations.push(Slot::Failed);
                    format!("#{} failed: {e}", allocations.len() - 1)
                }
            },
            Op::Free(n) => match allocations.get(*n).copied() {
                None => anyhow::bail!("{op} refers to an allocation that has not happened yet"),
                Some(Slot::Failed) => format!("skipped: allocation #{n} failed"),
                Some(Slot::Freed) => format!("ignored: allocation #{n} already freed"),
                Some(Slot::Live(address)) => match mm.try_free(address) {
                    Ok(()) => {
                        allocations[*n] = Slot::Freed;
                        "ok".to_string()
                    }
                    Err(e) => format!("ignored: {e}"),
                },
            },
            Op::Policy(name) => {
                mm.set_allocator(policy_by_name(name)?);
                format!("now {}", mm.policy_name())
            }
        };
        tracing::info!("{op}: {outcome}");
        steps.push(Step {
            op: op.clone(),
            outcome,
        });
    }
    Ok(steps)
}

fn word_offset(mm: &MemoryManager, address: NonNull<u8>) -> usize {
    let base = mm.memory_start().map_or(0, |p| p.as_ptr() as usize);
    (address.as_ptr() as usize - base) / mm.word_size()
}
