// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim run` command: replay a trace and show the resulting arena.

use crate::trace;
use crate::TraceArgs;
use memory_manager::{ManagerConfig, RegionState};
use std::path::PathBuf;

/// Arenas up to this many words get their bitmap printed bit by bit.
const MAX_PRINTED_BITS: usize = 256;

pub fn execute(config: ManagerConfig, trace_args: TraceArgs, dump: Option<PathBuf>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║                memsim · Trace Replay                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let ops = super::load_trace(&trace_args)?;
    let mut mm = config.build()?;

    println!(
        "  Arena: {} words × {} B = {} B, policy {}",
        config.size_in_words,
        config.word_size,
        mm.memory_limit(),
        mm.policy_name(),
    );
    println!();

    // ── Operations ─────────────────────────────────────────────
    let steps = trace::replay(&mut mm, &ops)?;
    println!("  {:<4} {:<22} {}", "#", "Operation", "Outcome");
    println!("  {}", "-".repeat(60));
    for (i, step) in steps.iter().enumerate() {
        println!("  {:<4} {:<22} {}", i, step.op.to_string(), step.outcome);
    }
    println!();

    // ── Layout ─────────────────────────────────────────────────
    println!("  {:<8} {:>8} {:>8}  {}", "Offset", "Words", "End", "State");
    println!("  {}", "-".repeat(40));
    for region in mm.regions() {
        let state = match region.state {
            RegionState::Hole => "hole",
            RegionState::Used => "used",
        };
        println!(
            "  {:<8} {:>8} {:>8}  {state}",
            region.offset,
            region.size,
            region.end(),
        );
    }
    println!();

    // ── Introspection ──────────────────────────────────────────
    if let Some(holes) = mm.get_list() {
        println!("  Holes:   {}", if holes.is_empty() { "(none)".to_string() } else { holes.to_string() });
        match holes.encode() {
            Ok(wire) => println!("  Encoded: {wire:?}"),
            Err(e) => println!("  Encoded: n/a ({e})"),
        }
    }
    if let Some(bitmap) = mm.get_bitmap() {
        if bitmap.words() <= MAX_PRINTED_BITS {
            println!("  Bitmap:  {}", bitmap.to_bit_string());
        }
        println!(
            "  Bitmap:  {} bytes, {} of {} words used",
            bitmap.as_bytes().len(),
            bitmap.count_used(),
            bitmap.words(),
        );
    }
    println!();
    println!("  {}", mm.stats().summary());

    if let Some(path) = dump {
        mm.dump_memory_map(&path)
            .map_err(|e| anyhow::anyhow!("cannot dump memory map to '{}': {e}", path.display()))?;
        println!("  Memory map written to {}", path.display());
    }

    mm.check_invariants()?;
    println!();
    Ok(())
}
