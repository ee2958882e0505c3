// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memsim compare` command: one trace, every fit policy.
//!
//! Prints failed allocations, hole count and fragmentation side by side so
//! the effect of the policy on the arena is visible at a glance.

use crate::trace;
use crate::TraceArgs;
use memory_manager::ManagerConfig;

const POLICIES: [&str; 2] = ["best-fit", "worst-fit"];

pub fn execute(config: ManagerConfig, trace_args: TraceArgs) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              memsim · Policy Comparison              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let ops = super::load_trace(&trace_args)?;
    println!(
        "  Arena: {} words × {} B, {} operations",
        config.size_in_words,
        config.word_size,
        ops.len(),
    );
    println!();

    println!(
        "  {:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>8}",
        "Policy", "Allocs", "Failed", "Holes", "Largest", "Free", "Frag %",
    );
    println!("  {}", "-".repeat(70));

    for name in POLICIES {
        let mut mm = ManagerConfig {
            policy: name.to_string(),
            ..config.clone()
        }
        .build()?;
        trace::replay(&mut mm, &ops)?;

        let holes = mm.get_list().unwrap_or_default();
        let free = holes.total_words();
        let largest = holes.largest().map_or(0, |h| h.size);
        let fragmentation = if free == 0 {
            0.0
        } else {
            (1.0 - largest as f64 / free as f64) * 100.0
        };
        let stats = mm.stats();

        println!(
            "  {:<12} {:>8} {:>8} {:>8} {:>10} {:>10} {:>7.1}",
            name,
            stats.total_allocations,
            stats.failed_allocations,
            holes.len(),
            largest,
            free,
            fragmentation,
        );
    }

    println!();
    Ok(())
}
