// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memsim
//!
//! Command-line harness for the `memory-manager` allocator engine.
//!
//! ## Usage
//! ```bash
//! # Replay an allocation trace and print the resulting layout
//! memsim run --words 100 --word-size 8 --ops "alloc:80,alloc:40,free:0,alloc:16"
//!
//! # Same trace under every policy, side by side
//! memsim compare --words 100 --ops-file trace.txt
//!
//! # Print the effective configuration
//! memsim --config memsim.toml config
//! ```

mod commands;
mod trace;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "memsim",
    about = "Best-fit / worst-fit allocator simulator over a single arena",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (overrides arena arguments).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Arena shape shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ArenaArgs {
    /// Bytes per word.
    #[arg(long, default_value_t = 8)]
    word_size: usize,

    /// Arena size in words (at most 65536).
    #[arg(short, long, default_value_t = 1024)]
    words: usize,

    /// Fit policy: best-fit or worst-fit.
    #[arg(short, long, default_value = "best-fit")]
    policy: String,
}

/// Where the operation trace comes from.
#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Comma-separated operations, e.g. "alloc:64,alloc:16,free:0,policy:worst".
    #[arg(long, conflicts_with = "ops_file")]
    ops: Option<String>,

    /// File with one operation per line (`#` starts a comment).
    #[arg(long)]
    ops_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trace and print layout, hole list, bitmap and statistics.
    Run {
        #[command(flatten)]
        arena: ArenaArgs,

        #[command(flatten)]
        trace: TraceArgs,

        /// Write the final hole list to this file.
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Replay the same trace under each fit policy and compare the results.
    Compare {
        #[command(flatten)]
        arena: ArenaArgs,

        #[command(flatten)]
        trace: TraceArgs,
    },

    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        arena: ArenaArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { arena, trace, dump } => {
            let config = commands::resolve_config(cli.config.as_deref(), &arena)?;
            commands::run::execute(config, trace, dump)
        }
        Commands::Compare { arena, trace } => {
            let config = commands::resolve_config(cli.config.as_deref(), &arena)?;
            commands::compare::execute(config, trace)
        }
        Commands::Config { arena } => {
            let config = commands::resolve_config(cli.config.as_deref(), &arena)?;
            commands::config::execute(config)
        }
    }
}
