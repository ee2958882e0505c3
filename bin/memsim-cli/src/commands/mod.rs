// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod compare;
pub mod config;
pub mod run;

use crate::trace::{self, Op};
use crate::{ArenaArgs, TraceArgs};
use memory_manager::ManagerConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("memory_manager={level},memsim={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Picks the config file when given, otherwise the command-line arena shape.
pub fn resolve_config(path: Option<&Path>, args: &ArenaArgs) -> anyhow::Result<ManagerConfig> {
    let config = match path {
        Some(path) => ManagerConfig::from_file(path)?,
        None => ManagerConfig {
            word_size: args.word_size,
            size_in_words: args.words,
            policy: args.policy.clone(),
        },
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("unusable arena configuration: {e}"))?;
    Ok(config)
}

/// Reads the operation trace from `--ops` or `--ops-file`.
pub fn load_trace(args: &TraceArgs) -> anyhow::Result<Vec<Op>> {
    let source = match (&args.ops, &args.ops_file) {
        (Some(ops), _) => ops.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("cannot read trace '{}': {e}", path.display())
        })?,
        (None, None) => anyhow::bail!("no operations given; pass --ops or --ops-file"),
    };
    trace::parse(&source)
}
