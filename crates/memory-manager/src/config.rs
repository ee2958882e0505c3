// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! word_size = 8
//! size_in_words = 1024
//! policy = "best-fit"
//! ```

use crate::{BestFit, FitPolicy, MemoryError, MemoryManager, WorstFit, MAX_ARENA_WORDS};
use std::path::Path;

/// Configuration for a [`MemoryManager`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManagerConfig {
    /// Bytes per word.
    pub word_size: usize,
    /// Arena size in words (at most 65536).
    pub size_in_words: usize,
    /// Fit policy name: `"best-fit"` or `"worst-fit"`.
    #[serde(default = "default_policy")]
    pub policy: String,
}

fn default_policy() -> String {
    "best-fit".to_string()
}

impl ManagerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MemoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::InvalidConfig(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, MemoryError> {
        toml::from_str(toml_str)
            .map_err(|e| MemoryError::InvalidConfig(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, MemoryError> {
        toml::to_string_pretty(self)
            .map_err(|e| MemoryError::InvalidConfig(format!("TOML serialise error: {e}")))
    }

    /// Checks ranges before anything is allocated.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.word_size == 0 {
            return Err(MemoryError::InvalidConfig("word_size must be positive".into()));
        }
        if self.size_in_words == 0 || self.size_in_words > MAX_ARENA_WORDS {
            return Err(MemoryError::InvalidConfig(format!(
                "size_in_words must be in 1..={MAX_ARENA_WORDS}, got {}",
                self.size_in_words
            )));
        }
        self.create_policy().map(|_| ())
    }

    /// Creates the fit policy named by this config.
    pub fn create_policy(&self) -> Result<Box<dyn FitPolicy>, MemoryError> {
        policy_by_name(&self.policy)
    }

    /// Builds and initializes a [`MemoryManager`] from this config.
    pub fn build(&self) -> Result<MemoryManager, MemoryError> {
        self.validate()?;
        let mut manager = MemoryManager::new(self.word_size, self.create_policy()?);
        manager.try_initialize(self.size_in_words)?;
        Ok(manager)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            word_size: 8,
            size_in_words: 1024,
            policy: default_policy(),
        }
    }
}

/// Resolves a policy name (`best-fit`/`best`, `worst-fit`/`worst`).
pub fn policy_by_name(name: &str) -> Result<Box<dyn FitPolicy>, MemoryError> {
    match name.to_lowercase().as_str() {
        "best-fit" | "best" => Ok(Box::new(BestFit::new())),
        "worst-fit" | "worst" => Ok(Box::new(WorstFit::new())),
        other => Err(MemoryError::InvalidConfig(format!(
            "unknown policy '{other}'; expected 'best-fit' or 'worst-fit'"
        ))),
    }
}
