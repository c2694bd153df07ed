// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for git-mux.
//!
//! ```text
//! Config: GlobalConfig, PathsConfig, FlowConfig, DataConfig
//! Components: component name → remote url
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::git::branch::BranchType;
use crate::logging::LogLevel;

/// Component name → remote URL, sorted by name.
pub type Components = BTreeMap<String, String>;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file. No file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::WARN,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Settings for the multiplexed flow commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Remote that branches are published to.
    pub remote: String,
    /// Git executable (name on PATH or absolute path).
    pub git: String,
    /// Branch types that are multiplexed.
    pub branch_types: Vec<BranchType>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            git: "git".to_string(),
            branch_types: BranchType::ALL.to_vec(),
        }
    }
}

/// Shared branch-status repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Remote holding `branches.json`. Retire/revive/graft need it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Minimum seconds between two pulls of the shared repository.
    pub min_pull_interval_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: None,
            min_pull_interval_secs: 10,
        }
    }
}
