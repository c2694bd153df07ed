// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for git-mux.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. git-mux.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. GITMUX_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Example
//!
//! ```toml
//! [flow]
//! remote = "origin"
//!
//! [data]
//! url = "git@example.com:team/git-mux-data.git"
//!
//! [components]
//! api = "git@example.com:team/api.git"
//! web = "git@example.com:team/web.git"
//! ```

pub mod loader;
pub mod paths;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use paths::PathsConfig;
use types::{Components, DataConfig, FlowConfig, GlobalConfig};

/// Default configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "git-mux.toml";

/// Prefix for environment overrides (`GITMUX_FLOW_REMOTE=upstream`).
pub const ENV_PREFIX: &str = "GITMUX";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Working copy and shared-state locations.
    pub paths: PathsConfig,
    /// Flow command settings.
    pub flow: FlowConfig,
    /// Shared branch-status repository.
    pub data: DataConfig,
    /// Component name → remote URL.
    pub components: Components,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use git_mux::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("git-mux.toml")
    ///     .with_env_prefix("GITMUX")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Resolve all paths and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is needed but unknown, a
    /// component name is not a plain directory name, a URL is empty, or no
    /// branch type is muxed.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        self.paths.resolve()?;

        for (name, url) in &self.components {
            if !is_component_name(name) {
                return Err(ConfigError::InvalidValue {
                    section: "components".to_string(),
                    key: name.clone(),
                    message: "component names may only contain ASCII letters, digits, '-' and '_'"
                        .to_string(),
                }
                .into());
            }
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    section: "components".to_string(),
                    key: name.clone(),
                    message: "url must not be empty".to_string(),
                }
                .into());
            }
        }

        if self.flow.branch_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "flow".to_string(),
                key: "branch_types".to_string(),
                message: "at least one branch type must be muxed".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_paths_options(&mut options);
        self.format_flow_options(&mut options);
        self.format_data_options(&mut options);
        for (name, url) in &self.components {
            options.insert(format!("components.{name}"), url.clone());
        }

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_paths_options(&self, options: &mut BTreeMap<String, String>) {
        let fmt = |p: &Option<PathBuf>| {
            p.as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        };

        options.insert("paths.root".into(), fmt(&self.paths.root));
        options.insert("paths.repos".into(), fmt(&self.paths.repos));
        options.insert("paths.data".into(), fmt(&self.paths.data));
        options.insert("paths.lock".into(), fmt(&self.paths.lock));
    }

    fn format_flow_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("flow.remote".into(), self.flow.remote.clone());
        options.insert("flow.git".into(), self.flow.git.clone());
        options.insert(
            "flow.branch_types".into(),
            self.flow
                .branch_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    fn format_data_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "data.url".into(),
            self.data.url.clone().unwrap_or_default(),
        );
        options.insert(
            "data.min_pull_interval_secs".into(),
            self.data.min_pull_interval_secs.to_string(),
        );
    }
}

/// Component names become directory names under `paths.root`.
fn is_component_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
