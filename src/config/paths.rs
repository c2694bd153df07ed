// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! ~/.git-mux/          (root)
//!   repos/
//!     api/             one working copy per component
//!     web/
//! ~/.git-mux-data/     (data: clone of the shared status repo)
//! ~/.git-mux-lock      (lock: machine-wide process lock)
//! ```
//!
//! All paths are optional. Relative paths resolve against `root`, and `root`
//! itself defaults to a directory under the user's home.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, MuxResult};

/// Name shared by the default root, data and lock locations.
pub const APP_DIR_NAME: &str = ".git-mux";

/// Working copy and shared-state locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Tool root (default: `~/.git-mux`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Component working copies (default: `root/repos`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repos: Option<PathBuf>,
    /// Local clone of the shared data repository (default: `~/.git-mux-data`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    /// Process lock file (default: `~/.git-mux-lock`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolve relative paths and fill in defaults using the user's home.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HomeNotFound` if a default is needed and the home
    /// directory cannot be determined.
    pub fn resolve(&mut self) -> MuxResult<()> {
        if self.root.is_some() && self.data.is_some() && self.lock.is_some() {
            self.resolve_with_home(Path::new(""));
            return Ok(());
        }
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        self.resolve_with_home(&home);
        Ok(())
    }

    /// Resolve against an explicit home directory.
    pub fn resolve_with_home(&mut self, home: &Path) {
        let root = self
            .root
            .clone()
            .unwrap_or_else(|| home.join(APP_DIR_NAME));
        self.root = Some(root.clone());

        let resolve = |path: &mut Option<PathBuf>, default: PathBuf| match path {
            Some(p) if p.is_relative() => {
                *path = Some(root.join(p.clone()));
            }
            None => {
                *path = Some(default);
            }
            _ => {}
        };

        resolve(&mut self.repos, root.join("repos"));
        resolve(&mut self.data, home.join(format!("{APP_DIR_NAME}-data")));
        resolve(&mut self.lock, home.join(format!("{APP_DIR_NAME}-lock")));
    }

    /// Directory holding one working copy per component.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if paths were never resolved.
    pub fn repos(&self) -> MuxResult<&Path> {
        Self::required(self.repos.as_deref(), "repos")
    }

    /// Local clone of the shared data repository.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if paths were never resolved.
    pub fn data(&self) -> MuxResult<&Path> {
        Self::required(self.data.as_deref(), "data")
    }

    /// Process lock file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if paths were never resolved.
    pub fn lock(&self) -> MuxResult<&Path> {
        Self::required(self.lock.as_deref(), "lock")
    }

    fn required<'a>(path: Option<&'a Path>, key: &str) -> MuxResult<&'a Path> {
        path.ok_or_else(|| {
            ConfigError::MissingKey {
                section: "paths".to_string(),
                key: key.to_string(),
            }
            .into()
        })
    }
}
