// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared branch-status store.
//!
//! ```text
//! data.url --clone/pull--> ~/.git-mux-data/branches.json
//!                                |
//!                 load --> BranchDocument --> mutate
//!                                |
//!            save: write (atomic) --> add --> commit --> push
//! ```
//!
//! Callers hold the process lock from `sync` through `save`.
//!
//! ```json
//! [
//!   { "name": "feature/checkout-icon", "status": "active", "components": ["api", "web"] },
//!   { "name": "feature/old-nav", "status": "retired", "components": ["web"] }
//! ]
//! ```


use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::types::DataConfig;
use crate::error::{GitError, MuxResult, StoreError};
use crate::git::GitBackend;

/// Document file inside the data repository.
pub const DOCUMENT_FILE: &str = "branches.json";

/// Lifecycle flag of a shared branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    #[default]
    Active,
    Retired,
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Retired => "retired",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    #[serde(default)]
    pub status: BranchStatus,
    #[serde(default)]
    pub components: BTreeSet<String>,
}

/// All shared branch records, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchDocument {
    records: Vec<BranchRecord>,
}

impl BranchDocument {
    #[must_use]
    pub fn records(&self) -> &[BranchRecord] {
        &self.records
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BranchRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn status_of(&self, name: &str) -> Option<BranchStatus> {
        self.find(name).map(|r| r.status)
    }

    #[must_use]
    pub fn is_retired(&self, name: &str) -> bool {
        self.status_of(name) == Some(BranchStatus::Retired)
    }

    /// Record for `name`, created active if missing.
    pub fn upsert(&mut self, name: &str) -> &mut BranchRecord {
        let index = match self.records.binary_search_by(|r| r.name.as_str().cmp(name)) {
            Ok(i) => i,
            Err(i) => {
                self.records.insert(
                    i,
                    BranchRecord {
                        name: name.to_string(),
                        status: BranchStatus::Active,
                        components: BTreeSet::new(),
                    },
                );
                i
            }
        };
        &mut self.records[index]
    }

    fn normalize(&mut self) {
        self.records.sort_by(|a, b| a.name.cmp(&b.name));
        self.records.dedup_by(|a, b| a.name == b.name);
    }
}

/// Local clone of the shared data repository.
pub struct DataStore {
    url: Option<String>,
    dir: PathBuf,
    remote: String,
    git: Arc<dyn GitBackend>,
    min_pull_interval: Duration,
    last_pull: Option<Instant>,
}

impl DataStore {
    #[must_use]
    pub fn new(
        config: &DataConfig,
        dir: impl Into<PathBuf>,
        remote: impl Into<String>,
        git: Arc<dyn GitBackend>,
    ) -> Self {
        Self {
            url: config.url.clone(),
            dir: dir.into(),
            remote: remote.into(),
            git,
            min_pull_interval: Duration::from_secs(config.min_pull_interval_secs),
            last_pull: None,
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    /// Clone the data repository, or pull it unless pulled recently.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotConfigured` without `data.url`, or a
    /// `GitError` if clone or pull fails.
    pub fn sync(&mut self) -> MuxResult<()> {
        let url = self.url.as_deref().ok_or(StoreError::NotConfigured)?;

        if !self.git.is_working_copy(&self.dir) {
            info!(%url, dir = %self.dir.display(), "cloning shared data repository");
            if let Some(parent) = self.dir.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.git.clone_repo(url, &self.dir)?;
            self.last_pull = Some(Instant::now());
            return Ok(());
        }

        if self
            .last_pull
            .is_some_and(|at| at.elapsed() < self.min_pull_interval)
        {
            debug!("shared data pulled recently, skipping");
            return Ok(());
        }

        let output = self.git.pull(&self.dir, &["--ff-only", "-q"])?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: "git pull --ff-only".to_string(),
                message: output.failure_message("pull failed"),
            }
            .into());
        }
        self.last_pull = Some(Instant::now());
        Ok(())
    }

    /// Read the document; a missing file is an empty document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` for malformed JSON.
    pub fn load(&self) -> MuxResult<BranchDocument> {
        let path = self.document_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BranchDocument::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BranchDocument::default());
        }
        let mut document: BranchDocument =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })?;
        document.normalize();
        Ok(document)
    }

    /// Write, commit and push the document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the file cannot be written, or a
    /// `GitError` if commit or push fails.
    pub fn save(&self, document: &BranchDocument, message: &str) -> MuxResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;
        self.write_atomic(&self.document_path(), &json)?;

        self.git.add(&self.dir, &[DOCUMENT_FILE])?;
        self.git.commit(&self.dir, message)?;
        let output = self.git.push(&self.dir, &[&self.remote, "HEAD"])?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: format!("git push {} HEAD", self.remote),
                message: output.failure_message("push failed"),
            }
            .into());
        }
        info!(%message, "shared branch data published");
        Ok(())
    }

    fn write_atomic(&self, path: &Path, content: &str) -> MuxResult<()> {
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut file = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.write_all(b"\n").map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
