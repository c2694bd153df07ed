// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Components and their on-disk working copies.
//!
//! ```text
//! get(component)
//!   |
//!   +-- working copy present --> WorkingCopy (no refresh)
//!   |
//!   +-- non-empty foreign directory --> GitError::SetupFailed (left intact)
//!   |
//!   '-- absent --> clone --> flow init -d --> track remote
//!                  type/* branches --> scratch --> WorkingCopy
//!                  (any failure: remove dir, GitError::SetupFailed)
//! ```
//!
//! Every working copy rests on the local `scratch` branch between
//! operations. [`ScratchGuard`] restores it on every exit path of a
//! component's turn. A restore that fails is an error for that turn.


use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::types::Components;
use crate::error::{GitError, MuxResult};
use crate::git::branch::SCRATCH;
use crate::git::{GitBackend, ToolOutput};

/// One independently hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component {
    name: String,
    url: String,
}

impl Component {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build the component list, sorted by name.
#[must_use]
pub fn from_config(components: &Components) -> Vec<Component> {
    let mut list: Vec<_> = components
        .iter()
        .map(|(name, url)| Component::new(name, url))
        .collect();
    list.sort();
    list
}

/// Removes a partially materialized working copy unless kept.
struct PartialCloneGuard {
    path: PathBuf,
    keep: bool,
}

impl PartialCloneGuard {
    const fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    const fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for PartialCloneGuard {
    fn drop(&mut self) {
        if !self.keep
            && self.path.exists()
            && let Err(e) = std::fs::remove_dir_all(&self.path)
        {
            warn!(path = %self.path.display(), error = %e, "failed to remove partial clone");
        }
    }
}

fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        })
        .clone()
}

/// Lazily materialized working copies, one directory per component.
#[derive(Clone)]
pub struct ComponentCache {
    root: PathBuf,
    remote: String,
    git: Arc<dyn GitBackend>,
    progress: bool,
}

impl ComponentCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, remote: impl Into<String>, git: Arc<dyn GitBackend>) -> Self {
        Self {
            root: root.into(),
            remote: remote.into(),
            git,
            progress: true,
        }
    }

    /// Disable the clone spinner.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.progress = false;
        self
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn path_for(&self, component: &Component) -> PathBuf {
        self.root.join(component.name())
    }

    /// Open the component's working copy, cloning it on first use.
    ///
    /// # Errors
    ///
    /// Returns `GitError::SetupFailed` if cloning, flow initialization, or
    /// checkout fails. The partial working copy is removed. A non-empty
    /// directory that is not a working copy is never touched.
    pub fn get(&self, component: &Component) -> MuxResult<WorkingCopy> {
        let path = self.path_for(component);
        if !self.git.is_working_copy(&path) {
            self.materialize(component, &path)
                .map_err(|e| GitError::SetupFailed {
                    component: component.name().to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(WorkingCopy {
            name: component.name().to_string(),
            path,
            git: Arc::clone(&self.git),
        })
    }

    fn materialize(&self, component: &Component, path: &Path) -> MuxResult<()> {
        info!(component = %component.name(), url = %component.url(), "cloning component");

        if path.exists() {
            if std::fs::read_dir(path)?.next().is_some() {
                return Err(GitError::CommandFailed {
                    command: "clone".to_string(),
                    message: format!(
                        "destination '{}' exists and is not a git working copy",
                        path.display()
                    ),
                }
                .into());
            }
            debug!(path = %path.display(), "cloning into empty directory");
        }
        std::fs::create_dir_all(path)?;
        let mut guard = PartialCloneGuard::new(path.to_path_buf());

        let spinner = if self.progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style());
            pb.set_message(format!("cloning {}", component.name()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        let result = self.initialize(component, path);
        spinner.finish_and_clear();
        result?;

        guard.keep();
        Ok(())
    }

    fn initialize(&self, component: &Component, path: &Path) -> MuxResult<()> {
        self.git.clone_repo(component.url(), path)?;
        self.git.flow_init(path)?;

        let local = self.git.list_branches(path)?;
        for branch in self.git.list_remote_branches(path, &self.remote)? {
            if !local.contains(&branch) {
                debug!(component = %component.name(), %branch, "tracking remote branch");
                self.git.track_remote_branch(path, &self.remote, &branch)?;
            }
        }

        self.git.create_branch(path, SCRATCH, None)?;
        self.git.checkout(path, SCRATCH)?;
        Ok(())
    }
}

/// Handle to one materialized working copy.
#[derive(Clone)]
pub struct WorkingCopy {
    name: String,
    path: PathBuf,
    git: Arc<dyn GitBackend>,
}

impl std::fmt::Debug for WorkingCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingCopy")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl WorkingCopy {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the listing fails.
    pub fn branches(&self) -> MuxResult<Vec<String>> {
        self.git.list_branches(&self.path)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    pub fn checkout(&self, branch: &str) -> MuxResult<()> {
        self.git.checkout(&self.path, branch)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    pub fn create_branch(&self, branch: &str, start: Option<&str>) -> MuxResult<()> {
        self.git.create_branch(&self.path, branch, start)
    }

    /// Recreate `scratch` if missing.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    pub fn ensure_scratch(&self, branches: &[String]) -> MuxResult<()> {
        if !branches.iter().any(|b| b == SCRATCH) {
            warn!(component = %self.name, "scratch branch missing, recreating");
            self.create_branch(SCRATCH, None)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    pub fn push(&self, args: &[&str]) -> MuxResult<ToolOutput> {
        self.git.push(&self.path, args)
    }

    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    pub fn pull(&self, args: &[&str]) -> MuxResult<ToolOutput> {
        self.git.pull(&self.path, args)
    }

    /// Run `git flow <args>`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    pub fn flow(&self, args: &[String]) -> MuxResult<ToolOutput> {
        self.git.flow(&self.path, args)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be queried.
    pub fn remote_has_branch(&self, remote: &str, branch: &str) -> MuxResult<bool> {
        self.git.remote_branch_exists(&self.path, remote, branch)
    }

    /// Check out `scratch` and confirm HEAD is on it.
    ///
    /// Nothing is forced: a checkout blocked by local changes or an
    /// unfinished merge is reported and the working copy is left as is.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails or HEAD ends up elsewhere.
    pub fn restore_scratch(&self) -> MuxResult<()> {
        self.checkout(SCRATCH)?;
        match self.git.current_branch(&self.path)? {
            Some(branch) if branch == SCRATCH => Ok(()),
            other => Err(GitError::CommandFailed {
                command: format!("git checkout {SCRATCH}"),
                message: format!(
                    "HEAD is on {} instead of {SCRATCH}",
                    other.as_deref().unwrap_or("a detached commit")
                ),
            }
            .into()),
        }
    }

    /// Guard that returns to `scratch` when released or dropped.
    #[must_use]
    pub fn scratch_guard(&self) -> ScratchGuard<'_> {
        ScratchGuard {
            copy: self,
            armed: true,
        }
    }
}

/// Returns the working copy to `scratch`.
///
/// [`ScratchGuard::restore`] reports the result. Dropping an unreleased
/// guard (early return, panic) restores too, but can only log a failure.
#[must_use = "the working copy returns to scratch when the guard is dropped"]
pub struct ScratchGuard<'a> {
    copy: &'a WorkingCopy,
    armed: bool,
}

impl ScratchGuard<'_> {
    /// Return to `scratch` now.
    ///
    /// # Errors
    ///
    /// Returns the error of [`WorkingCopy::restore_scratch`].
    pub fn restore(mut self) -> MuxResult<()> {
        self.armed = false;
        self.copy.restore_scratch()
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        if self.armed
            && let Err(e) = self.copy.restore_scratch()
        {
            warn!(component = %self.copy.name, error = %e, "failed to return to scratch");
        }
    }
}
