// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitBackend (object-safe, per working copy)
//!   queries   --> gix (no subprocess)
//!   setup     --> git CLI, nonzero exit = GitError
//!   muxed     --> git CLI, nonzero exit = ToolOutput
//! ```
//!
//! Muxed commands (`push`, `pull`, `flow`) never fail on a nonzero exit code:
//! the dispatcher reports those per component and keeps going.


use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use super::branch::{parse_local_branches, parse_remote_branches};
use crate::error::{GitError, MuxResult};

/// Captured result of an external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best message describing a failure: stderr, then stdout, then `default`.
    #[must_use]
    pub fn failure_message(&self, default: &str) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

/// Capability set of one component working copy.
///
/// Every method takes the working copy path so a single backend value serves
/// all components.
pub trait GitBackend: Send + Sync {
    /// Whether `path` is the top of a non-bare git working copy.
    fn is_working_copy(&self, path: &Path) -> bool;

    /// Checked-out branch, `None` when HEAD is detached.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the repository cannot be opened.
    fn current_branch(&self, repo: &Path) -> MuxResult<Option<String>>;

    /// Clone `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the clone fails.
    fn clone_repo(&self, url: &str, dest: &Path) -> MuxResult<()>;

    /// One-time `git flow init -d`, establishing `develop`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git-flow is missing or initialization fails.
    fn flow_init(&self, repo: &Path) -> MuxResult<()>;

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the listing fails.
    fn list_branches(&self, repo: &Path) -> MuxResult<Vec<String>>;

    /// Remote-tracking branches on `remote` with a recognized type prefix.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the listing fails.
    fn list_remote_branches(&self, repo: &Path, remote: &str) -> MuxResult<Vec<String>>;

    /// Ask the remote whether it currently has `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be queried.
    fn remote_branch_exists(&self, repo: &Path, remote: &str, branch: &str) -> MuxResult<bool>;

    /// Create local `branch` tracking `remote/branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn track_remote_branch(&self, repo: &Path, remote: &str, branch: &str) -> MuxResult<()>;

    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    fn checkout(&self, repo: &Path, branch: &str) -> MuxResult<()>;

    /// Create `branch` at `start` (HEAD when `None`) without checking it out.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn create_branch(&self, repo: &Path, branch: &str, start: Option<&str>) -> MuxResult<()>;

    /// `git push <args>`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    fn push(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput>;

    /// `git pull <args>`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    fn pull(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput>;

    /// `git flow <args>`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if git cannot be spawned.
    fn flow(&self, repo: &Path, args: &[String]) -> MuxResult<ToolOutput>;

    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn add(&self, repo: &Path, paths: &[&str]) -> MuxResult<()>;

    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    fn commit(&self, repo: &Path, message: &str) -> MuxResult<()>;
}

// --- ShellBackend Implementation (Git CLI) ---

/// Git CLI backend; queries go through gix.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    git: PathBuf,
}

impl ShellBackend {
    /// Resolve `git` (name or path) with `which`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::ExecutableNotFound` if it cannot be located.
    pub fn new(git: &str) -> MuxResult<Self> {
        let git = which::which(git).map_err(|_| GitError::ExecutableNotFound {
            name: git.to_string(),
        })?;
        debug!(git = %git.display(), "resolved git executable");
        Ok(Self { git })
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.git
    }

    /// Run git and capture its output. Sets `GCM_INTERACTIVE=never` and
    /// `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn run<S: AsRef<str>>(&self, args: &[S], cwd: &Path) -> MuxResult<ToolOutput> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        trace!(cwd = %cwd.display(), "git {}", args.join(" "));

        let output = Command::new(&self.git)
            .args(&args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        Ok(ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run git, failing with `GitError::CommandFailed` on nonzero exit.
    pub(crate) fn git_command(&self, args: &[&str], cwd: &Path) -> MuxResult<String> {
        let output = self.run(args, cwd)?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: output.failure_message("no output"),
            }
            .into());
        }
        Ok(output.stdout.trim().to_string())
    }
}

impl GitBackend for ShellBackend {
    fn is_working_copy(&self, path: &Path) -> bool {
        gix::open(path).is_ok_and(|repo| repo.workdir().is_some())
    }

    fn current_branch(&self, repo: &Path) -> MuxResult<Option<String>> {
        let handle = gix::open(repo).map_err(|e| GitError::CommandFailed {
            command: "open".to_string(),
            message: e.to_string(),
        })?;
        let head = handle.head_name().map_err(|e| GitError::CommandFailed {
            command: "head".to_string(),
            message: e.to_string(),
        })?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> MuxResult<()> {
        let dest_str = dest.to_string_lossy();
        let cwd = dest.parent().unwrap_or_else(|| Path::new("."));
        self.git_command(&["clone", url, &dest_str], cwd)?;
        Ok(())
    }

    fn flow_init(&self, repo: &Path) -> MuxResult<()> {
        self.git_command(&["flow", "init", "-d"], repo)?;
        Ok(())
    }

    fn list_branches(&self, repo: &Path) -> MuxResult<Vec<String>> {
        let listing = self.git_command(&["branch", "--no-color"], repo)?;
        Ok(parse_local_branches(&listing))
    }

    fn list_remote_branches(&self, repo: &Path, remote: &str) -> MuxResult<Vec<String>> {
        let listing = self.git_command(&["branch", "-r", "--no-color"], repo)?;
        Ok(parse_remote_branches(&listing, remote))
    }

    fn remote_branch_exists(&self, repo: &Path, remote: &str, branch: &str) -> MuxResult<bool> {
        let output = self.git_command(&["ls-remote", "--heads", remote, branch], repo)?;
        Ok(!output.is_empty())
    }

    fn track_remote_branch(&self, repo: &Path, remote: &str, branch: &str) -> MuxResult<()> {
        let upstream = format!("{remote}/{branch}");
        self.git_command(&["branch", "--track", branch, &upstream], repo)?;
        Ok(())
    }

    fn checkout(&self, repo: &Path, branch: &str) -> MuxResult<()> {
        self.git_command(&["checkout", "-q", branch], repo)?;
        Ok(())
    }

    fn create_branch(&self, repo: &Path, branch: &str, start: Option<&str>) -> MuxResult<()> {
        let mut args = vec!["branch", branch];
        args.extend(start);
        self.git_command(&args, repo)?;
        Ok(())
    }

    fn push(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput> {
        let mut full = vec!["push"];
        full.extend_from_slice(args);
        self.run(&full, repo)
    }

    fn pull(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput> {
        let mut full = vec!["pull"];
        full.extend_from_slice(args);
        self.run(&full, repo)
    }

    fn flow(&self, repo: &Path, args: &[String]) -> MuxResult<ToolOutput> {
        let mut full = vec!["flow"];
        full.extend(args.iter().map(String::as_str));
        self.run(&full, repo)
    }

    fn add(&self, repo: &Path, paths: &[&str]) -> MuxResult<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.git_command(&args, repo)?;
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> MuxResult<()> {
        self.git_command(&["commit", "-q", "-m", message], repo)?;
        Ok(())
    }
}
