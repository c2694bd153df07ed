// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities for code built on [`GitBackend`].
//!
//! `FakeGit` keeps every working copy and remote in memory and records each
//! invocation as `"<component>: git <args>"`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::backend::{GitBackend, ToolOutput};
use super::branch::{BranchName, DEVELOP, MASTER};
use crate::error::{GitError, MuxResult};

#[derive(Debug, Default)]
struct FakeRepo {
    url: String,
    branches: BTreeSet<String>,
    current: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    remotes: BTreeMap<String, BTreeSet<String>>,
    repos: BTreeMap<PathBuf, FakeRepo>,
    calls: Vec<String>,
    flow_failures: BTreeMap<(String, String), String>,
    checkout_failures: BTreeMap<(String, String), String>,
    clone_failures: BTreeSet<String>,
}

impl State {
    fn repo(&mut self, path: &Path) -> MuxResult<&mut FakeRepo> {
        self.repos.get_mut(path).ok_or_else(|| {
            GitError::CommandFailed {
                command: "git".to_string(),
                message: format!("not a git repository: {}", path.display()),
            }
            .into()
        })
    }

    fn record(&mut self, path: &Path, args: &[&str]) {
        self.calls
            .push(format!("{}: git {}", component_of(path), args.join(" ")));
    }
}

fn component_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
}

fn failed(command: &str, message: impl Into<String>) -> crate::error::MuxError {
    GitError::CommandFailed {
        command: command.to_string(),
        message: message.into(),
    }
    .into()
}

/// In-memory git and git-flow.
#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    state: Mutex<State>,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a remote holding `master`, `develop` and `branches`.
    pub(crate) fn with_remote(self, url: &str, branches: &[&str]) -> Self {
        {
            let mut state = self.state();
            let remote = state.remotes.entry(url.to_string()).or_default();
            remote.insert(MASTER.to_string());
            remote.insert(DEVELOP.to_string());
            remote.extend(branches.iter().map(|b| (*b).to_string()));
        }
        self
    }

    /// Make `git flow <type> <verb>` exit 1 with `message` in `component`.
    pub(crate) fn fail_flow(self, component: &str, verb: &str, message: &str) -> Self {
        self.state().flow_failures.insert(
            (component.to_string(), verb.to_string()),
            message.to_string(),
        );
        self
    }

    /// Make `git checkout <branch>` fail with `message` in `component`.
    ///
    /// Takes `&self` so it can be armed after the working copy exists.
    pub(crate) fn fail_checkout(&self, component: &str, branch: &str, message: &str) {
        self.state().checkout_failures.insert(
            (component.to_string(), branch.to_string()),
            message.to_string(),
        );
    }

    pub(crate) fn fail_clone(self, url: &str) -> Self {
        self.state().clone_failures.insert(url.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub(crate) fn local_branches(&self, repo: &Path) -> BTreeSet<String> {
        self.state()
            .repos
            .get(repo)
            .map(|r| r.branches.clone())
            .unwrap_or_default()
    }

    pub(crate) fn checked_out(&self, repo: &Path) -> Option<String> {
        self.state().repos.get(repo).and_then(|r| r.current.clone())
    }

    pub(crate) fn remote_branches(&self, url: &str) -> BTreeSet<String> {
        self.state().remotes.get(url).cloned().unwrap_or_default()
    }

    /// Add a branch to a working copy behind the cache's back.
    pub(crate) fn seed_local_branch(&self, repo: &Path, branch: &str) {
        if let Some(r) = self.state().repos.get_mut(repo) {
            r.branches.insert(branch.to_string());
        }
    }

    pub(crate) fn seed_remote_branch(&self, url: &str, branch: &str) {
        self.state()
            .remotes
            .entry(url.to_string())
            .or_default()
            .insert(branch.to_string());
    }

    fn run_flow(state: &mut State, repo: &Path, args: &[String]) -> MuxResult<ToolOutput> {
        let component = component_of(repo);
        let (Some(kind), Some(last)) = (args.first(), args.last()) else {
            return Ok(ToolOutput::ok("usage: git flow <subcommand>\n"));
        };
        if last == "help" {
            return Ok(ToolOutput::ok(format!("usage: git flow {kind} [list] [-h]\n")));
        }
        let verb = args.get(1).map_or("list", String::as_str);
        if let Some(message) = state.flow_failures.get(&(component, verb.to_string())) {
            return Ok(ToolOutput::failed(1, message.clone()));
        }

        let name = args
            .iter()
            .skip(2)
            .rfind(|a| !a.starts_with('-'))
            .cloned()
            .unwrap_or_default();
        let full = format!("{kind}/{name}");
        let r = state.repo(repo)?;

        let output = match verb {
            "start" => {
                if !r.branches.insert(full.clone()) {
                    return Ok(ToolOutput::failed(
                        1,
                        format!("Branch '{full}' already exists. Pick another name."),
                    ));
                }
                r.current = Some(full.clone());
                ToolOutput::ok(format!("Switched to a new branch '{full}'\n"))
            }
            "finish" => {
                if !r.branches.remove(&full) {
                    return Ok(ToolOutput::failed(1, format!("Branch '{full}' does not exist")));
                }
                r.current = Some(DEVELOP.to_string());
                ToolOutput::ok(format!("Deleted branch {full}.\n"))
            }
            "pull" => {
                let url = r.url.clone();
                if !state.remotes.get(&url).is_some_and(|b| b.contains(&full)) {
                    return Ok(ToolOutput::failed(1, format!("Branch '{full}' not on remote")));
                }
                let r = state.repo(repo)?;
                r.branches.insert(full.clone());
                r.current = Some(full.clone());
                ToolOutput::ok(format!("Pulled {full}\n"))
            }
            "list" => {
                let prefix = format!("{kind}/");
                let listing: Vec<_> = r
                    .branches
                    .iter()
                    .filter_map(|b| b.strip_prefix(&prefix))
                    .map(|b| format!("  {b}"))
                    .collect();
                ToolOutput::ok(listing.join("\n"))
            }
            other => ToolOutput::ok(format!("{other} {full}\n")),
        };
        Ok(output)
    }
}

impl GitBackend for FakeGit {
    fn is_working_copy(&self, path: &Path) -> bool {
        self.state().repos.contains_key(path)
    }

    fn current_branch(&self, repo: &Path) -> MuxResult<Option<String>> {
        Ok(self.state().repo(repo)?.current.clone())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> MuxResult<()> {
        let mut state = self.state();
        state.record(dest, &["clone", url]);
        if state.clone_failures.contains(url) || !state.remotes.contains_key(url) {
            return Err(failed("clone", format!("repository '{url}' not found")));
        }
        state.repos.insert(
            dest.to_path_buf(),
            FakeRepo {
                url: url.to_string(),
                branches: BTreeSet::from([MASTER.to_string()]),
                current: Some(MASTER.to_string()),
            },
        );
        Ok(())
    }

    fn flow_init(&self, repo: &Path) -> MuxResult<()> {
        let mut state = self.state();
        state.record(repo, &["flow", "init", "-d"]);
        let r = state.repo(repo)?;
        r.branches.insert(DEVELOP.to_string());
        r.current = Some(DEVELOP.to_string());
        Ok(())
    }

    fn list_branches(&self, repo: &Path) -> MuxResult<Vec<String>> {
        Ok(self.state().repo(repo)?.branches.iter().cloned().collect())
    }

    fn list_remote_branches(&self, repo: &Path, _remote: &str) -> MuxResult<Vec<String>> {
        let mut state = self.state();
        let url = state.repo(repo)?.url.clone();
        Ok(state
            .remotes
            .get(&url)
            .into_iter()
            .flatten()
            .filter(|b| BranchName::parse_full(b).is_some())
            .cloned()
            .collect())
    }

    fn remote_branch_exists(&self, repo: &Path, _remote: &str, branch: &str) -> MuxResult<bool> {
        let mut state = self.state();
        state.record(repo, &["ls-remote", "--heads", branch]);
        let url = state.repo(repo)?.url.clone();
        Ok(state.remotes.get(&url).is_some_and(|b| b.contains(branch)))
    }

    fn track_remote_branch(&self, repo: &Path, remote: &str, branch: &str) -> MuxResult<()> {
        let upstream = format!("{remote}/{branch}");
        let mut state = self.state();
        state.record(repo, &["branch", "--track", branch, &upstream]);
        state.repo(repo)?.branches.insert(branch.to_string());
        Ok(())
    }

    fn checkout(&self, repo: &Path, branch: &str) -> MuxResult<()> {
        let mut state = self.state();
        state.record(repo, &["checkout", branch]);
        if let Some(message) = state
            .checkout_failures
            .get(&(component_of(repo), branch.to_string()))
        {
            return Err(failed("checkout", message.clone()));
        }
        let r = state.repo(repo)?;
        if !r.branches.contains(branch) {
            return Err(failed(
                "checkout",
                format!("pathspec '{branch}' did not match any file(s) known to git"),
            ));
        }
        r.current = Some(branch.to_string());
        Ok(())
    }

    fn create_branch(&self, repo: &Path, branch: &str, start: Option<&str>) -> MuxResult<()> {
        let mut state = self.state();
        let mut args = vec!["branch", branch];
        args.extend(start);
        state.record(repo, &args);
        let r = state.repo(repo)?;
        if !r.branches.insert(branch.to_string()) {
            return Err(failed("branch", format!("a branch named '{branch}' already exists")));
        }
        Ok(())
    }

    fn push(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput> {
        let mut state = self.state();
        let mut recorded = vec!["push"];
        recorded.extend_from_slice(args);
        state.record(repo, &recorded);

        let r = state.repo(repo)?;
        let url = r.url.clone();
        let local = r.branches.clone();
        let head = r.current.clone().unwrap_or_default();
        let refspecs = args
            .iter()
            .filter(|a| !a.starts_with('-'))
            .skip(1)
            .map(|a| if *a == "HEAD" { head.as_str() } else { *a });
        let remote = state.remotes.entry(url).or_default();
        for refspec in refspecs {
            if let Some(deleted) = refspec.strip_prefix(':') {
                remote.remove(deleted);
            } else if local.contains(refspec) {
                remote.insert(refspec.to_string());
            } else {
                return Ok(ToolOutput::failed(
                    1,
                    format!("error: src refspec {refspec} does not match any"),
                ));
            }
        }
        Ok(ToolOutput::default())
    }

    fn pull(&self, repo: &Path, args: &[&str]) -> MuxResult<ToolOutput> {
        let mut recorded = vec!["pull"];
        recorded.extend_from_slice(args);
        self.state().record(repo, &recorded);
        Ok(ToolOutput::default())
    }

    fn flow(&self, repo: &Path, args: &[String]) -> MuxResult<ToolOutput> {
        let mut state = self.state();
        let mut recorded = vec!["flow"];
        recorded.extend(args.iter().map(String::as_str));
        state.record(repo, &recorded);
        Self::run_flow(&mut state, repo, args)
    }

    fn add(&self, repo: &Path, paths: &[&str]) -> MuxResult<()> {
        let mut recorded = vec!["add"];
        recorded.extend_from_slice(paths);
        self.state().record(repo, &recorded);
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> MuxResult<()> {
        self.state().record(repo, &["commit", "-m", message]);
        Ok(())
    }
}
