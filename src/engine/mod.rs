// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Engine facade.
//!
//! ```text
//!                 Engine
//!   components (lazy) ---- registry (lazy, updated in place)
//!        |                      |
//!        v                      v
//!   ComponentCache <---- FlowDispatcher
//!        |
//!        v
//!   dyn GitBackend
//!
//!   retire / revive / graft:
//!     ProcessLock --> DataStore.sync --> load --> mutate --> save
//! ```
//!
//! One `Engine` is built per process and passed to every command.


use std::collections::BTreeSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::component::{self, Component, ComponentCache};
use crate::config::Config;
use crate::config::types::Components;
use crate::error::{GitError, MuxResult, RegistryError, StoreError};
use crate::flow::{
    self, ComponentOutcome, Console, FlowCommand, FlowDispatcher, FlowReport, help,
};
use crate::git::branch::{self, BranchName, BranchType, DEVELOP};
use crate::git::{GitBackend, ShellBackend};
use crate::lock::ProcessLock;
use crate::registry::{self, BranchRegistry};
use crate::store::{BranchDocument, BranchStatus, DataStore};

/// Reported by `flow version`; the underlying git-flow version is not tracked.
pub const FLOW_VERSION: &str = "unknown";

/// A typed branch with its carriers and shared status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub name: String,
    pub components: BTreeSet<String>,
    pub status: BranchStatus,
}

pub struct Engine {
    component_urls: Components,
    branch_types: Vec<BranchType>,
    git: Arc<dyn GitBackend>,
    cache: ComponentCache,
    lock: ProcessLock,
    store: DataStore,
    components: Option<Vec<Component>>,
    registry: Option<BranchRegistry>,
    cancel: CancellationToken,
}

impl Engine {
    /// Build an engine driving the configured git executable.
    ///
    /// # Errors
    ///
    /// Returns `GitError::ExecutableNotFound` if git cannot be located, or a
    /// `ConfigError` if paths were never resolved.
    pub fn new(config: &Config) -> MuxResult<Self> {
        let git = ShellBackend::new(&config.flow.git)?;
        Self::with_backend(config, Arc::new(git))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError` if paths were never resolved.
    pub fn with_backend(config: &Config, git: Arc<dyn GitBackend>) -> MuxResult<Self> {
        let remote = config.flow.remote.clone();
        let cache = ComponentCache::new(config.paths.repos()?, remote.clone(), Arc::clone(&git));
        let store = DataStore::new(&config.data, config.paths.data()?, remote, Arc::clone(&git));
        Ok(Self {
            component_urls: config.components.clone(),
            branch_types: config.flow.branch_types.clone(),
            git,
            cache,
            lock: ProcessLock::new(config.paths.lock()?),
            store,
            components: None,
            registry: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Disable progress output while cloning.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.cache = self.cache.quiet();
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configured components, sorted by name.
    pub fn get_components(&mut self) -> &[Component] {
        let urls = &self.component_urls;
        self.components
            .get_or_insert_with(|| component::from_config(urls))
    }

    /// Branch registry, built on first call by visiting every component.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if a working copy cannot be set up or listed.
    pub fn get_branches(&mut self) -> MuxResult<&BranchRegistry> {
        self.ensure_loaded()?;
        Ok(self.registry.get_or_insert_with(BranchRegistry::new))
    }

    fn ensure_loaded(&mut self) -> MuxResult<()> {
        let urls = &self.component_urls;
        let components = self
            .components
            .get_or_insert_with(|| component::from_config(urls));
        if self.registry.is_none() {
            info!(count = components.len(), "building branch registry");
            self.registry = Some(registry::build(components, &self.cache)?);
        }
        Ok(())
    }

    /// Run a `git mux flow` invocation.
    ///
    /// # Errors
    ///
    /// Returns a `FlowError` for invalid input, a `GitError` for setup
    /// failures, and `FlowError::Interrupted` on cancellation. Per-component
    /// failures are in the report.
    pub fn flow(&mut self, args: &[String], console: &mut dyn Console) -> MuxResult<FlowReport> {
        let request = match flow::args::parse(args, &self.branch_types)? {
            FlowCommand::Help(args) => {
                let cwd = std::env::current_dir()?;
                let output = self.git.flow(&cwd, &help::help_args(&args))?;
                console.info(&help::rewrite(&output));
                return Ok(FlowReport::default());
            }
            FlowCommand::Version => {
                console.info(FLOW_VERSION);
                return Ok(FlowReport::default());
            }
            FlowCommand::Run(request) => request,
        };

        self.ensure_loaded()?;
        let components = self.components.as_deref().unwrap_or_default();
        let registry = self.registry.get_or_insert_with(BranchRegistry::new);
        FlowDispatcher::new(components, &self.cache, registry)
            .with_cancel_token(self.cancel.clone())
            .run(&request, console)
    }

    /// Mark `branch` retired in the shared store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Protected` for `master`/`develop`,
    /// `RegistryError::UnknownBranch` if nothing knows the branch, and
    /// `RegistryError::NotActive` if it is already retired.
    pub fn retire(&mut self, branch: &str) -> MuxResult<()> {
        self.set_status(branch, BranchStatus::Retired)
    }

    /// Mark a retired `branch` active again.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Protected` for `master`/`develop`,
    /// `RegistryError::UnknownBranch` if nothing knows the branch, and
    /// `RegistryError::NotRetired` if it is not retired.
    pub fn revive(&mut self, branch: &str) -> MuxResult<()> {
        self.set_status(branch, BranchStatus::Active)
    }

    fn set_status(&mut self, branch: &str, status: BranchStatus) -> MuxResult<()> {
        if branch::is_protected(branch) {
            return Err(RegistryError::Protected(branch.to_string()).into());
        }
        if !self.store.is_configured() {
            return Err(StoreError::NotConfigured.into());
        }
        let carriers = self.get_branches()?.components_for(branch);

        let _lock = self.lock.acquire()?;
        self.store.sync()?;
        let mut document = self.store.load()?;

        if carriers.is_empty() && document.find(branch).is_none() {
            return Err(RegistryError::UnknownBranch(branch.to_string()).into());
        }
        let current = document.status_of(branch).unwrap_or_default();
        let (verb, error) = match status {
            BranchStatus::Retired => ("retire", RegistryError::NotActive(branch.to_string())),
            BranchStatus::Active => ("revive", RegistryError::NotRetired(branch.to_string())),
        };
        if current == status {
            return Err(error.into());
        }

        let record = document.upsert(branch);
        record.status = status;
        record.components.extend(carriers);
        self.store.save(&document, &format!("{verb} {branch} branch"))?;
        info!(%branch, %status, "branch status changed");
        Ok(())
    }

    /// Create an existing branch in one more component.
    ///
    /// The branch starts from `develop`, is pushed with upstream tracking,
    /// and is recorded in the shared store when one is configured.
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` for protected, unknown, or untyped branches
    /// and unknown components, and a `GitError` if the branch cannot be
    /// created or pushed.
    pub fn add_component_to_branch(
        &mut self,
        component: &str,
        branch: &str,
    ) -> MuxResult<ComponentOutcome> {
        if branch::is_protected(branch) {
            return Err(RegistryError::Protected(branch.to_string()).into());
        }
        if BranchName::parse_full(branch).is_none() {
            return Err(RegistryError::UnknownBranch(branch.to_string()).into());
        }
        let target = self
            .get_components()
            .iter()
            .find(|c| c.name() == component)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownComponent(component.to_string()))?;

        let registry = self.get_branches()?;
        if !registry.contains_branch(branch) {
            return Err(RegistryError::UnknownBranch(branch.to_string()).into());
        }
        if registry.carries(component, branch) {
            return Ok(ComponentOutcome::AlreadyDone(format!(
                "Component {component} already carries {branch}."
            )));
        }

        let _lock = self.lock.acquire()?;
        if self.store.is_configured() {
            self.store.sync()?;
        }

        let copy = self.cache.get(&target)?;
        let scratch = copy.scratch_guard();
        copy.create_branch(branch, Some(DEVELOP))?;
        let remote = self.cache.remote();
        let output = copy.push(&["-u", remote, branch])?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: format!("git push -u {remote} {branch}"),
                message: output.failure_message("push failed"),
            }
            .into());
        }
        scratch.restore()?;
        self.registry
            .get_or_insert_with(BranchRegistry::new)
            .insert(branch, component);

        if self.store.is_configured() {
            let mut document = self.store.load()?;
            document
                .upsert(branch)
                .components
                .insert(component.to_string());
            self.store
                .save(&document, &format!("graft {component} into {branch}"))?;
        }
        info!(%component, %branch, "component added to branch");
        Ok(ComponentOutcome::Succeeded(format!(
            "Branch {branch} created in {component}."
        )))
    }

    /// Typed branches with their carriers, sorted by name.
    ///
    /// Retired branches are left out unless `include_retired`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the registry cannot be built or the shared
    /// store cannot be synced.
    pub fn branch_summaries(&mut self, include_retired: bool) -> MuxResult<Vec<BranchSummary>> {
        let document = self.shared_document()?;
        let registry = self.get_branches()?;
        Ok(registry
            .branches()
            .filter(|(name, _)| BranchName::parse_full(name).is_some())
            .map(|(name, components)| BranchSummary {
                name: name.to_string(),
                components: components.clone(),
                status: document.status_of(name).unwrap_or_default(),
            })
            .filter(|summary| include_retired || summary.status == BranchStatus::Active)
            .collect())
    }

    fn shared_document(&mut self) -> MuxResult<BranchDocument> {
        if !self.store.is_configured() {
            return Ok(BranchDocument::default());
        }
        let _lock = self.lock.acquire()?;
        self.store.sync()?;
        self.store.load()
    }
}
