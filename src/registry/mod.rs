// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch registry: which component carries which branch.
//!
//! ```text
//! by_component                 by_branch
//! api -> {develop, feature/x}  develop   -> {api, web}
//! web -> {develop, feature/x}  feature/x -> {api, web}
//! ```
//!
//! Both maps are updated together so they stay mutual inverses. `scratch` is
//! never recorded, and empty sets are pruned.


use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::component::{Component, ComponentCache};
use crate::error::MuxResult;
use crate::git::branch::SCRATCH;

/// Bidirectional branch index built from local working copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchRegistry {
    by_component: BTreeMap<String, BTreeSet<String>>,
    by_branch: BTreeMap<String, BTreeSet<String>>,
}

impl BranchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `component` carries `branch`.
    ///
    /// Returns `false` if the pair was already present or `branch` is `scratch`.
    pub fn insert(&mut self, branch: &str, component: &str) -> bool {
        if branch == SCRATCH {
            return false;
        }
        let added = self
            .by_branch
            .entry(branch.to_string())
            .or_default()
            .insert(component.to_string());
        self.by_component
            .entry(component.to_string())
            .or_default()
            .insert(branch.to_string());
        added
    }

    /// Forget that `component` carries `branch`.
    pub fn remove(&mut self, branch: &str, component: &str) -> bool {
        let removed = Self::remove_from(&mut self.by_branch, branch, component);
        Self::remove_from(&mut self.by_component, component, branch);
        removed
    }

    fn remove_from(map: &mut BTreeMap<String, BTreeSet<String>>, key: &str, value: &str) -> bool {
        let Some(set) = map.get_mut(key) else {
            return false;
        };
        let removed = set.remove(value);
        if set.is_empty() {
            map.remove(key);
        }
        removed
    }

    #[must_use]
    pub fn contains_branch(&self, branch: &str) -> bool {
        self.by_branch.contains_key(branch)
    }

    #[must_use]
    pub fn carries(&self, component: &str, branch: &str) -> bool {
        self.by_branch
            .get(branch)
            .is_some_and(|set| set.contains(component))
    }

    /// Components carrying `branch`, sorted.
    #[must_use]
    pub fn components_for(&self, branch: &str) -> BTreeSet<String> {
        self.by_branch.get(branch).cloned().unwrap_or_default()
    }

    /// Branches carried by `component`, sorted.
    #[must_use]
    pub fn branches_for(&self, component: &str) -> BTreeSet<String> {
        self.by_component.get(component).cloned().unwrap_or_default()
    }

    /// All branches with their components, sorted by branch name.
    pub fn branches(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.by_branch.iter().map(|(b, c)| (b.as_str(), c))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_branch.is_empty()
    }

    /// Check that both maps are exact inverses of each other.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let forward = self
            .by_branch
            .iter()
            .all(|(b, cs)| cs.iter().all(|c| self.by_component.get(c).is_some_and(|bs| bs.contains(b))));
        let backward = self
            .by_component
            .iter()
            .all(|(c, bs)| bs.iter().all(|b| self.by_branch.get(b).is_some_and(|cs| cs.contains(c))));
        forward && backward
    }
}

/// Build the registry by listing every component's local branches.
///
/// Components are visited in the given (sorted) order, materialized on first
/// use, and left on `scratch`.
///
/// # Errors
///
/// Returns a `GitError` if any working copy cannot be set up or listed.
pub fn build(components: &[Component], cache: &ComponentCache) -> MuxResult<BranchRegistry> {
    let mut registry = BranchRegistry::new();
    for component in components {
        let copy = cache.get(component)?;
        let branches = copy.branches()?;
        copy.ensure_scratch(&branches)?;
        for branch in &branches {
            registry.insert(branch, component.name());
        }
        copy.restore_scratch()?;
        debug!(component = %component.name(), count = branches.len(), "indexed branches");
    }
    Ok(registry)
}
