// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch naming rules.
//!
//! ```text
//! feature/checkout-icon
//! ^^^^^^^ ^^^^^^^^^^^^^
//! type    name ([a-z]+(-[a-z]+)*)
//!
//! scratch          sentinel, never registered
//! master, develop  protected
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::FlowError;

/// Local, remote-less branch every working copy rests on between operations.
pub const SCRATCH: &str = "scratch";

/// Integration branch established by `git flow init`.
pub const DEVELOP: &str = "develop";

/// Production branch.
pub const MASTER: &str = "master";

/// Branches never created, retired, or deleted through git-mux.
pub const PROTECTED_BRANCHES: [&str; 2] = [MASTER, DEVELOP];

/// Branch category recognized by git-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Feature,
    Release,
    Hotfix,
}

impl BranchType {
    pub const ALL: [Self; 3] = [Self::Feature, Self::Release, Self::Hotfix];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Release => "release",
            Self::Hotfix => "hotfix",
        }
    }

    /// Whether finishing this type merges into `master` as well as `develop`.
    #[must_use]
    pub const fn merges_into_master(self) -> bool {
        matches!(self, Self::Release | Self::Hotfix)
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature" => Ok(Self::Feature),
            "release" => Ok(Self::Release),
            "hotfix" => Ok(Self::Hotfix),
            _ => Err(FlowError::InvalidBranchType(s.to_string())),
        }
    }
}

/// A `type/name` branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchName {
    branch_type: BranchType,
    name: String,
}

impl BranchName {
    #[must_use]
    pub fn new(branch_type: BranchType, name: impl Into<String>) -> Self {
        Self {
            branch_type,
            name: name.into(),
        }
    }

    /// Split a full branch name such as `feature/coolfeature`.
    ///
    /// Returns `None` for names without a recognized type prefix.
    #[must_use]
    pub fn parse_full(full: &str) -> Option<Self> {
        let (prefix, name) = full.split_once('/')?;
        if name.is_empty() {
            return None;
        }
        let branch_type = prefix.parse().ok()?;
        Some(Self::new(branch_type, name))
    }

    #[must_use]
    pub const fn branch_type(&self) -> BranchType {
        self.branch_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch_type, self.name)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z]+(-[a-z]+)*$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
    })
}

/// Check a new branch name: lowercase letters separated by single hyphens.
///
/// # Errors
///
/// Returns `FlowError::InvalidBranchName` for anything else.
pub fn validate_name(name: &str) -> Result<(), FlowError> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(FlowError::InvalidBranchName(name.to_string()))
    }
}

#[must_use]
pub fn is_protected(branch: &str) -> bool {
    PROTECTED_BRANCHES.contains(&branch)
}

/// Parse `git branch` output, dropping the checked-out marker and detached HEADs.
#[must_use]
pub fn parse_local_branches(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(|line| line.trim_start_matches(['*', '+']).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .map(str::to_string)
        .collect()
}

/// Parse `git branch -r` output into branch names on `remote` with a
/// recognized type prefix.
#[must_use]
pub fn parse_remote_branches(listing: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{remote}/");
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.contains("->"))
        .filter_map(|line| line.strip_prefix(&prefix))
        .filter(|branch| BranchName::parse_full(branch).is_some())
        .map(str::to_string)
        .collect()
}
