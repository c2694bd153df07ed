// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Flow argument parsing.
//!
//! ```text
//! []                      --> Help
//! [..., "help"]           --> Help
//! ["version"]             --> Version
//! ["init", ...]           --> FlowError::InitNotSupported
//! [type]                  --> Run(type list)
//! [type, verb, rest...]   --> Run(type verb), shape checked per verb
//! ```
//!
//! Everything that can reject an invocation happens here, before any
//! component is visited.

use std::fmt;

use crate::error::FlowError;
use crate::git::branch::{self, BranchName, BranchType};

/// Multiplexed git-flow verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Start,
    Finish,
    Pull,
    Push,
    Rebase,
    Diff,
    List,
}

impl Verb {
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Finish,
        Self::Pull,
        Self::Push,
        Self::Rebase,
        Self::Diff,
        Self::List,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Rebase => "rebase",
            Self::Diff => "diff",
            Self::List => "list",
        }
    }

    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.as_str() == name)
    }

    /// Verbs whose target must already be in the registry.
    #[must_use]
    pub const fn requires_known_branch(self) -> bool {
        matches!(self, Self::Finish | Self::Push | Self::Rebase | Self::Diff)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated multiplexed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRequest {
    branch_type: BranchType,
    verb: Verb,
    target: Option<BranchName>,
    remote: Option<String>,
    args: Vec<String>,
}

impl FlowRequest {
    #[must_use]
    pub const fn branch_type(&self) -> BranchType {
        self.branch_type
    }

    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Target branch; `None` only for `list`.
    #[must_use]
    pub const fn target(&self) -> Option<&BranchName> {
        self.target.as_ref()
    }

    /// Remote named on the command line (`pull` only).
    #[must_use]
    pub fn remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    /// Arguments handed to `git flow`, starting with the branch type.
    #[must_use]
    pub fn tool_args(&self) -> &[String] {
        &self.args
    }
}

/// What a `git mux flow` invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    /// Pass-through to `git flow ... help`.
    Help(Vec<String>),
    Version,
    Run(FlowRequest),
}

const PULL_USAGE: &str = "<branch_type> pull <remote> <name>";
const PUSH_USAGE: &str = "<branch_type> push <name>";

/// Parse and validate `git mux flow` arguments.
///
/// # Errors
///
/// Returns a `FlowError` for `init`, an unknown or unmuxed branch type, an
/// unknown verb, a malformed `pull`/`push`, a missing branch name, or a
/// `start` name that is not lowercase letters and hyphens.
pub fn parse(args: &[String], muxed: &[BranchType]) -> Result<FlowCommand, FlowError> {
    let Some(first) = args.first() else {
        return Ok(FlowCommand::Help(Vec::new()));
    };
    if args.last().is_some_and(|last| last == "help") {
        return Ok(FlowCommand::Help(args.to_vec()));
    }
    match first.as_str() {
        "version" => return Ok(FlowCommand::Version),
        "init" => return Err(FlowError::InitNotSupported),
        _ => {}
    }

    let branch_type: BranchType = first.parse()?;
    if !muxed.contains(&branch_type) {
        return Err(FlowError::InvalidBranchType(first.clone()));
    }

    let verb = match args.get(1) {
        None => Verb::List,
        Some(word) => Verb::lookup(word).ok_or_else(|| FlowError::InvalidCommand(word.clone()))?,
    };
    let rest = args.get(2..).unwrap_or_default();

    let mut request = FlowRequest {
        branch_type,
        verb,
        target: None,
        remote: None,
        args: vec![branch_type.to_string(), verb.to_string()],
    };
    request.args.extend_from_slice(rest);

    match verb {
        Verb::List => {}
        Verb::Pull => {
            let [remote, name] = rest else {
                return Err(bad_arguments(PULL_USAGE));
            };
            if remote.starts_with('-') || name.starts_with('-') {
                return Err(bad_arguments(PULL_USAGE));
            }
            request.remote = Some(remote.clone());
            request.target = Some(BranchName::new(branch_type, name.as_str()));
        }
        Verb::Push => {
            let [name] = rest else {
                return Err(bad_arguments(PUSH_USAGE));
            };
            if name.starts_with('-') {
                return Err(bad_arguments(PUSH_USAGE));
            }
            request.target = Some(BranchName::new(branch_type, name.as_str()));
        }
        Verb::Start | Verb::Finish | Verb::Rebase | Verb::Diff => {
            let name = rest
                .iter()
                .find(|token| !token.starts_with('-'))
                .ok_or_else(|| FlowError::MissingBranchName {
                    verb: verb.to_string(),
                })?;
            if verb == Verb::Start {
                branch::validate_name(name)?;
            }
            request.target = Some(BranchName::new(branch_type, name.as_str()));
        }
    }

    Ok(FlowCommand::Run(request))
}

fn bad_arguments(expected: &str) -> FlowError {
    FlowError::BadArguments {
        expected: expected.to_string(),
    }
}
