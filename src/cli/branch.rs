// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch and component command arguments.

use clap::{Args, ValueEnum};

/// Arguments for `flow`: passed verbatim to the dispatcher.
#[derive(Debug, Clone, Args)]
pub struct FlowArgs {
    /// git-flow arguments, e.g. `feature start checkout-icon`.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

/// What `list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    /// Typed branches and the components carrying them.
    Branches,
    /// Configured components and their URLs.
    Components,
}

/// Arguments for `list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Include retired branches.
    #[arg(short = 'a', long)]
    pub all: bool,

    #[arg(value_enum, default_value_t = ListTarget::Branches)]
    pub target: ListTarget,
}

/// Arguments for `retire` and `revive`.
#[derive(Debug, Clone, Args)]
pub struct BranchArgs {
    /// Full branch name, e.g. `feature/checkout-icon`.
    pub branch: String,
}

/// Arguments for `graft`.
#[derive(Debug, Clone, Args)]
pub struct GraftArgs {
    /// Component to add.
    pub component: String,

    /// Existing full branch name.
    pub branch: String,
}
