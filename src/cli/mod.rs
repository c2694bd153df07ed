// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for git-mux using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! git-mux [global options] <command>
//! flow <type> <verb> [args...]
//! list [--all] [branches|components]
//! retire <branch>
//! revive <branch>
//! graft <component> <branch>
//! options | configs | version
//! ```
//!
//! Subcommands may be abbreviated to any unambiguous prefix (`git mux fl`).

pub mod branch;
pub mod global;


use crate::cli::branch::{BranchArgs, FlowArgs, GraftArgs, ListArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Multi-Repository Branch Multiplexer
///
/// Runs git-flow branch operations across every configured component.
#[derive(Debug, Parser)]
#[command(
    name = "git-mux",
    bin_name = "git mux",
    author,
    version,
    infer_subcommands = true,
    about = "Multiplexes git-flow branches across repositories",
    long_about = "git-mux Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Runs one git-flow command in every configured component.\n\n\
                  `git mux flow feature start checkout-icon` starts the branch\n\
                  everywhere; `git mux list` shows which components carry which\n\
                  branch. See `git mux <command> --help` for more information.",
    after_help = "CONFIG FILES:\n\n\
                  By default, git-mux loads `git-mux.toml` from the current\n\
                  directory if present. Additional files can be given with\n\
                  --config and are loaded afterwards, in order. Environment\n\
                  variables prefixed with GITMUX_ and --set overrides win over\n\
                  files. Use --no-default-config to only use --config."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs a git-flow command in every component.
    Flow(FlowArgs),

    /// Lists branches or components.
    List(ListArgs),

    /// Marks a branch retired for everyone.
    Retire(BranchArgs),

    /// Marks a retired branch active again.
    Revive(BranchArgs),

    /// Adds a component to an existing branch.
    Graft(GraftArgs),

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files used.
    Configs,

    /// Shows the version.
    Version,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
