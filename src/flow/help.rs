// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `git flow` help pass-through.

use crate::git::ToolOutput;

const TOOL_COMMAND: &str = "git flow";
const MUX_COMMAND: &str = "git mux flow";

/// Arguments for `git flow` that print help for `args`.
#[must_use]
pub fn help_args(args: &[String]) -> Vec<String> {
    if args.is_empty() {
        vec!["help".to_string()]
    } else {
        args.to_vec()
    }
}

/// Help text with the multiplexed command name.
///
/// git-flow prints usage on either stream and sometimes exits nonzero for
/// `help`, so both streams are merged.
#[must_use]
pub fn rewrite(output: &ToolOutput) -> String {
    let text = [output.stdout.trim_end(), output.stderr.trim_end()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    text.replace(TOOL_COMMAND, MUX_COMMAND)
}
