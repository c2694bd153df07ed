// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! List command implementation for git-mux.

use crate::cli::branch::{ListArgs, ListTarget};
use crate::engine::{BranchSummary, Engine};
use crate::error::Result;
use crate::store::BranchStatus;

/// Main handler for list command.
///
/// # Errors
///
/// Returns an error if the branch registry or shared store cannot be read.
pub fn run_list_command(args: &ListArgs, engine: &mut Engine) -> Result<()> {
    let lines = match args.target {
        ListTarget::Components => component_lines(engine),
        ListTarget::Branches => {
            let summaries = engine.branch_summaries(args.all)?;
            if summaries.is_empty() {
                vec!["No branches found".to_string()]
            } else {
                summaries.iter().map(branch_line).collect()
            }
        }
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn branch_line(summary: &BranchSummary) -> String {
    let components: Vec<&str> = summary.components.iter().map(String::as_str).collect();
    let mut line = format!("{}: {}", summary.name, components.join(", "));
    if summary.status == BranchStatus::Retired {
        line.push_str(" (retired)");
    }
    line
}

pub(crate) fn component_lines(engine: &mut Engine) -> Vec<String> {
    let components = engine.get_components();
    if components.is_empty() {
        return vec!["No components configured".to_string()];
    }
    let width = components.iter().map(|c| c.name().len()).max().unwrap_or(0);
    components
        .iter()
        .map(|c| format!("{:<width$}  ({})", c.name(), c.url()))
        .collect()
}
