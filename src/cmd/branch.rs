// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared branch-state commands: `retire`, `revive`, `graft`.

use crate::cli::branch::{BranchArgs, GraftArgs};
use crate::engine::Engine;
use crate::error::Result;
use crate::flow::ComponentOutcome;

/// Mark a branch retired in the shared store.
///
/// # Errors
///
/// Returns an error if the branch is protected, unknown, already retired, or
/// the shared store cannot be updated.
pub fn run_retire_command(args: &BranchArgs, engine: &mut Engine) -> Result<()> {
    engine.retire(&args.branch)?;
    println!("Branch {} retired.", args.branch);
    Ok(())
}

/// Mark a retired branch active again.
///
/// # Errors
///
/// Returns an error if the branch is protected, unknown, not retired, or the
/// shared store cannot be updated.
pub fn run_revive_command(args: &BranchArgs, engine: &mut Engine) -> Result<()> {
    engine.revive(&args.branch)?;
    println!("Branch {} revived.", args.branch);
    Ok(())
}

/// Add a component to an existing branch.
///
/// # Errors
///
/// Returns an error if the component or branch is unknown, or the branch
/// cannot be created and pushed.
pub fn run_graft_command(args: &GraftArgs, engine: &mut Engine) -> Result<()> {
    let outcome = engine.add_component_to_branch(&args.component, &args.branch)?;
    match outcome {
        ComponentOutcome::Succeeded(message) | ComponentOutcome::AlreadyDone(message) => {
            println!("{message}");
        }
        ComponentOutcome::Failed(message) => anyhow::bail!(message),
        ComponentOutcome::Skipped => {}
    }
    Ok(())
}
