// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-verb policies.
//!
//! | verb   | visits            | does                                        |
//! |--------|-------------------|---------------------------------------------|
//! | start  | all               | `flow start`, register, `push -u`           |
//! | finish | acting            | `flow finish`, unregister, delete remote ref, push bases |
//! | pull   | acting + remote   | `flow pull <remote> <name>`, register new   |
//! | push   | acting            | `push <remote> <branch>`                    |
//! | rebase | acting            | `flow rebase ...`                           |
//! | diff   | acting            | `flow diff ...`                             |
//! | list   | all               | `flow list ...`                             |
//!
//! Handlers run with the working copy's scratch guard held, so they may leave
//! any branch checked out.

use tracing::warn;

use super::{ComponentOutcome, Turn, Verb};
use crate::component::WorkingCopy;
use crate::error::{FlowError, MuxResult};
use crate::git::branch::{DEVELOP, MASTER};

pub(crate) type Handler = fn(&mut Turn<'_>, &WorkingCopy) -> MuxResult<ComponentOutcome>;

pub(crate) const fn for_verb(verb: Verb) -> Handler {
    match verb {
        Verb::Start => start,
        Verb::Finish => finish,
        Verb::Pull => pull,
        Verb::Push => push,
        Verb::Rebase | Verb::Diff => delegate,
        Verb::List => list,
    }
}

fn target(turn: &Turn<'_>) -> MuxResult<String> {
    turn.request
        .target()
        .map(ToString::to_string)
        .ok_or_else(|| {
            FlowError::MissingBranchName {
                verb: turn.request.verb().to_string(),
            }
            .into()
        })
}

fn acting(turn: &Turn<'_>, copy: &WorkingCopy) -> bool {
    turn.state.acting.contains(copy.name())
}

fn start(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    let full = target(turn)?;

    if acting(turn, copy) {
        copy.checkout(&full)?;
        let repair = copy.push(&["-u", turn.remote, &full])?;
        if !repair.success() {
            warn!(
                component = %copy.name(),
                branch = %full,
                error = %repair.failure_message("push failed"),
                "could not reconnect branch to its remote"
            );
        }
        return Ok(ComponentOutcome::AlreadyDone(format!(
            "Branch {full} already started."
        )));
    }

    let output = copy.flow(turn.request.tool_args())?;
    if !output.success() {
        return Ok(ComponentOutcome::from_output(&output));
    }
    turn.registry.insert(&full, copy.name());

    let publish = copy.push(&["-u", turn.remote, &full])?;
    if !publish.success() {
        return Ok(ComponentOutcome::Failed(format!(
            "Branch {full} started but not pushed: {}",
            publish.failure_message("push failed")
        )));
    }
    Ok(ComponentOutcome::Succeeded(format!("Branch {full} started.")))
}

fn finish(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    if !acting(turn, copy) {
        return Ok(ComponentOutcome::Skipped);
    }
    let full = target(turn)?;

    copy.checkout(&full)?;
    let output = copy.flow(turn.request.tool_args())?;
    if !output.success() {
        return Ok(ComponentOutcome::from_output(&output));
    }
    turn.registry.remove(&full, copy.name());

    let delete = format!(":{full}");
    let mut refspecs = vec![delete.as_str(), DEVELOP];
    if turn.request.branch_type().merges_into_master() {
        refspecs.extend([MASTER, "--tags"]);
    }
    for refspec in refspecs {
        let pushed = copy.push(&[turn.remote, refspec])?;
        if !pushed.success() {
            return Ok(ComponentOutcome::Failed(format!(
                "Branch {full} finished but push of {refspec} failed: {}",
                pushed.failure_message("push failed")
            )));
        }
    }
    Ok(ComponentOutcome::Succeeded(format!("Branch {full} finished.")))
}

fn pull(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    let full = target(turn)?;
    let remote = turn.request.remote().unwrap_or(turn.remote);
    let carries = acting(turn, copy);

    if carries {
        copy.checkout(&full)?;
    } else if !copy.remote_has_branch(remote, &full)? {
        return Ok(ComponentOutcome::Skipped);
    }

    let output = copy.flow(turn.request.tool_args())?;
    if output.success() && !carries {
        turn.registry.insert(&full, copy.name());
    }
    Ok(ComponentOutcome::from_output(&output))
}

fn push(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    if !acting(turn, copy) {
        return Ok(ComponentOutcome::Skipped);
    }
    let full = target(turn)?;

    copy.checkout(&full)?;
    let output = copy.push(&[turn.remote, &full])?;
    Ok(match ComponentOutcome::from_output(&output) {
        ComponentOutcome::Succeeded(message) if message.is_empty() => {
            ComponentOutcome::Succeeded(format!("Branch {full} pushed."))
        }
        other => other,
    })
}

fn delegate(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    if !acting(turn, copy) {
        return Ok(ComponentOutcome::Skipped);
    }
    copy.checkout(&target(turn)?)?;
    let output = copy.flow(turn.request.tool_args())?;
    Ok(ComponentOutcome::from_output(&output))
}

fn list(turn: &mut Turn<'_>, copy: &WorkingCopy) -> MuxResult<ComponentOutcome> {
    let output = copy.flow(turn.request.tool_args())?;
    Ok(ComponentOutcome::from_output(&output))
}
