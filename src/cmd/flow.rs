// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `git mux flow` command.

use anyhow::bail;

use crate::cli::branch::FlowArgs;
use crate::engine::Engine;
use crate::error::Result;
use crate::flow::{Console, FlowReport, StdConsole};

/// Run one flow invocation across every component.
///
/// # Errors
///
/// Returns an error for invalid input, setup failures, interruption, or when
/// at least one component reported a failure.
pub fn run_flow_command(args: &FlowArgs, engine: &mut Engine) -> Result<()> {
    run_flow_with(&args.args, engine, &mut StdConsole)
}

pub(crate) fn run_flow_with(
    args: &[String],
    engine: &mut Engine,
    console: &mut dyn Console,
) -> Result<()> {
    let report = engine.flow(args, console)?;
    check_report(&report)
}

fn check_report(report: &FlowReport) -> Result<()> {
    if report.has_failures() {
        let failed = report.failures();
        tracing::debug!(failed = failed.len(), "flow finished with failures");
        bail!("flow failed in {}", failed.join(", "));
    }
    Ok(())
}
