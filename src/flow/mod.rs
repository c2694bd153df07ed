// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Flow dispatcher: one git-flow verb fanned out across every component.
//!
//! ```text
//! idle --> validating --> per-component loop --> done
//!              |                  |
//!              v                  v
//!           aborted      setup error / interrupt --> aborted
//!
//! per component (sorted by name):
//!   cache.get --> [first turn: snapshot acting set] --> ScratchGuard
//!     --> handler --> ComponentOutcome
//!     --> restore scratch (failure: outcome becomes Failed) --> console
//! ```
//!
//! Validation errors never reach the loop: [`args::parse`] and the registry
//! check in [`FlowDispatcher::run`] reject bad input before any component is
//! touched. Inside the loop a handler error, a nonzero tool exit, or a
//! working copy stuck off `scratch` is a [`ComponentOutcome::Failed`] for
//! that component only. Stuck working copies are never forced back; the
//! user resolves them.

pub mod args;
pub mod console;
pub mod help;

mod handlers;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::component::{Component, ComponentCache};
use crate::error::{FlowError, MuxError, MuxResult};
use crate::git::ToolOutput;
use crate::registry::BranchRegistry;

pub use args::{FlowCommand, FlowRequest, Verb};
pub use console::{Console, MemoryConsole, StdConsole};

/// Result of one component's turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentOutcome {
    /// Component does not carry the branch; nothing printed.
    Skipped,
    Succeeded(String),
    /// Idempotent no-op, such as starting a branch twice.
    AlreadyDone(String),
    Failed(String),
}

impl ComponentOutcome {
    /// Default message for a failed tool run that printed nothing.
    pub const DEFAULT_FAILURE: &'static str = "flow command failed";

    /// Map a tool result: nonzero exit fails, otherwise report stdout.
    #[must_use]
    pub fn from_output(output: &ToolOutput) -> Self {
        if output.success() {
            Self::Succeeded(output.stdout.trim_end().to_string())
        } else {
            Self::Failed(output.failure_message(Self::DEFAULT_FAILURE))
        }
    }

    /// Fail a turn whose working copy could not return to `scratch`.
    #[must_use]
    pub fn stranded(self, error: &MuxError) -> Self {
        match self {
            Self::Failed(message) => {
                Self::Failed(format!("{message}; could not return to scratch: {error}"))
            }
            _ => Self::Failed(format!("could not return to scratch: {error}")),
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn report(&self, component: &str, console: &mut dyn Console) {
        match self {
            Self::Skipped => {}
            Self::Succeeded(message) | Self::AlreadyDone(message) => {
                console.section(component);
                if !message.is_empty() {
                    console.info(message);
                }
            }
            Self::Failed(message) => {
                console.section(component);
                console.error(message);
            }
        }
    }
}

/// Per-component outcomes in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowReport {
    outcomes: Vec<(String, ComponentOutcome)>,
}

impl FlowReport {
    #[must_use]
    pub fn outcomes(&self) -> &[(String, ComponentOutcome)] {
        &self.outcomes
    }

    #[must_use]
    pub fn outcome_for(&self, component: &str) -> Option<&ComponentOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == component)
            .map(|(_, outcome)| outcome)
    }

    /// Names of components whose turn failed.
    #[must_use]
    pub fn failures(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| outcome.is_failure())
    }
}

/// Scratch data threaded through one fan-out.
#[derive(Debug, Default)]
pub struct FlowState {
    /// Components visited so far.
    pub index: usize,
    /// Components carrying the target when the loop started.
    pub acting: BTreeSet<String>,
}

/// What a handler sees during one component's turn.
pub(crate) struct Turn<'a> {
    pub(crate) request: &'a FlowRequest,
    pub(crate) state: &'a FlowState,
    pub(crate) registry: &'a mut BranchRegistry,
    /// Configured publishing remote.
    pub(crate) remote: &'a str,
}

/// Drives one [`FlowRequest`] across all components.
pub struct FlowDispatcher<'a> {
    components: &'a [Component],
    cache: &'a ComponentCache,
    registry: &'a mut BranchRegistry,
    cancel: CancellationToken,
}

impl<'a> FlowDispatcher<'a> {
    #[must_use]
    pub fn new(
        components: &'a [Component],
        cache: &'a ComponentCache,
        registry: &'a mut BranchRegistry,
    ) -> Self {
        Self {
            components,
            cache,
            registry,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run `request` on every component in order.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownBranch` before visiting anything if a
    /// branch-scoped verb targets a branch no component carries. Returns a
    /// `GitError::SetupFailed` if a working copy cannot be materialized, and
    /// `FlowError::Interrupted` if cancelled between components.
    pub fn run(&mut self, request: &FlowRequest, console: &mut dyn Console) -> MuxResult<FlowReport> {
        let target = request.target().map(ToString::to_string);
        if request.verb().requires_known_branch()
            && let Some(full) = &target
            && !self.registry.contains_branch(full)
        {
            return Err(FlowError::UnknownBranch(full.clone()).into());
        }

        let handler = handlers::for_verb(request.verb());
        let remote = self.cache.remote().to_string();
        let mut state = FlowState::default();
        let mut report = FlowReport::default();

        for component in self.components {
            if self.cancel.is_cancelled() {
                return Err(FlowError::Interrupted {
                    completed: state.index,
                }
                .into());
            }

            let copy = self.cache.get(component)?;
            if state.index == 0
                && let Some(full) = &target
            {
                state.acting = self.registry.components_for(full);
                debug!(branch = %full, acting = ?state.acting, "acting components");
            }

            let scratch = copy.scratch_guard();
            let outcome = {
                let mut turn = Turn {
                    request,
                    state: &state,
                    registry: &mut *self.registry,
                    remote: &remote,
                };
                handler(&mut turn, &copy)
                    .unwrap_or_else(|e| ComponentOutcome::Failed(e.to_string()))
            };
            let outcome = match scratch.restore() {
                Ok(()) => outcome,
                Err(e) => {
                    warn!(component = %component.name(), error = %e, "failed to return to scratch");
                    outcome.stranded(&e)
                }
            };

            info!(component = %component.name(), verb = %request.verb(), ?outcome, "component done");
            outcome.report(component.name(), console);
            report.outcomes.push((component.name().to_string(), outcome));
            state.index += 1;
        }

        Ok(report)
    }
}
