// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git and git-flow invocation boundary.
//!
//! ```text
//!   component / registry / flow / store
//!                  |
//!                  v
//!        ,--------------------,
//!        | dyn GitBackend     |
//!        '--+--------------+--'
//!           |              |
//!           v              v
//!      ShellBackend     FakeGit (tests)
//!      git CLI + gix    in-memory
//! ```
//!
//! **`branch`**: naming rules shared by every layer.

pub mod backend;
pub mod branch;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backend::{GitBackend, ShellBackend, ToolOutput};
pub use branch::{BranchName, BranchType};
