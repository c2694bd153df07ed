// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          flow / list / retire / graft
//!                +----------+----------+
//!                           v
//!                        engine
//!                           |
//!          +--------+-------+--------+--------+
//!          v        v                v        v
//!        flow    registry          lock     store
//!     dispatcher  branch<->comp    flock   branches.json
//!          |        |                         |
//!          +----+---+                         |
//!               v                             |
//!           component  (cache, scratch guard) |
//!               |                             |
//!               +--------------+--------------+
//!                              v
//!                    git  (GitBackend: CLI + gix)
//!
//!   +-----------------------------------------+
//!   |  foundation   config, error, logging    |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod git;
pub mod lock;
pub mod logging;
pub mod registry;
pub mod store;
