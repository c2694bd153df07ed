// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers --> Engine
//!   flow, list, retire, revive, graft, options, configs
//! ```

pub mod branch;
pub mod config;
pub mod flow;
pub mod list;
