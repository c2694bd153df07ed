// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!               MuxError (~16 bytes)
//!                     |
//!   +------+------+---+---+------+------+-----+
//!   |      |      |       |      |      |     |
//!   v      v      v       v      v      v     v
//!  Git   Config  Flow  Registry Lock  Store   Io
//!  Box    Box    Box     Box    Box    Box    Box
//!
//! Sub-errors (unboxed internally):
//!   Git      CommandFailed, SetupFailed, ExecutableNotFound
//!   Config   MissingKey, InvalidValue, HomeNotFound
//!   Flow     InvalidBranchType, InvalidBranchName, UnknownBranch,
//!            InitNotSupported, InvalidCommand, BadArguments,
//!            MissingBranchName, Interrupted
//!   Registry UnknownBranch, UnknownComponent, Protected, NotActive, NotRetired
//!   Lock     Open, Acquire
//!   Store    NotConfigured, Parse, Write, Serialize
//! ```
//!
//! Errors raised by a verb handler inside a component's turn are reported for
//! that component only. Validation, setup, and interrupt errors abort the whole
//! multiplexed operation.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`MuxError`].
pub type MuxResult<T> = std::result::Result<T, MuxError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~16 bytes on the stack.
#[derive(Debug, Error)]
pub enum MuxError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Invalid multiplexed flow invocation.
    #[error("{0}")]
    Flow(#[from] Box<FlowError>),

    /// Branch registry validation error.
    #[error("{0}")]
    Registry(#[from] Box<RegistryError>),

    /// Process lock error.
    #[error("lock error: {0}")]
    Lock(#[from] Box<LockError>),

    /// Shared branch-status store error.
    #[error("store error: {0}")]
    Store(#[from] Box<StoreError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for MuxError {
                fn from(err: $error) -> Self {
                    MuxError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    FlowError => Flow,
    RegistryError => Registry,
    LockError => Lock,
    StoreError => Store,
    std::io::Error => Io,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git executable could not be located.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// A component working copy could not be materialized.
    ///
    /// A half-initialized working copy corrupts later registry builds, so this
    /// always aborts the whole operation.
    #[error("failed to set up working copy for component '{component}': {message}")]
    SetupFailed { component: String, message: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Home directory could not be determined.
    #[error("cannot determine home directory; set $HOME or configure paths explicitly")]
    HomeNotFound,
}

// --- Flow Errors ---

/// Fatal validation errors raised before any component is visited.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Branch type is not one of the muxed types.
    #[error("Invalid branch type \"{0}\". Expected feature, release, or hotfix.")]
    InvalidBranchType(String),

    /// Branch name does not match the lowercase-and-hyphens pattern.
    #[error("Invalid branch name \"{0}\". Use lowercase letters separated by hyphens.")]
    InvalidBranchName(String),

    /// Branch is not carried by any component.
    #[error("Branch \"{0}\" is not recognized.")]
    UnknownBranch(String),

    /// `init` only makes sense for a single repository.
    #[error("Init can't be multiplexed. Run \"git flow init\" in each component instead.")]
    InitNotSupported,

    /// Verb has no handler.
    #[error("Invalid command \"{0}\". Try \"git mux flow <branch_type> help\".")]
    InvalidCommand(String),

    /// Verb received the wrong argument shape.
    #[error("Expected \"git mux flow {expected}\".")]
    BadArguments { expected: String },

    /// A verb that needs a branch name did not receive one.
    #[error("Missing branch name for \"{verb}\".")]
    MissingBranchName { verb: String },

    /// User interrupted the fan-out.
    #[error("interrupted after {completed} component(s)")]
    Interrupted { completed: usize },
}

// --- Registry Errors ---

/// Errors from branch registry mutations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Branch is not known.
    #[error("Branch \"{0}\" is not recognized.")]
    UnknownBranch(String),

    /// Component is not configured.
    #[error("Component \"{0}\" is not recognized.")]
    UnknownComponent(String),

    /// `master` and `develop` cannot be mutated.
    #[error("Branch \"{0}\" is protected.")]
    Protected(String),

    /// Retire requested for a branch that is already retired.
    #[error("Branch \"{0}\" is not active.")]
    NotActive(String),

    /// Revive requested for a branch that is not retired.
    #[error("Branch \"{0}\" is not retired.")]
    NotRetired(String),
}

// --- Lock Errors ---

/// Process lock errors.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock file could not be opened or created.
    #[error("failed to open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused the exclusive lock.
    #[error("failed to lock {path}: {source}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// --- Store Errors ---

/// Shared branch-status store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No shared repository configured.
    #[error("shared data repository not configured (set data.url)")]
    NotConfigured,

    /// Document could not be parsed.
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be serialized.
    #[error("could not serialize branch document: {0}")]
    Serialize(#[source] serde_json::Error),
}
