// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Machine-wide process lock.
//!
//! An exclusive OS advisory lock on a payload-free file serializes every
//! git-mux process touching the shared branch-status store. The lock is held
//! by [`LockGuard`] and released when it drops, including during unwinding.
//!
//! Acquisition blocks without timeout. The lock is not re-entrant: acquiring
//! it twice from one process deadlocks. The file is left on disk after
//! release.


use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LockError, MuxResult};

/// Named cross-process lock backed by a file.
#[derive(Debug, Clone)]
pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> MuxResult<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LockError::Open {
                path: self.path.clone(),
                source,
            })?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| {
                LockError::Open {
                    path: self.path.clone(),
                    source,
                }
                .into()
            })
    }

    /// Block until this process holds the lock.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Open` if the file cannot be opened or created, and
    /// `LockError::Acquire` if the OS rejects the lock.
    pub fn acquire(&self) -> MuxResult<LockGuard> {
        let file = self.open()?;
        debug!(path = %self.path.display(), "waiting for process lock");
        file.lock().map_err(|source| LockError::Acquire {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "process lock acquired");
        Ok(LockGuard {
            file,
            path: self.path.clone(),
        })
    }

    /// Take the lock only if no other holder has it.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessLock::acquire`].
    pub fn try_acquire(&self) -> MuxResult<Option<LockGuard>> {
        let file = self.open()?;
        match file.try_lock() {
            Ok(()) => Ok(Some(LockGuard {
                file,
                path: self.path.clone(),
            })),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(source)) => Err(LockError::Acquire {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }
}

/// Held process lock; released on drop.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!(path = %self.path.display(), error = %e, "failed to release process lock");
        } else {
            debug!(path = %self.path.display(), "process lock released");
        }
    }
}
