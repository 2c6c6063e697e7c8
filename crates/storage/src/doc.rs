// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locked document helpers.
//!
//! `read_json_shared` and `update_json` are the two ways components touch
//! persisted state: shared-locked reads that tolerate corruption, and
//! exclusive-locked read-modify-write cycles committed atomically.

use crate::atomic::{write_json_atomic, AtomicWriteError};
use crate::lock::{LockError, LockOptions, LockedFile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum DocError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a document under a shared lock.
///
/// A missing file or malformed JSON yields `T::default()`; corruption is
/// logged, never fatal.
pub fn read_json_shared<T>(path: &Path, options: &LockOptions) -> Result<T, DocError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let lock = LockedFile::shared(path, options)?;
    let mut content = String::new();
    lock.file().read_to_string(&mut content)?;
    drop(lock);

    match serde_json::from_str(&content) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "corrupt state document, falling back to empty",
            );
            Ok(T::default())
        }
    }
}

/// Read-modify-write a document under an exclusive lock.
///
/// The mutation runs against the current document (or `T::default()` for a
/// missing/corrupt file) and the result is committed atomically before the
/// lock is released. Returns the mutation's output.
pub fn update_json<T, R>(
    path: &Path,
    options: &LockOptions,
    mutate: impl FnOnce(&mut T) -> R,
) -> Result<R, DocError>
where
    T: DeserializeOwned + Serialize + Default,
{
    let lock = LockedFile::exclusive(path, options)?;

    let mut content = String::new();
    lock.file().read_to_string(&mut content)?;
    let mut value: T = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            if !content.trim().is_empty() && content.trim() != "{}" {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "corrupt state document, rebuilding from empty",
                );
            }
            T::default()
        }
    };

    let output = mutate(&mut value);
    write_json_atomic(path, &value)?;
    drop(lock);
    Ok(output)
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
