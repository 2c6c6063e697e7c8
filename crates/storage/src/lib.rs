// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Concurrency-safe persistent state layer.
//!
//! Every persisted document in the control plane goes through this crate:
//! exclusive OS file locks with stale-lock recovery for writers, shared
//! locks for readers, and atomic temp+rename commits so no reader ever
//! observes a torn document. State files are created mode 0600 under
//! directories created mode 0700.

mod atomic;
mod doc;
mod lock;

pub use atomic::{write_json_atomic, AtomicWriteError};
pub use doc::{read_json_shared, update_json, DocError};
pub use lock::{LockError, LockHolder, LockOptions, LockedFile};
