// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared wiring for subcommands.

use relay_core::{Settings, SystemClock};
use relay_storage::LockOptions;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings, clock, and lock options every subcommand needs.
pub struct CliContext {
    pub settings: Settings,
    pub clock: Arc<SystemClock>,
}

impl CliContext {
    pub fn new(state_root: Option<PathBuf>) -> Self {
        let settings = match state_root {
            Some(root) => Settings::with_state_root(root),
            None => Settings::default(),
        };
        Self {
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            timeout: self.settings.lock_timeout,
            poll_interval: self.settings.lock_poll_interval,
            create_if_missing: false,
        }
    }
}
