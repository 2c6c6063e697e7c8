// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration, passed by dependency injection.
//!
//! Everything stateful takes a [`Settings`] (or the paths derived from it)
//! instead of reading ambient globals, so tests can point components at a
//! temp directory.

use chrono::NaiveTime;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the control plane. One state root holds everything.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root state directory (e.g. ~/.local/state/relay)
    pub state_root: PathBuf,
    /// Lock acquisition timeout
    pub lock_timeout: Duration,
    /// Poll interval while waiting for a lock
    pub lock_poll_interval: Duration,
    /// Maximum concurrent active work items
    pub wip_limit: usize,
    /// Start of the user's active hours (local time)
    pub active_hours_start: NaiveTime,
    /// End of the user's active hours (local time)
    pub active_hours_end: NaiveTime,
    /// Days of metrics history to retain
    pub metrics_retention_days: i64,
    /// Days of session/search/decision history to retain
    pub session_ttl_days: i64,
    /// Maximum concurrent overnight tasks
    pub overnight_max_concurrent: usize,
    /// Overall overnight run timeout
    pub overnight_timeout: Duration,
    /// Per-item agent execution timeout
    pub agent_timeout: Duration,
    /// Use the LLM-backed agent matcher instead of keywords
    pub use_llm_matcher: bool,
    /// Directory holding agent definition files
    pub agents_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_state_root(default_state_root())
    }
}

impl Settings {
    /// Settings rooted at an explicit directory, with all defaults.
    pub fn with_state_root(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
            lock_timeout: Duration::from_secs(30),
            lock_poll_interval: Duration::from_millis(100),
            wip_limit: 3,
            active_hours_start: NaiveTime::from_hms_opt(9, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            active_hours_end: NaiveTime::from_hms_opt(22, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            metrics_retention_days: 90,
            session_ttl_days: 30,
            overnight_max_concurrent: 3,
            overnight_timeout: Duration::from_secs(10_800),
            agent_timeout: Duration::from_secs(3_600),
            use_llm_matcher: std::env::var("RELAY_USE_LLM").is_ok_and(|v| v == "1"),
            agents_dir: None,
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_root.join("state")
    }

    pub fn quota_file(&self) -> PathBuf {
        self.state_dir().join("quota-tracking.json")
    }

    pub fn work_queue_file(&self) -> PathBuf {
        self.state_dir().join("work-queue.json")
    }

    pub fn temporal_queue_file(&self) -> PathBuf {
        self.state_dir().join("temporal-work-queue.json")
    }

    pub fn routing_history_file(&self) -> PathBuf {
        self.state_dir().join("routing-history.json")
    }

    pub fn overnight_results_dir(&self) -> PathBuf {
        self.state_dir().join("overnight-results")
    }

    pub fn metrics_dir(&self) -> PathBuf {
        self.state_root.join("metrics")
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.state_root.join("memory")
    }
}

/// `$XDG_STATE_HOME/relay`, falling back to `~/.local/state/relay`.
fn default_state_root() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("relay");
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("state")
        .join("relay")
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
