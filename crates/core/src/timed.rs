// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items with timing metadata for the temporal scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Whether the user must be present for a piece of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkTiming {
    /// User must be present (interactive, judgment, destructive)
    Sync,
    /// Can run unattended (batch, read-only, background)
    Async,
    /// Flexible; decided by current time-of-day when enqueued
    Either,
}

impl fmt::Display for WorkTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkTiming::Sync => write!(f, "sync"),
            WorkTiming::Async => write!(f, "async"),
            WorkTiming::Either => write!(f, "either"),
        }
    }
}

/// Lifecycle states of a timed work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedStatus {
    Queued,
    Scheduled,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for TimedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimedStatus::Queued => write!(f, "queued"),
            TimedStatus::Scheduled => write!(f, "scheduled"),
            TimedStatus::Running => write!(f, "running"),
            TimedStatus::Completed => write!(f, "completed"),
            TimedStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Work item with timing and scheduling metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWorkItem {
    pub id: String,
    pub description: String,
    pub timing: WorkTiming,
    /// Estimated quota cost in messages
    pub estimated_quota: u32,
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// 1-10, higher is more urgent
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    pub status: TimedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Project directory used as the agent's working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl TimedWorkItem {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        timing: WorkTiming,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            timing,
            estimated_quota: 10,
            estimated_duration_minutes: 30,
            dependencies: Vec::new(),
            deadline: None,
            priority: 5,
            created_at,
            scheduled_for: None,
            status: TimedStatus::Queued,
            result: None,
            error: None,
            project_path: None,
            project_name: None,
        }
    }
}

#[cfg(test)]
#[path = "timed_tests.rs"]
mod tests;
