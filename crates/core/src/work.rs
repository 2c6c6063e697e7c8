// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work item state machine for the coordinator queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of a coordinated work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Queued,
    Active,
    Blocked,
    Completed,
    Failed,
}

impl WorkStatus {
    /// Terminal states carry a completion timestamp.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkStatus::Completed | WorkStatus::Failed)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkStatus::Queued => write!(f, "queued"),
            WorkStatus::Active => write!(f, "active"),
            WorkStatus::Blocked => write!(f, "blocked"),
            WorkStatus::Completed => write!(f, "completed"),
            WorkStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A unit of work in the coordinator queue.
///
/// Invariants maintained by the coordinator:
/// - `completed_at` is set iff the status is terminal
/// - `started_at` is set iff the item has ever been active
/// - dependencies are ids of other items; unknown ids are never satisfied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub description: String,
    /// 1-10, higher is more urgent
    pub priority: u8,
    /// 1-5 scale, 3 = moderate
    #[serde(default = "default_complexity")]
    pub estimated_complexity: u8,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_complexity() -> u8 {
    3
}

impl WorkItem {
    /// Create a queued work item with defaults.
    pub fn new(id: impl Into<String>, description: impl Into<String>, priority: u8) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            priority,
            estimated_complexity: 3,
            dependencies: Vec::new(),
            status: WorkStatus::Queued,
            agent: None,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn builder() -> WorkItemBuilder {
        WorkItemBuilder::default()
    }
}

/// Builder that normalizes the historical field aliases.
///
/// Callers migrating from older tooling used `task_id`, `task_name`, and
/// `agent_assigned`; those land on the canonical `id`, `description`, and
/// `agent` fields. Serialization only ever uses the canonical names.
#[derive(Debug, Default, Clone)]
pub struct WorkItemBuilder {
    id: Option<String>,
    description: Option<String>,
    priority: u8,
    estimated_complexity: u8,
    dependencies: Vec<String>,
    agent: Option<String>,
}

impl WorkItemBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Alias for [`id`](Self::id).
    pub fn task_id(self, id: impl Into<String>) -> Self {
        self.id(id)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Alias for [`description`](Self::description).
    pub fn task_name(self, name: impl Into<String>) -> Self {
        self.description(name)
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn estimated_complexity(mut self, complexity: u8) -> Self {
        self.estimated_complexity = complexity;
        self
    }

    pub fn dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Alias for [`agent`](Self::agent).
    pub fn agent_assigned(self, agent: impl Into<String>) -> Self {
        self.agent(agent)
    }

    pub fn build(self) -> WorkItem {
        let mut item = WorkItem::new(
            self.id.unwrap_or_default(),
            self.description.unwrap_or_default(),
            if self.priority == 0 { 5 } else { self.priority },
        );
        if self.estimated_complexity != 0 {
            item.estimated_complexity = self.estimated_complexity;
        }
        item.dependencies = self.dependencies;
        item.agent = self.agent;
        item
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
