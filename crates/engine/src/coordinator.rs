// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WIP-bounded work coordination.
//!
//! Kanban-style queue: bounded parallelism, dependency-aware eligibility,
//! and unblocking-first priority so work that frees other work runs first.

use chrono::{DateTime, Utc};
use relay_core::{Clock, WorkItem, WorkStatus};
use relay_storage::{read_json_shared, update_json, DocError, LockOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors from coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Doc(#[from] DocError),
    #[error("work item not found: {0}")]
    NotFound(String),
}

/// Persisted queue document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct QueueDoc {
    #[serde(default = "default_wip_limit")]
    wip_limit: usize,
    #[serde(default)]
    work_items: Vec<WorkItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

fn default_wip_limit() -> usize {
    3
}

/// Queue status counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSummary {
    pub wip_limit: usize,
    pub active: usize,
    pub queued: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

/// Kanban work queue with a WIP limit.
pub struct WorkCoordinator {
    state_file: PathBuf,
    lock_options: LockOptions,
    wip_limit: usize,
    clock: Arc<dyn Clock>,
    items: Vec<WorkItem>,
}

impl WorkCoordinator {
    /// Open the coordinator, loading any persisted queue. A corrupt state
    /// file is logged and replaced with an empty queue.
    pub fn open(
        state_file: impl Into<PathBuf>,
        wip_limit: usize,
        lock_options: LockOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoordinatorError> {
        let state_file = state_file.into();
        let lock_options = lock_options.create_if_missing();

        let doc: QueueDoc = read_json_shared(&state_file, &lock_options)?;
        if !doc.work_items.is_empty() {
            tracing::debug!(items = doc.work_items.len(), "loaded existing work queue");
        }

        Ok(Self {
            state_file,
            lock_options,
            wip_limit,
            clock,
            items: doc.work_items,
        })
    }

    fn save(&self) -> Result<(), CoordinatorError> {
        let items = self.items.clone();
        let wip_limit = self.wip_limit;
        let now = self.clock.now_utc();
        update_json(
            &self.state_file,
            &self.lock_options,
            |doc: &mut QueueDoc| {
                doc.wip_limit = wip_limit;
                doc.work_items = items;
                doc.last_updated = Some(now);
            },
        )?;
        Ok(())
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn wip_limit(&self) -> usize {
        self.wip_limit
    }

    /// Add a work item to the queue.
    pub fn add(&mut self, item: WorkItem) -> Result<(), CoordinatorError> {
        self.items.push(item);
        self.save()
    }

    fn active_count(&self) -> usize {
        self.items
            .iter()
            .filter(|w| w.status == WorkStatus::Active)
            .count()
    }

    fn completed_ids(&self) -> HashSet<&str> {
        self.items
            .iter()
            .filter(|w| w.status == WorkStatus::Completed)
            .map(|w| w.id.as_str())
            .collect()
    }

    /// All dependencies completed? Unknown dependency ids never satisfy.
    fn dependencies_satisfied(&self, item: &WorkItem) -> bool {
        let completed = self.completed_ids();
        item.dependencies.iter().all(|d| completed.contains(d.as_str()))
    }

    /// How many queued items does this one block?
    fn unblocking_count(&self, id: &str) -> usize {
        self.items
            .iter()
            .filter(|w| w.status == WorkStatus::Queued)
            .filter(|w| w.dependencies.iter().any(|d| d == id))
            .count()
    }

    /// Pick the next item to start, or `None` at capacity / no eligible
    /// work.
    ///
    /// Among eligible items, those that unblock the most queued work win;
    /// ties break by priority, then by queue position, so the selection is
    /// stable for a given queue state.
    fn next_eligible(&self) -> Option<usize> {
        if self.active_count() >= self.wip_limit {
            return None;
        }

        let eligible: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, w)| w.status == WorkStatus::Queued && self.dependencies_satisfied(w))
            .map(|(i, _)| i)
            .collect();

        let best = eligible.into_iter().max_by_key(|&i| {
            let item = &self.items[i];
            (
                self.unblocking_count(&item.id),
                item.priority,
                usize::MAX - i,
            )
        })?;
        Some(best)
    }

    /// Fill free WIP slots with the highest-value eligible work.
    ///
    /// Returns the newly started items in start order.
    pub fn schedule(&mut self) -> Result<Vec<WorkItem>, CoordinatorError> {
        let mut started = Vec::new();

        while let Some(index) = self.next_eligible() {
            let now = self.clock.now_utc();
            let item = &mut self.items[index];
            item.status = WorkStatus::Active;
            item.started_at = Some(now);
            started.push(item.clone());
        }

        if !started.is_empty() {
            self.save()?;
        }
        Ok(started)
    }

    /// Mark an item completed and fill the freed slot.
    pub fn complete(
        &mut self,
        id: &str,
        agent: Option<&str>,
    ) -> Result<Vec<WorkItem>, CoordinatorError> {
        let now = self.clock.now_utc();
        let item = self
            .items
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| CoordinatorError::NotFound(id.to_string()))?;
        item.status = WorkStatus::Completed;
        item.completed_at = Some(now);
        if let Some(agent) = agent {
            item.agent = Some(agent.to_string());
        }
        self.save()?;
        self.schedule()
    }

    /// Mark an item failed (terminal; dependents stay blocked) and fill
    /// the freed slot.
    pub fn fail(&mut self, id: &str, error: &str) -> Result<Vec<WorkItem>, CoordinatorError> {
        let now = self.clock.now_utc();
        let item = self
            .items
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| CoordinatorError::NotFound(id.to_string()))?;
        item.status = WorkStatus::Failed;
        item.error = Some(error.to_string());
        item.completed_at = Some(now);
        warn!(id, error, "work item failed");
        self.save()?;
        self.schedule()
    }

    pub fn status_summary(&self) -> CoordinatorSummary {
        let count = |status: WorkStatus| self.items.iter().filter(|w| w.status == status).count();
        CoordinatorSummary {
            wip_limit: self.wip_limit,
            active: count(WorkStatus::Active),
            queued: count(WorkStatus::Queued),
            completed: count(WorkStatus::Completed),
            failed: count(WorkStatus::Failed),
            total: self.items.len(),
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
