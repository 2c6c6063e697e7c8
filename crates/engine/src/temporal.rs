// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temporal scheduling across active hours and the overnight window.
//!
//! Work is classified sync (user must be present) or async (can run
//! unattended); async work is selected against remaining quota and the
//! time left before the midnight reset, then executed overnight.

use crate::quota::{QuotaError, QuotaTracker};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use relay_core::{Clock, Tier, TimedStatus, TimedWorkItem, WorkTiming};
use relay_storage::{read_json_shared, update_json, DocError, LockOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from temporal scheduling.
#[derive(Debug, Error)]
pub enum TemporalError {
    #[error(transparent)]
    Doc(#[from] DocError),
    #[error(transparent)]
    Quota(#[from] QuotaError),
}

/// Additional signals for timing classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingContext {
    pub requires_approval: bool,
    pub batch_mode: bool,
}

const SYNC_KEYWORDS: [&str; 18] = [
    "help me",
    "which",
    "should i",
    "decide",
    "choose",
    "review",
    "edit",
    "modify",
    "design",
    "architecture",
    "explain",
    "teach",
    "show me",
    "walk through",
    "interactive",
    "discuss",
    "opinion",
    "preference",
];

const ASYNC_KEYWORDS: [&str; 17] = [
    "search for",
    "find papers",
    "analyze",
    "generate report",
    "batch",
    "scan",
    "index",
    "collect data",
    "background",
    "overnight",
    "when i'm away",
    "prepare",
    "compile",
    "build",
    "test suite",
    "lint",
    "format all",
];

const DESTRUCTIVE_VERBS: [&str; 4] = ["delete", "remove", "overwrite", "destroy"];
const READ_ONLY_VERBS: [&str; 6] = ["read", "search", "find", "list", "show", "count"];

/// Classify whether a request needs the user present.
pub fn classify_timing(request: &str, context: &TimingContext) -> WorkTiming {
    let lower = request.to_lowercase();

    if SYNC_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return WorkTiming::Sync;
    }
    if ASYNC_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return WorkTiming::Async;
    }

    // Destructive work defaults to sync for safety
    if DESTRUCTIVE_VERBS.iter().any(|v| lower.contains(v)) {
        return WorkTiming::Sync;
    }
    if READ_ONLY_VERBS.iter().any(|v| lower.contains(v)) {
        return WorkTiming::Async;
    }

    if context.requires_approval {
        return WorkTiming::Sync;
    }
    if context.batch_mode {
        return WorkTiming::Async;
    }

    WorkTiming::Either
}

const STRONG_WORK_KEYWORDS: [&str; 8] = [
    "formalize",
    "proof",
    "complex reasoning",
    "mathematical",
    "verify",
    "theorem",
    "derive",
    "philosophical",
];

const MID_WORK_KEYWORDS: [&str; 9] = [
    "analyze",
    "design",
    "integrate",
    "architect",
    "review",
    "refactor",
    "plan",
    "strategy",
    "research",
];

/// Estimate the tier a work item needs from its description.
pub fn estimate_tier(item: &TimedWorkItem) -> Tier {
    let lower = item.description.to_lowercase();
    if STRONG_WORK_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Tier::Strong;
    }
    if MID_WORK_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Tier::Mid;
    }
    Tier::Cheap
}

/// Persisted scheduler document: all five queues in one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TemporalDoc {
    #[serde(default)]
    sync_queue: Vec<TimedWorkItem>,
    #[serde(default)]
    async_queue: Vec<TimedWorkItem>,
    #[serde(default)]
    scheduled_async: Vec<TimedWorkItem>,
    #[serde(default)]
    completed_overnight: Vec<TimedWorkItem>,
    #[serde(default)]
    failed_work: Vec<TimedWorkItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

/// Scheduler status counts and forecast.
#[derive(Debug, Clone, Serialize)]
pub struct TemporalSummary {
    pub sync_queue: usize,
    pub async_queue: usize,
    pub scheduled: usize,
    pub completed_overnight: usize,
    pub failed: usize,
    pub is_active_hours: bool,
    pub hours_until_reset: f64,
    /// Projected percent of each tier's quota used after scheduled work
    pub quota_forecast: HashMap<Tier, f64>,
}

/// Schedules work across time boundaries to maximize quota utilization.
pub struct TemporalScheduler<'a> {
    state_file: PathBuf,
    lock_options: LockOptions,
    tracker: &'a QuotaTracker,
    clock: Arc<dyn Clock>,
    active_hours_start: NaiveTime,
    active_hours_end: NaiveTime,
    doc: TemporalDoc,
}

impl<'a> TemporalScheduler<'a> {
    pub fn open(
        state_file: impl Into<PathBuf>,
        tracker: &'a QuotaTracker,
        lock_options: LockOptions,
        clock: Arc<dyn Clock>,
        active_hours: (NaiveTime, NaiveTime),
    ) -> Result<Self, TemporalError> {
        let state_file = state_file.into();
        let lock_options = lock_options.create_if_missing();
        let doc: TemporalDoc = read_json_shared(&state_file, &lock_options)?;

        Ok(Self {
            state_file,
            lock_options,
            tracker,
            clock,
            active_hours_start: active_hours.0,
            active_hours_end: active_hours.1,
            doc,
        })
    }

    fn save(&self) -> Result<(), TemporalError> {
        let doc = self.doc.clone();
        let now = self.clock.now_utc();
        update_json(
            &self.state_file,
            &self.lock_options,
            |stored: &mut TemporalDoc| {
                *stored = doc;
                stored.last_updated = Some(now);
            },
        )?;
        Ok(())
    }

    pub fn is_active_hours(&self) -> bool {
        let now = self.clock.local_time();
        self.active_hours_start <= now && now <= self.active_hours_end
    }

    /// Hours left before the local midnight quota reset.
    pub fn hours_until_reset(&self) -> f64 {
        let now = self.clock.now_local();
        let midnight = (now.date() + Duration::days(1))
            .and_time(NaiveTime::MIN);
        (midnight - now).num_seconds() as f64 / 3600.0
    }

    /// Route a work item to the sync or async queue by its timing.
    /// `Either` follows the time of day: sync during active hours.
    pub fn add_work(&mut self, item: TimedWorkItem) -> Result<(), TemporalError> {
        let queue_sync = match item.timing {
            WorkTiming::Sync => true,
            WorkTiming::Async => false,
            WorkTiming::Either => self.is_active_hours(),
        };

        if queue_sync {
            self.doc.sync_queue.push(item);
            sort_by_priority(&mut self.doc.sync_queue);
        } else {
            self.doc.async_queue.push(item);
            sort_by_priority(&mut self.doc.async_queue);
        }
        self.save()
    }

    /// Pop the highest-priority synchronous work item.
    pub fn next_sync_work(&mut self) -> Result<Option<TimedWorkItem>, TemporalError> {
        if self.doc.sync_queue.is_empty() {
            return Ok(None);
        }
        let item = self.doc.sync_queue.remove(0);
        self.save()?;
        Ok(Some(item))
    }

    /// Select async work for the overnight window.
    ///
    /// Candidates are the async queue plus anything already scheduled, so
    /// re-running without completions reselects the same set. An item is
    /// selected when its dependencies are completed-overnight, its quota
    /// estimate fits the remaining budget of its tier, and its duration
    /// fits the hours left before reset. Selection runs in descending
    /// priority order.
    pub fn schedule_overnight_work(&mut self) -> Result<Vec<TimedWorkItem>, TemporalError> {
        let summary = self.tracker.summary()?;
        let mut quota_budget: HashMap<Tier, u64> = Tier::ALL
            .iter()
            .map(|&tier| {
                let remaining = summary.tier(tier).remaining.unwrap_or(u64::MAX);
                (tier, remaining)
            })
            .collect();
        let mut time_budget = self.hours_until_reset();

        let mut candidates: Vec<TimedWorkItem> = self.doc.async_queue.drain(..).collect();
        for mut item in self.doc.scheduled_async.drain(..) {
            item.status = TimedStatus::Queued;
            item.scheduled_for = None;
            candidates.push(item);
        }
        sort_by_priority(&mut candidates);

        let completed: Vec<&str> = self
            .doc
            .completed_overnight
            .iter()
            .filter(|w| w.status == TimedStatus::Completed)
            .map(|w| w.id.as_str())
            .collect();

        let now = self.clock.now_utc();
        let mut selected = Vec::new();
        let mut returned = Vec::new();

        for mut item in candidates {
            let deps_done = item
                .dependencies
                .iter()
                .all(|d| completed.contains(&d.as_str()));
            if !deps_done {
                returned.push(item);
                continue;
            }

            let tier = estimate_tier(&item);
            let budget = quota_budget.get(&tier).copied().unwrap_or(0);
            let hours = item.estimated_duration_minutes as f64 / 60.0;

            if budget >= item.estimated_quota as u64 && hours <= time_budget {
                item.status = TimedStatus::Scheduled;
                item.scheduled_for = Some(now);
                if let Some(entry) = quota_budget.get_mut(&tier) {
                    *entry = entry.saturating_sub(item.estimated_quota as u64);
                }
                time_budget -= hours;
                selected.push(item);
            } else {
                returned.push(item);
            }
        }

        info!(
            selected = selected.len(),
            returned = returned.len(),
            "overnight scheduling pass"
        );

        self.doc.async_queue = returned;
        sort_by_priority(&mut self.doc.async_queue);
        self.doc.scheduled_async = selected.clone();
        self.save()?;
        Ok(selected)
    }

    /// Scheduled items, for the overnight runner.
    pub fn scheduled(&self) -> &[TimedWorkItem] {
        &self.doc.scheduled_async
    }

    /// Move a scheduled item to the completed list.
    pub fn mark_completed(
        &mut self,
        id: &str,
        result: Option<String>,
    ) -> Result<bool, TemporalError> {
        let Some(index) = self.doc.scheduled_async.iter().position(|w| w.id == id) else {
            return Ok(false);
        };
        let mut item = self.doc.scheduled_async.remove(index);
        item.status = TimedStatus::Completed;
        item.result = result;
        self.doc.completed_overnight.push(item);
        self.save()?;
        Ok(true)
    }

    /// Move a scheduled item to the failed list.
    pub fn mark_failed(&mut self, id: &str, error: &str) -> Result<bool, TemporalError> {
        let Some(index) = self.doc.scheduled_async.iter().position(|w| w.id == id) else {
            return Ok(false);
        };
        let mut item = self.doc.scheduled_async.remove(index);
        item.status = TimedStatus::Failed;
        item.error = Some(error.to_string());
        warn!(id, error, "overnight work failed");
        self.doc.failed_work.push(item);
        self.save()?;
        Ok(true)
    }

    /// Projected quota utilization including scheduled overnight work.
    pub fn quota_forecast(&self) -> Result<HashMap<Tier, f64>, TemporalError> {
        let summary = self.tracker.summary()?;

        let mut scheduled_usage: HashMap<Tier, u64> = HashMap::new();
        for item in &self.doc.scheduled_async {
            *scheduled_usage.entry(estimate_tier(item)).or_insert(0) +=
                item.estimated_quota as u64;
        }

        let mut forecast = HashMap::new();
        for tier in Tier::ALL {
            let entry = summary.tier(tier);
            let projected = match entry.limit {
                None => 0.0,
                Some(0) => 0.0,
                Some(limit) => {
                    let total = entry.used + scheduled_usage.get(&tier).copied().unwrap_or(0);
                    total as f64 / limit as f64 * 100.0
                }
            };
            forecast.insert(tier, projected);
        }
        Ok(forecast)
    }

    pub fn status_summary(&self) -> Result<TemporalSummary, TemporalError> {
        Ok(TemporalSummary {
            sync_queue: self.doc.sync_queue.len(),
            async_queue: self.doc.async_queue.len(),
            scheduled: self.doc.scheduled_async.len(),
            completed_overnight: self.doc.completed_overnight.len(),
            failed: self.doc.failed_work.len(),
            is_active_hours: self.is_active_hours(),
            hours_until_reset: (self.hours_until_reset() * 10.0).round() / 10.0,
            quota_forecast: self.quota_forecast()?,
        })
    }
}

/// Priority-descending order; equal priorities keep insertion order.
fn sort_by_priority(items: &mut [TimedWorkItem]) {
    items.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
#[path = "temporal_tests.rs"]
mod tests;
