// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overnight DAG execution.
//!
//! Runs the scheduled async set under bounded concurrency, respecting the
//! dependency graph. A stalled graph (cycle or unmet dependency) fails the
//! remaining items with a `Blocked by:` reason instead of hanging.

use crate::temporal::{estimate_tier, TemporalError, TemporalScheduler};
use chrono::{DateTime, Utc};
use relay_adapters::AgentExecutor;
use relay_core::{Clock, ShutdownFlag, TimedWorkItem};
use relay_storage::write_json_atomic;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Result text is truncated to this length before persisting.
const RESULT_TRUNCATE_LEN: usize = 500;

/// Errors from overnight execution.
#[derive(Debug, Error)]
pub enum OvernightError {
    #[error(transparent)]
    Temporal(#[from] TemporalError),
    #[error("results write failed: {0}")]
    Results(#[from] relay_storage::AtomicWriteError),
}

/// Per-item outcome in the results document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    fn ok(result: String) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one overnight run.
#[derive(Debug, Clone, Serialize)]
pub struct OvernightOutcome {
    pub timestamp: DateTime<Utc>,
    pub results: BTreeMap<String, ItemOutcome>,
}

impl OvernightOutcome {
    pub fn failure_count(&self) -> usize {
        self.results.values().filter(|o| !o.is_ok()).count()
    }
}

/// Executes the scheduled overnight set.
pub struct OvernightExecutor {
    results_dir: PathBuf,
    max_concurrent: usize,
    clock: Arc<dyn Clock>,
    shutdown: ShutdownFlag,
}

impl OvernightExecutor {
    pub fn new(
        results_dir: impl Into<PathBuf>,
        max_concurrent: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            results_dir: results_dir.into(),
            max_concurrent: max_concurrent.max(1),
            clock,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// A clone of the shutdown flag; triggering it stops new batches.
    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Execute `items` respecting dependencies, with bounded concurrency.
    ///
    /// Each finished item is marked in the scheduler immediately. The run
    /// ends when everything has finished or the remaining items are
    /// permanently blocked (those are failed with a `Blocked by:` reason).
    pub async fn run(
        &self,
        items: Vec<TimedWorkItem>,
        scheduler: &mut TemporalScheduler<'_>,
        agent_exec: Arc<dyn AgentExecutor>,
    ) -> Result<OvernightOutcome, OvernightError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        // Finished items satisfy dependents whether they succeeded or
        // failed; an unrunnable dependency must not wedge the whole run
        let mut finished: HashSet<String> = HashSet::new();
        let mut results: BTreeMap<String, ItemOutcome> = BTreeMap::new();

        info!(items = items.len(), max_concurrent = self.max_concurrent, "overnight run started");

        while finished.len() < items.len() {
            if self.shutdown.is_triggered() {
                warn!("shutdown requested, not launching further overnight work");
                break;
            }

            let ready: Vec<TimedWorkItem> = items
                .iter()
                .filter(|w| !finished.contains(&w.id))
                .filter(|w| w.dependencies.iter().all(|d| finished.contains(d)))
                .cloned()
                .collect();

            if ready.is_empty() {
                // Stalled: everything left waits on something that will
                // never complete in this run
                let stalled: Vec<(String, String)> = items
                    .iter()
                    .filter(|w| !finished.contains(&w.id))
                    .map(|item| {
                        let unmet: Vec<&str> = item
                            .dependencies
                            .iter()
                            .filter(|d| !finished.contains(d.as_str()))
                            .map(String::as_str)
                            .collect();
                        (item.id.clone(), format!("Blocked by: [{}]", unmet.join(", ")))
                    })
                    .collect();
                for (id, reason) in stalled {
                    error!(%id, %reason, "overnight item stalled");
                    scheduler.mark_failed(&id, &reason)?;
                    results.insert(id.clone(), ItemOutcome::failed(reason));
                    finished.insert(id);
                }
                break;
            }

            let mut batch: JoinSet<(String, Result<String, String>)> = JoinSet::new();
            for item in ready {
                let semaphore = Arc::clone(&semaphore);
                let agent_exec = Arc::clone(&agent_exec);
                let tier = estimate_tier(&item);
                batch.spawn(async move {
                    // Closed semaphore cannot happen: we never close it
                    let _permit = semaphore.acquire().await;
                    info!(id = %item.id, %tier, "overnight item started");
                    let outcome = agent_exec
                        .execute(&item.description, tier, item.project_path.as_deref())
                        .await
                        .map(|value| render_result(&value))
                        .map_err(|e| e.to_string());
                    (item.id, outcome)
                });
            }

            while let Some(joined) = batch.join_next().await {
                let (id, outcome) = match joined {
                    Ok(pair) => pair,
                    Err(join_error) => {
                        warn!(error = %join_error, "overnight task panicked or was cancelled");
                        continue;
                    }
                };

                match outcome {
                    Ok(result) => {
                        let truncated: String =
                            result.chars().take(RESULT_TRUNCATE_LEN).collect();
                        scheduler.mark_completed(&id, Some(truncated.clone()))?;
                        results.insert(id.clone(), ItemOutcome::ok(truncated));
                        info!(%id, "overnight item completed");
                    }
                    Err(message) => {
                        scheduler.mark_failed(&id, &message)?;
                        results.insert(id.clone(), ItemOutcome::failed(message));
                    }
                }
                finished.insert(id);
            }
        }

        let outcome = OvernightOutcome {
            timestamp: self.clock.now_utc(),
            results,
        };
        self.write_results(&outcome)?;
        Ok(outcome)
    }

    /// Persist the run's results as a dated document, mode 0600.
    fn write_results(&self, outcome: &OvernightOutcome) -> Result<(), OvernightError> {
        let stamp = self.clock.now_local().format("%Y%m%d-%H%M%S");
        let path = self.results_dir.join(format!("results-{stamp}.json"));
        write_json_atomic(&path, outcome)?;
        info!(path = %path.display(), "overnight results saved");
        Ok(())
    }
}

/// Render an agent result value as text.
fn render_result(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "overnight_tests.rs"]
mod tests;
