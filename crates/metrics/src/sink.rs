// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-day metrics log.
//!
//! Records land in `<metrics_dir>/<YYYY-MM-DD>.jsonl`. Each record is
//! appended as one `write` of a single line, so concurrent appenders
//! interleave whole lines and readers at worst see one torn trailing line
//! (which they skip).

use crate::records::{AgentEvent, MetricsRecord, SolutionMetric};
use chrono::{Duration, NaiveDate};
use relay_core::{Clock, Tier};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Relative cost units per tier, for efficiency reporting.
const COST_RATIO: [(Tier, u64); 3] = [(Tier::Cheap, 1), (Tier::Mid, 12), (Tier::Strong, 60)];

/// Errors from sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Status of a metric against its target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    OnTarget,
    Warning,
    Critical,
    Unknown,
}

/// Cost efficiency analysis against an all-mid baseline.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyReport {
    pub tier_distribution: HashMap<Tier, u64>,
    pub total_invocations: u64,
    pub actual_cost_units: u64,
    pub baseline_cost_units: u64,
    pub savings_units: i64,
    pub savings_percent: f64,
}

/// Aggregated view of one day of records.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub agent_events: usize,
    pub tier_counts: HashMap<Tier, u64>,
    pub escalation_rate_percent: f64,
    pub solution_metrics: usize,
    pub efficiency: EfficiencyReport,
}

/// Append-only metrics sink.
pub struct MetricsSink {
    metrics_dir: PathBuf,
    clock: Arc<dyn Clock>,
    /// solution → metric → (min, max) target band
    targets: HashMap<String, HashMap<String, (f64, f64)>>,
}

impl MetricsSink {
    pub fn new(metrics_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            metrics_dir: metrics_dir.into(),
            clock,
            targets: default_targets(),
        }
    }

    /// Replace the default target bands (domain override).
    pub fn with_targets(
        mut self,
        targets: HashMap<String, HashMap<String, (f64, f64)>>,
    ) -> Self {
        self.targets = targets;
        self
    }

    fn day_file(&self, date: NaiveDate) -> PathBuf {
        self.metrics_dir.join(format!("{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append one record to today's log.
    pub fn record(&self, record: &MetricsRecord) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.metrics_dir)?;
        let path = self.day_file(self.clock.today());

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        // One write call per record keeps concurrent appends line-atomic
        file.write_all(&line)?;
        Ok(())
    }

    /// Convenience: record a solution metric stamped with the current time.
    pub fn record_solution_metric(
        &self,
        solution: &str,
        metric_name: &str,
        value: f64,
        metadata: Value,
    ) -> Result<(), SinkError> {
        self.record(&MetricsRecord::SolutionMetric(SolutionMetric {
            solution: solution.to_string(),
            metric_name: metric_name.to_string(),
            value,
            timestamp: self.clock.now_utc().to_rfc3339(),
            metadata,
        }))
    }

    /// Read all classifiable records for one day.
    pub fn read_day(&self, date: NaiveDate) -> Vec<MetricsRecord> {
        let path = self.day_file(date);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        content
            .lines()
            .filter_map(MetricsRecord::parse_line)
            .collect()
    }

    /// Read records for an inclusive date range.
    pub fn read_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<MetricsRecord> {
        let mut records = Vec::new();
        let mut date = start;
        while date <= end {
            records.extend(self.read_day(date));
            date += Duration::days(1);
        }
        records
    }

    /// Agent events over the trailing `days` days (today inclusive).
    pub fn recent_agent_events(&self, days: i64) -> Vec<AgentEvent> {
        let end = self.clock.today();
        let start = end - Duration::days(days.max(0));
        self.read_range(start, end)
            .into_iter()
            .filter_map(|r| match r {
                MetricsRecord::AgentEvent(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Remove daily files older than the retention window.
    ///
    /// Returns the number of files removed. Files whose names do not parse
    /// as dates are left alone.
    pub fn cleanup(&self, retention_days: i64) -> Result<usize, SinkError> {
        let cutoff = self.clock.today() - Duration::days(retention_days);
        let mut removed = 0;

        let entries = match std::fs::read_dir(&self.metrics_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".jsonl")) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") else {
                continue;
            };
            if date < cutoff {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => {
                        debug!(file = %entry.path().display(), "removed expired metrics file");
                        removed += 1;
                    }
                    Err(e) => {
                        warn!(file = %entry.path().display(), error = %e, "cleanup failed");
                    }
                }
            }
        }
        Ok(removed)
    }

    /// Status of a metric value against the configured target band.
    pub fn target_status(&self, solution: &str, metric: &str, value: f64) -> TargetStatus {
        let Some((min, max)) = self
            .targets
            .get(solution)
            .and_then(|metrics| metrics.get(metric))
            .copied()
        else {
            return TargetStatus::Unknown;
        };

        if value >= min && value <= max {
            return TargetStatus::OnTarget;
        }
        let span = (max - min).max(1.0);
        let distance = if value < min { min - value } else { value - max };
        if distance <= span * 0.5 {
            TargetStatus::Warning
        } else {
            TargetStatus::Critical
        }
    }

    /// Cost efficiency of a set of agent events vs an all-mid baseline.
    pub fn efficiency(events: &[AgentEvent]) -> EfficiencyReport {
        let mut tier_distribution: HashMap<Tier, u64> = HashMap::new();
        for event in events {
            if let Some(tier) = event.model_tier {
                *tier_distribution.entry(tier).or_insert(0) += 1;
            }
        }

        let total: u64 = tier_distribution.values().sum();
        let cost_of = |tier: Tier| -> u64 {
            COST_RATIO
                .iter()
                .find(|(t, _)| *t == tier)
                .map(|(_, c)| *c)
                .unwrap_or(12)
        };
        let actual: u64 = tier_distribution
            .iter()
            .map(|(tier, count)| cost_of(*tier) * count)
            .sum();
        let baseline = total * cost_of(Tier::Mid);
        let savings = baseline as i64 - actual as i64;

        EfficiencyReport {
            tier_distribution,
            total_invocations: total,
            actual_cost_units: actual,
            baseline_cost_units: baseline,
            savings_units: savings,
            savings_percent: if baseline > 0 {
                (savings as f64 / baseline as f64) * 100.0
            } else {
                0.0
            },
        }
    }

    /// Aggregate one day of records into a report.
    pub fn daily_report(&self, date: NaiveDate) -> DailyReport {
        let records = self.read_day(date);

        let mut events = Vec::new();
        let mut solution_metrics = 0usize;
        for record in records {
            match record {
                MetricsRecord::AgentEvent(e) => events.push(e),
                MetricsRecord::SolutionMetric(_) => solution_metrics += 1,
                _ => {}
            }
        }

        let efficiency = Self::efficiency(&events);
        let total = efficiency.total_invocations;
        let escalated = efficiency
            .tier_distribution
            .iter()
            .filter(|(tier, _)| **tier != Tier::Cheap)
            .map(|(_, count)| count)
            .sum::<u64>();

        DailyReport {
            date,
            agent_events: events.len(),
            tier_counts: efficiency.tier_distribution.clone(),
            escalation_rate_percent: if total > 0 {
                escalated as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            solution_metrics,
            efficiency,
        }
    }
}

/// Default target bands per solution.
fn default_targets() -> HashMap<String, HashMap<String, (f64, f64)>> {
    let mut targets = HashMap::new();
    let mut insert = |solution: &str, metric: &str, band: (f64, f64)| {
        targets
            .entry(solution.to_string())
            .or_insert_with(HashMap::new)
            .insert(metric.to_string(), band);
    };

    insert("cheap_routing", "escalation_rate", (30.0, 40.0));
    insert("work_coordination", "completion_rate", (90.0, 100.0));
    insert("temporal_optimization", "quota_utilization", (80.0, 90.0));
    insert("probabilistic_routing", "optimistic_success", (85.0, 100.0));
    insert("state_continuity", "save_success", (98.0, 100.0));
    targets
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
