// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily quota tracking with reserve buffers.
//!
//! Counters reset at the first operation of a new local day. Increments
//! are linearizable across processes via the exclusive file lock on the
//! quota document.

use chrono::{DateTime, NaiveDate, Utc};
use relay_core::{Clock, Tier};
use relay_storage::{read_json_shared, update_json, DocError, LockOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from quota operations.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error(transparent)]
    Doc(#[from] DocError),
}

/// Limit and reserve buffer for one tier. `limit: None` means unlimited.
#[derive(Debug, Clone, Copy)]
pub struct TierLimit {
    pub limit: Option<u64>,
    pub buffer: f64,
}

/// Per-tier daily limits and reserve buffers.
#[derive(Debug, Clone)]
pub struct QuotaLimits {
    pub cheap: TierLimit,
    pub mid: TierLimit,
    pub strong: TierLimit,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            cheap: TierLimit {
                limit: None,
                buffer: 0.0,
            },
            mid: TierLimit {
                limit: Some(1125),
                buffer: 0.10,
            },
            strong: TierLimit {
                limit: Some(250),
                buffer: 0.20,
            },
        }
    }
}

impl QuotaLimits {
    pub fn get(&self, tier: Tier) -> TierLimit {
        match tier {
            Tier::Cheap => self.cheap,
            Tier::Mid => self.mid,
            Tier::Strong => self.strong,
        }
    }
}

/// Per-tier message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    #[serde(default)]
    pub cheap: u64,
    #[serde(default)]
    pub mid: u64,
    #[serde(default)]
    pub strong: u64,
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Cheap => self.cheap,
            Tier::Mid => self.mid,
            Tier::Strong => self.strong,
        }
    }

    fn get_mut(&mut self, tier: Tier) -> &mut u64 {
        match tier {
            Tier::Cheap => &mut self.cheap,
            Tier::Mid => &mut self.mid,
            Tier::Strong => &mut self.strong,
        }
    }
}

/// Persisted quota document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaState {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub used: TierCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl QuotaState {
    fn fresh(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            used: TierCounts::default(),
            last_updated: Some(now),
        }
    }

    /// Reset counters when the stored date is not `today`.
    fn roll_to(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        let today_str = today.format("%Y-%m-%d").to_string();
        if self.date != today_str {
            *self = Self::fresh(today, now);
        }
    }
}

/// Per-tier usage summary entry.
#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub used: u64,
    /// `None` = unlimited
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_limit: Option<u64>,
    /// `None` = unlimited
    pub remaining: Option<u64>,
    pub percent: f64,
}

/// Full usage summary.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaSummary {
    pub date: String,
    pub cheap: TierSummary,
    pub mid: TierSummary,
    pub strong: TierSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl QuotaSummary {
    pub fn tier(&self, tier: Tier) -> &TierSummary {
        match tier {
            Tier::Cheap => &self.cheap,
            Tier::Mid => &self.mid,
            Tier::Strong => &self.strong,
        }
    }
}

/// Tracks per-tier daily consumption against configured limits.
pub struct QuotaTracker {
    state_file: PathBuf,
    lock_options: LockOptions,
    limits: QuotaLimits,
    clock: Arc<dyn Clock>,
}

impl QuotaTracker {
    pub fn new(state_file: impl Into<PathBuf>, lock_options: LockOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            state_file: state_file.into(),
            lock_options: lock_options.create_if_missing(),
            limits: QuotaLimits::default(),
            clock,
        }
    }

    pub fn with_limits(mut self, limits: QuotaLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Load state, rolling counters over if the stored day is stale.
    fn load(&self) -> Result<QuotaState, QuotaError> {
        let mut state: QuotaState = read_json_shared(&self.state_file, &self.lock_options)?;
        let today = self.clock.today();
        if state.date != today.format("%Y-%m-%d").to_string() {
            let now = self.clock.now_utc();
            state = update_json(
                &self.state_file,
                &self.lock_options,
                |doc: &mut QuotaState| {
                    doc.roll_to(today, now);
                    doc.clone()
                },
            )?;
        }
        Ok(state)
    }

    /// Is quota available for this tier, respecting its reserve buffer?
    pub fn can_use(&self, tier: Tier) -> Result<bool, QuotaError> {
        let tier_limit = self.limits.get(tier);
        let Some(limit) = tier_limit.limit else {
            return Ok(true);
        };

        let state = self.load()?;
        let used = state.used.get(tier);
        let available = limit as f64 * (1.0 - tier_limit.buffer);
        Ok((used as f64) < available)
    }

    /// Add `count` messages to the tier's counter; returns the new total.
    ///
    /// `increment(tier, 0)` reads without writing.
    pub fn increment(&self, tier: Tier, count: u64) -> Result<u64, QuotaError> {
        if count == 0 {
            return Ok(self.load()?.used.get(tier));
        }

        let today = self.clock.today();
        let now = self.clock.now_utc();
        let total = update_json(
            &self.state_file,
            &self.lock_options,
            |doc: &mut QuotaState| {
                doc.roll_to(today, now);
                let counter = doc.used.get_mut(tier);
                *counter += count;
                doc.last_updated = Some(now);
                *counter
            },
        )?;
        Ok(total)
    }

    /// Current usage summary for all tiers.
    pub fn summary(&self) -> Result<QuotaSummary, QuotaError> {
        let state = self.load()?;

        let tier_summary = |tier: Tier| {
            let used = state.used.get(tier);
            let tier_limit = self.limits.get(tier);
            match tier_limit.limit {
                None => TierSummary {
                    used,
                    limit: None,
                    effective_limit: None,
                    remaining: None,
                    percent: 0.0,
                },
                Some(limit) => TierSummary {
                    used,
                    limit: Some(limit),
                    effective_limit: Some((limit as f64 * (1.0 - tier_limit.buffer)) as u64),
                    remaining: Some(limit.saturating_sub(used)),
                    percent: if limit > 0 {
                        (used as f64 / limit as f64 * 1000.0).round() / 10.0
                    } else {
                        0.0
                    },
                },
            }
        };

        Ok(QuotaSummary {
            date: state.date,
            cheap: tier_summary(Tier::Cheap),
            mid: tier_summary(Tier::Mid),
            strong: tier_summary(Tier::Strong),
            last_updated: state.last_updated,
        })
    }
}

/// Outcome of quota-aware tier selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSelection {
    Tier(Tier),
    /// All tiers exhausted for today
    DeferToTomorrow,
}

/// Tier recommendation with reasoning.
#[derive(Debug, Clone, Serialize)]
pub struct TierRecommendation {
    pub tier: Option<Tier>,
    pub complexity: u8,
    pub reasoning: Vec<String>,
    pub mid_remaining: Option<u64>,
    pub strong_remaining: Option<u64>,
}

/// Selects the cheapest capable tier with available quota.
pub struct QuotaAwareScheduler<'a> {
    tracker: &'a QuotaTracker,
}

impl<'a> QuotaAwareScheduler<'a> {
    pub fn new(tracker: &'a QuotaTracker) -> Self {
        Self { tracker }
    }

    /// Pick a tier for a 1-5 complexity estimate (clamped).
    ///
    /// 1-2 suit the cheap tier; 3-4 want mid (cheap is an acceptable
    /// fallback for 3); 5 wants strong. When the preferred tier has no
    /// quota the next capable tier is tried, ending with the
    /// `DeferToTomorrow` sentinel.
    pub fn select(&self, complexity: u8) -> Result<TierSelection, QuotaError> {
        let complexity = complexity.clamp(1, 5);

        if complexity <= 2 && self.tracker.can_use(Tier::Cheap)? {
            return Ok(TierSelection::Tier(Tier::Cheap));
        }

        if complexity <= 4 {
            if self.tracker.can_use(Tier::Mid)? {
                return Ok(TierSelection::Tier(Tier::Mid));
            }
            if complexity == 3 && self.tracker.can_use(Tier::Cheap)? {
                return Ok(TierSelection::Tier(Tier::Cheap));
            }
        }

        if self.tracker.can_use(Tier::Strong)? {
            return Ok(TierSelection::Tier(Tier::Strong));
        }
        if self.tracker.can_use(Tier::Mid)? {
            return Ok(TierSelection::Tier(Tier::Mid));
        }
        if self.tracker.can_use(Tier::Cheap)? {
            return Ok(TierSelection::Tier(Tier::Cheap));
        }

        Ok(TierSelection::DeferToTomorrow)
    }

    /// Selection plus human-readable reasoning and remaining quota.
    pub fn recommend(&self, complexity: u8) -> Result<TierRecommendation, QuotaError> {
        let selection = self.select(complexity)?;
        let summary = self.tracker.summary()?;

        let mut reasoning = Vec::new();
        let tier = match selection {
            TierSelection::Tier(Tier::Cheap) => {
                if complexity <= 2 {
                    reasoning.push("Task is mechanical, cheap tier sufficient".to_string());
                } else {
                    reasoning.push("Higher-tier quotas exhausted, using cheap tier".to_string());
                }
                Some(Tier::Cheap)
            }
            TierSelection::Tier(Tier::Mid) => {
                if complexity <= 4 {
                    reasoning.push("Task requires reasoning, mid tier appropriate".to_string());
                } else {
                    reasoning.push("Strong quota exhausted, using mid tier".to_string());
                }
                Some(Tier::Mid)
            }
            TierSelection::Tier(Tier::Strong) => {
                reasoning.push("Task requires deep analysis, using strong tier".to_string());
                Some(Tier::Strong)
            }
            TierSelection::DeferToTomorrow => {
                reasoning.push("All quotas exhausted for today".to_string());
                reasoning.push("Queue task for overnight execution or tomorrow".to_string());
                None
            }
        };

        Ok(TierRecommendation {
            tier,
            complexity: complexity.clamp(1, 5),
            reasoning,
            mid_remaining: summary.mid.remaining,
            strong_remaining: summary.strong.remaining,
        })
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
