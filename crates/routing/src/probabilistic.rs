// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Confidence-classified routing with a learned success table.
//!
//! A fixed pattern catalog maps requests to tiers; the transform category
//! additionally consults the historical success rate of the cheap tier, so
//! routing adapts as outcomes accumulate.

use chrono::{DateTime, Utc};
use regex::Regex;
use relay_core::{Clock, RoutingConfidence, RoutingDecision, Tier};
use relay_storage::{read_json_shared, update_json, DocError, LockOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

/// Success rate assumed for a (tier, task type) pair with no history.
const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// Cheap-tier transform routing requires at least this success rate.
const TRANSFORM_RATE_FLOOR: f64 = 0.8;

macro_rules! pattern_set {
    ($name:ident, [$($pattern:literal),+ $(,)?]) => {
        #[allow(clippy::expect_used)]
        static $name: LazyLock<Vec<Regex>> = LazyLock::new(|| {
            [$($pattern),+]
                .into_iter()
                .map(|p| Regex::new(p).expect("constant regex pattern is valid"))
                .collect()
        });
    };
}

pattern_set!(
    MECHANICAL,
    [
        r"fix syntax error",
        r"remove trailing whitespace",
        r"add missing import",
        r"rename variable \w+ to \w+",
        r"delete lines? \d+",
        r"format (code|file)",
        r"sort (imports|lines)",
        r"fix (typo|spelling)",
        r"add (semicolon|comma|bracket)",
        r"remove (unused|dead) (code|import)",
    ]
);

pattern_set!(
    READ_ONLY,
    [
        r"find (all|files|occurrences)",
        r"list \w+",
        r"show (me )?",
        r"count \w+",
        r"search for",
        r"grep",
        r"what (files|functions|classes)",
        r"where is",
    ]
);

pattern_set!(
    TRANSFORM,
    [
        r"convert \w+ to \w+",
        r"replace \w+ with \w+",
        r"extract \w+ from",
        r"merge (files|data)",
        r"split \w+ into",
        r"move \w+ to",
        r"copy \w+ to",
    ]
);

pattern_set!(
    JUDGMENT,
    [
        r"(design|architect|plan)",
        r"(which|what) (is|should|would)",
        r"recommend",
        r"best (approach|way|practice)",
        r"analyze (and|for)",
        r"review (and|for)",
        r"evaluate",
        r"compare",
        r"trade-?offs?",
        r"pros? (and|&) cons?",
    ]
);

pattern_set!(
    COMPLEX_REASONING,
    [
        r"(prove|proof|theorem)",
        r"formal(ize|ly)",
        r"mathematical",
        r"verify correctness",
        r"logical (deduction|inference)",
        r"deep analysis",
    ]
);

pattern_set!(
    DESTRUCTIVE,
    [r"delete", r"remove", r"drop", r"destroy", r"overwrite", r"reset"]
);

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Classify a request into a task type for outcome learning.
pub fn classify_task_type(request: &str) -> &'static str {
    let lower = request.to_lowercase();
    if ["fix", "syntax", "format", "lint"].iter().any(|kw| lower.contains(kw)) {
        return "mechanical";
    }
    if ["find", "search", "list", "show"].iter().any(|kw| lower.contains(kw)) {
        return "readonly";
    }
    if ["convert", "replace", "extract", "merge"].iter().any(|kw| lower.contains(kw)) {
        return "transform";
    }
    if ["analyze", "review", "design", "plan"].iter().any(|kw| lower.contains(kw)) {
        return "judgment";
    }
    "general"
}

/// Persisted success table: tier → task type → counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryDoc {
    #[serde(default)]
    success_history: HashMap<Tier, HashMap<String, TaskStats>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct TaskStats {
    attempts: u64,
    successes: u64,
}

/// Per-(tier, task type) statistics for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingStats {
    pub attempts: u64,
    pub successes: u64,
    pub success_rate: f64,
}

/// Probabilistic router with persisted outcome learning.
pub struct ProbabilisticRouter {
    history_file: PathBuf,
    lock_options: LockOptions,
    clock: Arc<dyn Clock>,
    history: HistoryDoc,
}

impl ProbabilisticRouter {
    /// Load the router, reading any existing history.
    pub fn new(
        history_file: impl Into<PathBuf>,
        lock_options: LockOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DocError> {
        let history_file = history_file.into();
        // The history file is created on first write
        let lock_options = lock_options.create_if_missing();
        let history: HistoryDoc = read_json_shared(&history_file, &lock_options)?;
        Ok(Self {
            history_file,
            lock_options,
            clock,
            history,
        })
    }

    /// Classify a request and return a tier decision with confidence,
    /// fallback chain, and validation criteria.
    pub fn route(&self, request: &str) -> RoutingDecision {
        let lower = request.to_lowercase();

        if matches_any(&MECHANICAL, &lower) {
            return RoutingDecision {
                recommended_tier: Tier::Cheap,
                confidence: RoutingConfidence::High,
                fallback_chain: vec![Tier::Mid, Tier::Strong],
                validation_criteria: tags(&["syntax_valid", "no_logic_change"]),
                reasoning: "Mechanical task with clear rules".to_string(),
            };
        }

        if matches_any(&READ_ONLY, &lower) {
            return RoutingDecision {
                recommended_tier: Tier::Cheap,
                confidence: RoutingConfidence::High,
                fallback_chain: vec![Tier::Mid],
                validation_criteria: tags(&["results_found"]),
                reasoning: "Read-only operation".to_string(),
            };
        }

        if matches_any(&TRANSFORM, &lower) {
            let rate = self.success_rate(Tier::Cheap, "transform");
            if rate > TRANSFORM_RATE_FLOOR {
                return RoutingDecision {
                    recommended_tier: Tier::Cheap,
                    confidence: RoutingConfidence::Medium,
                    fallback_chain: vec![Tier::Mid, Tier::Strong],
                    validation_criteria: tags(&["output_valid", "user_verify"]),
                    reasoning: format!("Transform task (success rate: {:.0}%)", rate * 100.0),
                };
            }
            return RoutingDecision {
                recommended_tier: Tier::Mid,
                confidence: RoutingConfidence::High,
                fallback_chain: vec![Tier::Strong],
                validation_criteria: Vec::new(),
                reasoning: format!(
                    "Transform task, cheap success rate too low ({:.0}%)",
                    rate * 100.0
                ),
            };
        }

        if matches_any(&JUDGMENT, &lower) {
            return RoutingDecision {
                recommended_tier: Tier::Mid,
                confidence: RoutingConfidence::High,
                fallback_chain: vec![Tier::Strong],
                validation_criteria: Vec::new(),
                reasoning: "Requires judgment or analysis".to_string(),
            };
        }

        if matches_any(&COMPLEX_REASONING, &lower) {
            return RoutingDecision {
                recommended_tier: Tier::Strong,
                confidence: RoutingConfidence::High,
                fallback_chain: Vec::new(),
                validation_criteria: Vec::new(),
                reasoning: "Requires complex reasoning".to_string(),
            };
        }

        if matches_any(&DESTRUCTIVE, &lower) {
            return RoutingDecision {
                recommended_tier: Tier::Mid,
                confidence: RoutingConfidence::Medium,
                fallback_chain: vec![Tier::Strong],
                validation_criteria: tags(&["user_verify"]),
                reasoning: "Destructive operation requires caution".to_string(),
            };
        }

        RoutingDecision {
            recommended_tier: Tier::Mid,
            confidence: RoutingConfidence::Medium,
            fallback_chain: vec![Tier::Strong],
            validation_criteria: Vec::new(),
            reasoning: "Default routing".to_string(),
        }
    }

    /// Historical success rate for a tier on a task type.
    pub fn success_rate(&self, tier: Tier, task_type: &str) -> f64 {
        let stats = self
            .history
            .success_history
            .get(&tier)
            .and_then(|tasks| tasks.get(task_type));
        match stats {
            Some(s) if s.attempts > 0 => s.successes as f64 / s.attempts as f64,
            _ => DEFAULT_SUCCESS_RATE,
        }
    }

    /// Record an execution outcome and persist the updated table.
    pub fn record_outcome(
        &mut self,
        tier: Tier,
        task_type: &str,
        success: bool,
    ) -> Result<(), DocError> {
        let now = self.clock.now_utc();
        let task = task_type.to_string();
        update_json(
            &self.history_file,
            &self.lock_options,
            |doc: &mut HistoryDoc| {
                let stats = doc
                    .success_history
                    .entry(tier)
                    .or_default()
                    .entry(task)
                    .or_default();
                stats.attempts += 1;
                if success {
                    stats.successes += 1;
                }
                doc.last_updated = Some(now);
            },
        )?;

        // Keep the in-memory view coherent with what we just persisted
        let stats = self
            .history
            .success_history
            .entry(tier)
            .or_default()
            .entry(task_type.to_string())
            .or_default();
        stats.attempts += 1;
        if success {
            stats.successes += 1;
        }
        Ok(())
    }

    /// Per-tier statistics for reporting.
    pub fn statistics(&self) -> HashMap<Tier, HashMap<String, RoutingStats>> {
        self.history
            .success_history
            .iter()
            .map(|(tier, tasks)| {
                let stats = tasks
                    .iter()
                    .map(|(task, s)| {
                        (
                            task.clone(),
                            RoutingStats {
                                attempts: s.attempts,
                                successes: s.successes,
                                success_rate: if s.attempts > 0 {
                                    s.successes as f64 / s.attempts as f64
                                } else {
                                    0.0
                                },
                            },
                        )
                    })
                    .collect();
                (*tier, stats)
            })
            .collect()
    }
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
#[path = "probabilistic_tests.rs"]
mod tests;
