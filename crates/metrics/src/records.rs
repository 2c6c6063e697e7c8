// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics record types.
//!
//! Every line in a daily log file is one record tagged by `record_type`.
//! Legacy lines without the tag are classified from their keys.

use relay_core::Tier;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw agent lifecycle event from hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// "agent_start" or "agent_stop"
    pub event: String,
    pub timestamp: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub agent_type: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Computed metric for one of the solutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetric {
    pub solution: String,
    pub metric_name: String,
    pub value: f64,
    pub timestamp: String,
    #[serde(default)]
    pub metadata: Value,
}

/// What the router recommended for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRecommendation {
    pub timestamp: String,
    /// Hash of the request, for privacy-preserving joins
    pub request_hash: String,
    /// "direct" or "escalate"
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Who actually handled a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTracking {
    pub timestamp: String,
    pub request_hash: String,
    /// "main" or "agent"
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_invoked: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// A metrics log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum MetricsRecord {
    AgentEvent(AgentEvent),
    SolutionMetric(SolutionMetric),
    RoutingRecommendation(RoutingRecommendation),
    RequestTracking(RequestTracking),
}

impl MetricsRecord {
    /// Parse a log line, inferring the type of legacy records that lack
    /// the `record_type` tag. Returns `None` for unclassifiable lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(record) = serde_json::from_str::<MetricsRecord>(trimmed) {
            return Some(record);
        }

        // Legacy inference by key shape
        let value: Value = serde_json::from_str(trimmed).ok()?;
        let obj = value.as_object()?;
        if obj
            .get("event")
            .and_then(Value::as_str)
            .is_some_and(|e| e == "agent_start" || e == "agent_stop")
        {
            return serde_json::from_value(value.clone())
                .ok()
                .map(MetricsRecord::AgentEvent);
        }
        if obj.contains_key("solution") && obj.contains_key("metric_name") {
            return serde_json::from_value(value.clone())
                .ok()
                .map(MetricsRecord::SolutionMetric);
        }
        None
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
