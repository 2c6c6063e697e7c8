// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing compliance analysis.
//!
//! Joins routing recommendations to request-tracking records by request
//! hash to detect directives the host ignored.

use crate::records::{MetricsRecord, RequestTracking, RoutingRecommendation};
use crate::sink::MetricsSink;
use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Privacy-preserving hash of a request (sha256, first 16 hex chars).
pub fn request_hash(request: &str) -> String {
    let digest = Sha256::digest(request.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Outcome of one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Directive was a direct route and the named agent ran
    Followed,
    /// Directive was a direct route but a different handler ran
    Ignored,
    /// Directive was an escalation; nothing specific to follow
    NoDirective,
    /// No tracking record found for the recommendation
    Unknown,
}

/// One joined recommendation/outcome pair.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRecord {
    pub timestamp: String,
    pub request_hash: String,
    pub routing_decision: String,
    pub routing_agent: Option<String>,
    pub routing_confidence: f64,
    pub actual_handler: Option<String>,
    pub agent_invoked: Option<String>,
    pub status: ComplianceStatus,
}

/// Aggregate compliance statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub total_recommendations: usize,
    pub followed: usize,
    pub ignored: usize,
    pub no_directive: usize,
    pub unknown: usize,
    /// followed / total_recommendations, as a percentage
    pub compliance_rate: f64,
    pub ignored_examples: Vec<ComplianceRecord>,
    pub by_agent: HashMap<String, AgentCompliance>,
}

/// Per-agent follow/ignore counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentCompliance {
    pub followed: usize,
    pub ignored: usize,
}

/// Analyzes compliance over a metrics date range.
pub struct ComplianceAnalyzer<'a> {
    sink: &'a MetricsSink,
}

const MAX_IGNORED_EXAMPLES: usize = 10;

impl<'a> ComplianceAnalyzer<'a> {
    pub fn new(sink: &'a MetricsSink) -> Self {
        Self { sink }
    }

    /// Build a compliance report for the inclusive date range.
    pub fn report(&self, start: NaiveDate, end: NaiveDate) -> ComplianceReport {
        let records = self.sink.read_range(start, end);

        let mut recommendations: Vec<RoutingRecommendation> = Vec::new();
        let mut tracking: HashMap<String, RequestTracking> = HashMap::new();
        for record in records {
            match record {
                MetricsRecord::RoutingRecommendation(r) => recommendations.push(r),
                MetricsRecord::RequestTracking(t) => {
                    tracking.insert(t.request_hash.clone(), t);
                }
                _ => {}
            }
        }

        let joined: Vec<ComplianceRecord> = recommendations
            .into_iter()
            .map(|rec| join_one(rec, &tracking))
            .collect();

        summarize(joined)
    }
}

fn join_one(
    rec: RoutingRecommendation,
    tracking: &HashMap<String, RequestTracking>,
) -> ComplianceRecord {
    let track = tracking.get(&rec.request_hash);

    let status = match (rec.decision.as_str(), track) {
        ("escalate", _) => ComplianceStatus::NoDirective,
        ("direct", None) => ComplianceStatus::Unknown,
        ("direct", Some(t)) => {
            if t.handler == "agent" && t.agent_invoked == rec.agent {
                ComplianceStatus::Followed
            } else {
                ComplianceStatus::Ignored
            }
        }
        _ => ComplianceStatus::Unknown,
    };

    ComplianceRecord {
        timestamp: rec.timestamp,
        request_hash: rec.request_hash,
        routing_decision: rec.decision,
        routing_agent: rec.agent,
        routing_confidence: rec.confidence,
        actual_handler: track.map(|t| t.handler.clone()),
        agent_invoked: track.and_then(|t| t.agent_invoked.clone()),
        status,
    }
}

fn summarize(joined: Vec<ComplianceRecord>) -> ComplianceReport {
    let mut report = ComplianceReport {
        total_recommendations: joined.len(),
        followed: 0,
        ignored: 0,
        no_directive: 0,
        unknown: 0,
        compliance_rate: 0.0,
        ignored_examples: Vec::new(),
        by_agent: HashMap::new(),
    };

    for record in joined {
        let agent = record.routing_agent.clone().unwrap_or_default();
        match record.status {
            ComplianceStatus::Followed => {
                report.followed += 1;
                report.by_agent.entry(agent).or_default().followed += 1;
            }
            ComplianceStatus::Ignored => {
                report.ignored += 1;
                report.by_agent.entry(agent).or_default().ignored += 1;
                if report.ignored_examples.len() < MAX_IGNORED_EXAMPLES {
                    report.ignored_examples.push(record);
                }
            }
            ComplianceStatus::NoDirective => report.no_directive += 1,
            ComplianceStatus::Unknown => report.unknown += 1,
        }
    }

    if report.total_recommendations > 0 {
        report.compliance_rate =
            report.followed as f64 / report.total_recommendations as f64 * 100.0;
    }
    report
}

#[cfg(test)]
#[path = "compliance_tests.rs"]
mod tests;
