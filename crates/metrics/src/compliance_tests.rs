// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::records::MetricsRecord;
use chrono::TimeZone;
use relay_core::FakeClock;
use std::sync::Arc;
use tempfile::TempDir;

fn sink(dir: &TempDir) -> MetricsSink {
    MetricsSink::new(
        dir.path(),
        Arc::new(FakeClock::new(
            chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
        )),
    )
}

fn recommendation(hash: &str, decision: &str, agent: Option<&str>) -> MetricsRecord {
    MetricsRecord::RoutingRecommendation(RoutingRecommendation {
        timestamp: "2026-07-01T10:00:00Z".to_string(),
        request_hash: hash.to_string(),
        decision: decision.to_string(),
        agent: agent.map(String::from),
        confidence: 0.9,
        reason: String::new(),
        project: None,
    })
}

fn tracked(hash: &str, handler: &str, agent: Option<&str>) -> MetricsRecord {
    MetricsRecord::RequestTracking(RequestTracking {
        timestamp: "2026-07-01T10:00:05Z".to_string(),
        request_hash: hash.to_string(),
        handler: handler.to_string(),
        agent_invoked: agent.map(String::from),
        project: None,
    })
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

#[test]
fn request_hash_is_stable_and_short() {
    let a = request_hash("Fix typo in README.md");
    let b = request_hash("Fix typo in README.md");
    let c = request_hash("Different request");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 16);
}

#[test]
fn followed_and_ignored_are_classified() {
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir);

    sink.record(&recommendation("h1", "direct", Some("cheap-general"))).unwrap();
    sink.record(&tracked("h1", "agent", Some("cheap-general"))).unwrap();

    sink.record(&recommendation("h2", "direct", Some("cheap-general"))).unwrap();
    sink.record(&tracked("h2", "main", None)).unwrap();

    let report = ComplianceAnalyzer::new(&sink).report(day(), day());
    assert_eq!(report.total_recommendations, 2);
    assert_eq!(report.followed, 1);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.compliance_rate, 50.0);
    assert_eq!(report.ignored_examples.len(), 1);
    assert_eq!(report.ignored_examples[0].request_hash, "h2");
}

#[test]
fn escalations_carry_no_directive() {
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir);
    sink.record(&recommendation("h3", "escalate", None)).unwrap();

    let report = ComplianceAnalyzer::new(&sink).report(day(), day());
    assert_eq!(report.no_directive, 1);
    assert_eq!(report.compliance_rate, 0.0);
}

#[test]
fn rate_counts_every_recommendation() {
    // Escalations carry no directive but still dilute the rate
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir);

    sink.record(&recommendation("f1", "direct", Some("cheap-general"))).unwrap();
    sink.record(&tracked("f1", "agent", Some("cheap-general"))).unwrap();
    sink.record(&recommendation("i1", "direct", Some("cheap-general"))).unwrap();
    sink.record(&tracked("i1", "main", None)).unwrap();
    sink.record(&recommendation("e1", "escalate", None)).unwrap();
    sink.record(&recommendation("e2", "escalate", None)).unwrap();

    let report = ComplianceAnalyzer::new(&sink).report(day(), day());
    assert_eq!(report.total_recommendations, 4);
    assert_eq!(report.followed, 1);
    assert_eq!(report.compliance_rate, 25.0);
}

#[test]
fn untracked_direct_is_unknown() {
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir);
    sink.record(&recommendation("h4", "direct", Some("mid-general"))).unwrap();

    let report = ComplianceAnalyzer::new(&sink).report(day(), day());
    assert_eq!(report.unknown, 1);
}

#[test]
fn by_agent_breakdown_accumulates() {
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir);

    for (hash, followed) in [("a", true), ("b", true), ("c", false)] {
        sink.record(&recommendation(hash, "direct", Some("cheap-general"))).unwrap();
        if followed {
            sink.record(&tracked(hash, "agent", Some("cheap-general"))).unwrap();
        } else {
            sink.record(&tracked(hash, "main", None)).unwrap();
        }
    }

    let report = ComplianceAnalyzer::new(&sink).report(day(), day());
    let agent = &report.by_agent["cheap-general"];
    assert_eq!(agent.followed, 2);
    assert_eq!(agent.ignored, 1);
}
