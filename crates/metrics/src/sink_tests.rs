// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use relay_core::FakeClock;
use tempfile::TempDir;

fn fixed_clock() -> Arc<FakeClock> {
    Arc::new(FakeClock::new(
        chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
    ))
}

fn event(tier: Tier) -> AgentEvent {
    AgentEvent {
        event: "agent_stop".to_string(),
        timestamp: "2026-07-01T10:00:00Z".to_string(),
        project: "demo".to_string(),
        agent_type: format!("{tier}-general"),
        agent_id: "a1".to_string(),
        model_tier: Some(tier),
        exit_status: Some("0".to_string()),
        description: String::new(),
        duration_ms: None,
    }
}

#[test]
fn record_appends_to_daily_file() {
    let dir = TempDir::new().unwrap();
    let clock = fixed_clock();
    let sink = MetricsSink::new(dir.path(), clock.clone());

    sink.record(&MetricsRecord::AgentEvent(event(Tier::Cheap)))
        .unwrap();
    sink.record(&MetricsRecord::AgentEvent(event(Tier::Mid)))
        .unwrap();

    let path = dir.path().join("2026-07-01.jsonl");
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);

    let records = sink.read_day(clock.today());
    assert_eq!(records.len(), 2);
}

#[test]
fn reader_tolerates_torn_trailing_line() {
    let dir = TempDir::new().unwrap();
    let sink = MetricsSink::new(dir.path(), fixed_clock());
    sink.record(&MetricsRecord::AgentEvent(event(Tier::Cheap)))
        .unwrap();

    // Simulate a concurrent appender caught mid-write
    let path = dir.path().join("2026-07-01.jsonl");
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{\"record_type\":\"agent_ev");
    std::fs::write(&path, content).unwrap();

    let records = sink.read_day(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
    assert_eq!(records.len(), 1);
}

#[test]
fn solution_metric_is_stamped_with_clock_time() {
    let dir = TempDir::new().unwrap();
    let sink = MetricsSink::new(dir.path(), fixed_clock());
    sink.record_solution_metric(
        "adaptive_orchestration",
        "complexity_classification",
        1.0,
        serde_json::json!({"complexity_level": "simple"}),
    )
    .unwrap();

    let records = sink.read_day(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
    match &records[0] {
        MetricsRecord::SolutionMetric(m) => {
            assert!(m.timestamp.starts_with("2026-07-01T12:00:00"));
            assert_eq!(m.metadata["complexity_level"], "simple");
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn cleanup_removes_only_expired_dated_files() {
    let dir = TempDir::new().unwrap();
    let sink = MetricsSink::new(dir.path(), fixed_clock());

    std::fs::write(dir.path().join("2026-01-01.jsonl"), "").unwrap();
    std::fs::write(dir.path().join("2026-06-30.jsonl"), "").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

    let removed = sink.cleanup(90).unwrap();
    assert_eq!(removed, 1);
    assert!(!dir.path().join("2026-01-01.jsonl").exists());
    assert!(dir.path().join("2026-06-30.jsonl").exists());
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn efficiency_report_vs_all_mid_baseline() {
    let events = vec![event(Tier::Cheap), event(Tier::Cheap), event(Tier::Mid)];
    let report = MetricsSink::efficiency(&events);

    assert_eq!(report.total_invocations, 3);
    // 2 cheap (1 each) + 1 mid (12) = 14 actual vs 36 baseline
    assert_eq!(report.actual_cost_units, 14);
    assert_eq!(report.baseline_cost_units, 36);
    assert_eq!(report.savings_units, 22);
}

#[test]
fn daily_report_computes_escalation_rate() {
    let dir = TempDir::new().unwrap();
    let clock = fixed_clock();
    let sink = MetricsSink::new(dir.path(), clock.clone());

    for tier in [Tier::Cheap, Tier::Cheap, Tier::Mid, Tier::Strong] {
        sink.record(&MetricsRecord::AgentEvent(event(tier))).unwrap();
    }

    let report = sink.daily_report(clock.today());
    assert_eq!(report.agent_events, 4);
    assert_eq!(report.escalation_rate_percent, 50.0);
}

#[test]
fn target_status_bands() {
    let sink = MetricsSink::new("/tmp/unused", fixed_clock());
    assert_eq!(
        sink.target_status("cheap_routing", "escalation_rate", 35.0),
        TargetStatus::OnTarget
    );
    assert_eq!(
        sink.target_status("cheap_routing", "escalation_rate", 42.0),
        TargetStatus::Warning
    );
    assert_eq!(
        sink.target_status("cheap_routing", "escalation_rate", 80.0),
        TargetStatus::Critical
    );
    assert_eq!(
        sink.target_status("unknown_solution", "x", 1.0),
        TargetStatus::Unknown
    );
}
