// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use relay_adapters::FakeAgentExecutor;
use relay_core::FakeClock;
use relay_storage::LockOptions;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn executor(dir: &TempDir) -> OptimisticExecutor {
    let router = ProbabilisticRouter::new(
        dir.path().join("routing-history.json"),
        LockOptions::default(),
        Arc::new(FakeClock::new(
            chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
        )),
    )
    .unwrap();
    OptimisticExecutor::new(router, ResultValidator::default())
}

/// Test command that fails on its first run and passes afterwards.
///
/// Keeps a marker file in `dir` so the validator sees a failure for the
/// first tier and a pass for the escalated one.
fn fail_once_test_command(dir: &TempDir, stderr: &str) -> ValidationContext {
    ValidationContext {
        test_command: Some(vec![
            "sh".to_string(),
            "-c".to_string(),
            format!(
                "test -f ran-once && exit 0; touch ran-once; echo '{stderr}' >&2; exit 1"
            ),
        ]),
        cwd: Some(dir.path().to_path_buf()),
    }
}

#[tokio::test]
async fn no_criteria_is_optimistic_success() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();

    // "analyze and ..." routes to mid with no validation criteria
    let outcome = executor
        .execute(
            "analyze and compare the options",
            &ValidationContext::default(),
            &fake,
        )
        .await
        .unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Mid]);
    assert_eq!(fake.tiers_tried(), vec![Tier::Mid]);
    assert_eq!(executor.escalation_rate(), 0.0);

    let stats = executor.router().statistics();
    assert_eq!(stats[&Tier::Mid]["judgment"].successes, 1);
}

#[tokio::test]
async fn passing_validation_stays_on_recommended_tier() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    fake.enqueue(Tier::Cheap, json!(["src/main.rs"]));

    let outcome = executor
        .execute("search for the entry point", &ValidationContext::default(), &fake)
        .await
        .unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap]);
}

#[tokio::test]
async fn failed_validation_escalates_to_next_tier() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    // Cheap finds nothing; mid finds a hit
    fake.enqueue(Tier::Cheap, json!([]));
    fake.enqueue(Tier::Mid, json!(["core/src/lib.rs"]));

    let outcome = executor
        .execute("search for the entry point", &ValidationContext::default(), &fake)
        .await
        .unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap, Tier::Mid]);
    assert_eq!(executor.escalation_rate(), 1.0);
}

#[tokio::test]
async fn mechanical_failure_walks_chain_without_skipping() {
    // Cheap-tier fix fails tests mechanically; mid passes.
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    let context = fail_once_test_command(&dir, "Tests failed");

    let outcome = executor
        .execute("fix typo in the readme", &context, &fake)
        .await
        .unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap, Tier::Mid]);
    assert_eq!(fake.tiers_tried(), vec![Tier::Cheap, Tier::Mid]);

    let stats = executor.router().statistics();
    assert_eq!(stats[&Tier::Cheap]["mechanical"].attempts, 1);
    assert_eq!(stats[&Tier::Cheap]["mechanical"].successes, 0);
    assert_eq!(stats[&Tier::Mid]["mechanical"].successes, 1);
}

#[tokio::test]
async fn reasoning_failure_skips_intermediate_tier() {
    // The failure reason reveals a logic-level problem, so mid is skipped
    // and execution goes straight to strong.
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    let context =
        fail_once_test_command(&dir, "Assertion error: incorrect logic in algorithm");

    let outcome = executor
        .execute("fix typo in the readme", &context, &fake)
        .await
        .unwrap();

    assert!(outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap, Tier::Strong]);
    assert_eq!(fake.tiers_tried(), vec![Tier::Cheap, Tier::Strong]);
}

#[tokio::test]
async fn exhausted_chain_returns_last_result() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    // Every tier returns empty results
    fake.enqueue(Tier::Cheap, json!([]));
    fake.enqueue(Tier::Mid, json!([]));

    let outcome = executor
        .execute("search for the entry point", &ValidationContext::default(), &fake)
        .await
        .unwrap();

    assert!(!outcome.passed);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap, Tier::Mid]);
    assert_eq!(outcome.last_failure.as_deref(), Some("No results found"));
    assert_eq!(outcome.result, json!([]));
}

#[tokio::test]
async fn tried_tiers_are_prefix_of_decision_chain_with_skips() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    let context = fail_once_test_command(&dir, "conceptual misunderstanding of the data model");

    let outcome = executor
        .execute("fix typo in the readme", &context, &fake)
        .await
        .unwrap();

    // Full chain is [cheap, mid, strong]; mid was skipped for the
    // reasoning-level failure
    let full: Vec<Tier> = std::iter::once(outcome.decision.recommended_tier)
        .chain(outcome.decision.fallback_chain.iter().copied())
        .collect();
    assert_eq!(full, vec![Tier::Cheap, Tier::Mid, Tier::Strong]);
    assert_eq!(outcome.escalation_path, vec![Tier::Cheap, Tier::Strong]);
}

#[tokio::test]
async fn agent_errors_propagate() {
    let dir = TempDir::new().unwrap();
    let mut executor = executor(&dir);
    let fake = FakeAgentExecutor::new();
    fake.enqueue_error(Tier::Mid, "spawn exploded");

    let err = executor
        .execute(
            "analyze and compare the options",
            &ValidationContext::default(),
            &fake,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::Agent(_)));
}
