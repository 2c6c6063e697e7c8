// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use relay_core::FakeClock;
use tempfile::TempDir;
use yare::parameterized;

fn router(dir: &TempDir) -> ProbabilisticRouter {
    ProbabilisticRouter::new(
        dir.path().join("routing-history.json"),
        LockOptions::default(),
        Arc::new(FakeClock::new(
            chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
        )),
    )
    .unwrap()
}

#[test]
fn mechanical_routes_cheap_with_full_chain() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("fix typo in the readme");

    assert_eq!(decision.recommended_tier, Tier::Cheap);
    assert_eq!(decision.confidence, RoutingConfidence::High);
    assert_eq!(decision.fallback_chain, vec![Tier::Mid, Tier::Strong]);
    assert_eq!(
        decision.validation_criteria,
        vec!["syntax_valid", "no_logic_change"]
    );
}

#[test]
fn read_only_routes_cheap_with_results_check() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("search for usages of the config loader");

    assert_eq!(decision.recommended_tier, Tier::Cheap);
    assert_eq!(decision.fallback_chain, vec![Tier::Mid]);
    assert_eq!(decision.validation_criteria, vec!["results_found"]);
}

#[test]
fn transform_with_no_history_routes_mid() {
    // Default success rate is 0.5, below the 0.8 floor
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("convert config to yaml");

    assert_eq!(decision.recommended_tier, Tier::Mid);
    assert_eq!(decision.confidence, RoutingConfidence::High);
    assert!(decision.validation_criteria.is_empty());
}

#[test]
fn transform_with_good_history_routes_cheap() {
    let dir = TempDir::new().unwrap();
    let mut router = router(&dir);
    for _ in 0..9 {
        router.record_outcome(Tier::Cheap, "transform", true).unwrap();
    }
    router.record_outcome(Tier::Cheap, "transform", false).unwrap();

    let decision = router.route("convert config to yaml");
    assert_eq!(decision.recommended_tier, Tier::Cheap);
    assert_eq!(decision.confidence, RoutingConfidence::Medium);
    assert_eq!(
        decision.validation_criteria,
        vec!["output_valid", "user_verify"]
    );
    assert!(decision.reasoning.contains("90%"));
}

#[test]
fn judgment_routes_mid_high() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("evaluate these two libraries");
    assert_eq!(decision.recommended_tier, Tier::Mid);
    assert_eq!(decision.fallback_chain, vec![Tier::Strong]);
}

#[test]
fn complex_reasoning_routes_strong_no_fallback() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("prove this invariant holds");
    assert_eq!(decision.recommended_tier, Tier::Strong);
    assert!(decision.fallback_chain.is_empty());
}

#[test]
fn destructive_routes_mid_with_user_verify() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("drop the staging tables");
    assert_eq!(decision.recommended_tier, Tier::Mid);
    assert_eq!(decision.confidence, RoutingConfidence::Medium);
    assert_eq!(decision.validation_criteria, vec!["user_verify"]);
}

#[test]
fn default_routes_mid_medium() {
    let dir = TempDir::new().unwrap();
    let decision = router(&dir).route("help with the thing");
    assert_eq!(decision.recommended_tier, Tier::Mid);
    assert_eq!(decision.confidence, RoutingConfidence::Medium);
    assert_eq!(decision.reasoning, "Default routing");
}

#[test]
fn fallback_chains_are_strictly_ascending() {
    let dir = TempDir::new().unwrap();
    let router = router(&dir);
    for request in [
        "fix typo in the readme",
        "search for foo",
        "convert a to b",
        "evaluate options",
        "prove it",
        "drop everything",
        "misc request",
    ] {
        let decision = router.route(request);
        let mut previous = decision.recommended_tier;
        for tier in &decision.fallback_chain {
            assert!(*tier > previous, "chain not ascending for {request:?}");
            previous = *tier;
        }
    }
}

#[test]
fn outcomes_persist_across_instances() {
    let dir = TempDir::new().unwrap();
    {
        let mut router = router(&dir);
        router.record_outcome(Tier::Cheap, "mechanical", true).unwrap();
        router.record_outcome(Tier::Cheap, "mechanical", false).unwrap();
    }

    let reloaded = router(&dir);
    assert_eq!(reloaded.success_rate(Tier::Cheap, "mechanical"), 0.5);
    let stats = reloaded.statistics();
    assert_eq!(stats[&Tier::Cheap]["mechanical"].attempts, 2);
    assert_eq!(stats[&Tier::Cheap]["mechanical"].successes, 1);
}

#[test]
fn unknown_history_defaults_to_half() {
    let dir = TempDir::new().unwrap();
    assert_eq!(router(&dir).success_rate(Tier::Strong, "transform"), 0.5);
}

#[parameterized(
    mechanical = { "fix the syntax please", "mechanical" },
    readonly = { "list the files", "readonly" },
    transform = { "convert this to json", "transform" },
    judgment = { "review the approach", "judgment" },
    general = { "do something", "general" },
)]
fn task_type_classification(request: &str, expected: &str) {
    assert_eq!(classify_task_type(request), expected);
}
