// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn direct_result_carries_agent() {
    let result = RoutingResult::direct("cheap-general", "High-confidence agent match", 0.95);
    assert_eq!(result.decision, RouteDecision::Direct);
    assert_eq!(result.agent.as_deref(), Some("cheap-general"));
}

#[test]
fn decision_serializes_as_short_form() {
    assert_eq!(
        serde_json::to_string(&RouteDecision::Direct).unwrap(),
        "\"direct\""
    );
    assert_eq!(
        serde_json::to_string(&RouteDecision::Escalate).unwrap(),
        "\"escalate\""
    );
}

#[test]
fn routing_decision_serializes_recommended_model() {
    let decision = RoutingDecision {
        recommended_tier: Tier::Cheap,
        confidence: RoutingConfidence::High,
        fallback_chain: vec![Tier::Mid, Tier::Strong],
        validation_criteria: vec!["syntax_valid".to_string()],
        reasoning: "Mechanical task with clear rules".to_string(),
    };

    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["recommended_model"], "cheap");
    assert_eq!(json["confidence"], "high");
    assert_eq!(json["fallback_chain"][0], "mid");

    let back: RoutingDecision = serde_json::from_value(json).unwrap();
    assert_eq!(back, decision);
}

#[test]
fn orchestration_mode_string_forms() {
    assert_eq!(
        serde_json::to_string(&OrchestrationMode::SingleStageMonitored).unwrap(),
        "\"single_stage_monitored\""
    );
    assert_eq!(OrchestrationMode::MultiStage.to_string(), "multi_stage");
}

#[test]
fn complexity_analysis_round_trip() {
    let analysis = ComplexityAnalysis {
        level: ComplexityLevel::Complex,
        confidence: 0.9,
        indicators: vec!["complex:requires_design".to_string()],
        recommendation: OrchestrationMode::MultiStage,
    };
    let json = serde_json::to_string(&analysis).unwrap();
    let back: ComplexityAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis);
}
