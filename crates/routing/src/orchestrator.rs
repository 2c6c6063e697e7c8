// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive orchestration.
//!
//! Classifies a request's complexity and picks the cheapest pipeline that
//! fits: single-stage for mechanical work, monitored single-stage for the
//! middle, and interpret→plan→execute for complex or ambiguous requests.

use crate::complexity::ComplexityClassifier;
use crate::core::Router;
use chrono::{DateTime, Utc};
use relay_core::{
    ComplexityAnalysis, ComplexityLevel, OrchestrationMode, RequestError, RoutingResult, Tier,
};
use relay_metrics::MetricsSink;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub simple_base: f64,
    pub simple_weight: f64,
    pub complex_base: f64,
    pub complex_weight: f64,
    pub custom_simple_patterns: Vec<(String, String)>,
    pub custom_complex_patterns: Vec<(String, String)>,
    /// Bypass classification and always use this mode
    pub force_mode: Option<OrchestrationMode>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            simple_base: 0.7,
            simple_weight: 0.1,
            complex_base: 0.6,
            complex_weight: 0.15,
            custom_simple_patterns: Vec::new(),
            custom_complex_patterns: Vec::new(),
            force_mode: None,
        }
    }
}

/// Request scope estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Small,
    Medium,
    Large,
}

/// Intent and scope reading of a request (multi-stage, stage 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub intent: String,
    pub has_ambiguity: bool,
    pub scope: Scope,
}

/// Execution plan derived from an interpretation (multi-stage, stage 2).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPlan {
    pub refined_request: String,
    pub is_multi_step: bool,
    pub recommended_tier: Tier,
    pub steps: Vec<String>,
}

/// Result of orchestrating one request.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    pub mode: OrchestrationMode,
    pub complexity: ComplexityLevel,
    pub complexity_confidence: f64,
    pub indicators: Vec<String>,
    pub stages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ExecutionPlan>,
    pub monitoring_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

const INTENT_KEYWORDS: [(&str, &str); 8] = [
    ("design", "architectural_design"),
    ("implement", "implementation"),
    ("refactor", "code_restructuring"),
    ("debug", "problem_solving"),
    ("analyze", "analysis"),
    ("optimize", "optimization"),
    ("test", "testing"),
    ("document", "documentation"),
];

const AMBIGUITY_SIGNALS: [&str; 5] = ["best", "better", "should", "which", "how to"];

const LARGE_SCOPE: [&str; 5] = ["all", "every", "entire", "whole", "system-wide"];
const MEDIUM_SCOPE: [&str; 3] = ["multiple", "several", "some"];
const SMALL_SCOPE: [&str; 4] = ["this", "that", "the", "one"];

/// Intents that pull the tier estimate upward.
const COMPLEX_INTENTS: [&str; 3] = ["architectural_design", "optimization", "problem_solving"];

/// Adaptive orchestrator: classify, select a strategy, route.
pub struct AdaptiveOrchestrator {
    classifier: ComplexityClassifier,
    router: Router,
    force_mode: Option<OrchestrationMode>,
    metrics: Option<MetricsSink>,
}

impl AdaptiveOrchestrator {
    pub fn new(config: OrchestratorConfig, router: Router) -> Self {
        Self {
            classifier: ComplexityClassifier::new(&config),
            force_mode: config.force_mode,
            router,
            metrics: None,
        }
    }

    /// Attach a metrics sink; classification and mode selection get
    /// recorded as solution metrics.
    pub fn with_metrics(mut self, metrics: MetricsSink) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Orchestrate a request.
    ///
    /// An empty request produces an empty result carrying an
    /// `empty_request` error marker instead of failing.
    pub fn orchestrate(&self, request: &str) -> Result<OrchestrationResult, RequestError> {
        let now = Utc::now();

        if request.trim().is_empty() {
            return Ok(empty_result(now));
        }
        relay_core::validate_request(request)?;

        let analysis = self.classifier.classify(request);
        let mode = self.force_mode.unwrap_or(analysis.recommendation);

        let mut result = match mode {
            OrchestrationMode::SingleStage => self.single_stage(request, &analysis, false)?,
            OrchestrationMode::SingleStageMonitored => {
                self.single_stage(request, &analysis, true)?
            }
            OrchestrationMode::MultiStage => self.multi_stage(request, &analysis)?,
        };
        result.mode = mode;
        result.timestamp = now;

        self.record_metrics(&analysis, mode);
        Ok(result)
    }

    fn single_stage(
        &self,
        request: &str,
        analysis: &ComplexityAnalysis,
        monitored: bool,
    ) -> Result<OrchestrationResult, RequestError> {
        let routing = self.router.route(request)?;
        let stages = if monitored {
            vec!["route".to_string(), "execute_with_monitoring".to_string()]
        } else {
            vec!["route".to_string()]
        };

        Ok(OrchestrationResult {
            mode: analysis.recommendation,
            complexity: analysis.level,
            complexity_confidence: analysis.confidence,
            indicators: analysis.indicators.clone(),
            stages,
            routing: Some(routing),
            interpretation: None,
            plan: None,
            monitoring_enabled: monitored,
            error: None,
            timestamp: Utc::now(),
        })
    }

    fn multi_stage(
        &self,
        request: &str,
        analysis: &ComplexityAnalysis,
    ) -> Result<OrchestrationResult, RequestError> {
        let interpretation = interpret(request);
        let plan = plan(request, &interpretation);

        // Routing the refined request can only fail on length; fall back
        // to the (already validated) original in that case
        let routing = self
            .router
            .route(&plan.refined_request)
            .or_else(|_| self.router.route(request))?;

        Ok(OrchestrationResult {
            mode: OrchestrationMode::MultiStage,
            complexity: analysis.level,
            complexity_confidence: analysis.confidence,
            indicators: analysis.indicators.clone(),
            stages: vec![
                "interpret".to_string(),
                "plan".to_string(),
                "execute".to_string(),
            ],
            routing: Some(routing),
            interpretation: Some(interpretation),
            plan: Some(plan),
            monitoring_enabled: false,
            error: None,
            timestamp: Utc::now(),
        })
    }

    fn record_metrics(&self, analysis: &ComplexityAnalysis, mode: OrchestrationMode) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        let classification = metrics.record_solution_metric(
            "adaptive_orchestration",
            "complexity_classification",
            1.0,
            json!({
                "complexity_level": analysis.level,
                "confidence": analysis.confidence,
                "indicators": analysis.indicators,
            }),
        );
        let mode_metric = metrics.record_solution_metric(
            "adaptive_orchestration",
            &format!("mode_{mode}"),
            1.0,
            json!({"complexity_level": analysis.level}),
        );
        for outcome in [classification, mode_metric] {
            if let Err(e) = outcome {
                warn!(error = %e, "failed to record orchestration metric");
            }
        }
    }
}

/// Stage 1: heuristic intent, ambiguity, and scope detection.
fn interpret(request: &str) -> Interpretation {
    let lower = request.to_lowercase();

    let intent = INTENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| (*intent).to_string())
        .unwrap_or_else(|| "general_task".to_string());

    let has_ambiguity = AMBIGUITY_SIGNALS.iter().any(|s| lower.contains(s));

    let scope = if LARGE_SCOPE.iter().any(|m| lower.contains(m)) {
        Scope::Large
    } else if MEDIUM_SCOPE.iter().any(|m| lower.contains(m)) {
        Scope::Medium
    } else if SMALL_SCOPE.iter().any(|m| lower.contains(m)) {
        Scope::Small
    } else {
        Scope::Medium
    };

    Interpretation {
        intent,
        has_ambiguity,
        scope,
    }
}

/// Stage 2: refine the request and pick resources.
fn plan(request: &str, interpretation: &Interpretation) -> ExecutionPlan {
    let is_multi_step = matches!(interpretation.scope, Scope::Large | Scope::Medium)
        || interpretation.has_ambiguity;

    let is_complex_intent = COMPLEX_INTENTS.contains(&interpretation.intent.as_str());
    let recommended_tier = if is_complex_intent && interpretation.scope == Scope::Large {
        Tier::Strong
    } else if is_complex_intent || matches!(interpretation.scope, Scope::Medium | Scope::Large) {
        Tier::Mid
    } else {
        Tier::Cheap
    };

    let refined_request = if interpretation.has_ambiguity {
        format!("{request} [REQUIRES CLARIFICATION]")
    } else {
        request.to_string()
    };

    let steps = if is_multi_step {
        vec![
            "clarify".to_string(),
            "execute".to_string(),
            "verify".to_string(),
        ]
    } else {
        vec!["execute".to_string()]
    };

    ExecutionPlan {
        refined_request,
        is_multi_step,
        recommended_tier,
        steps,
    }
}

fn empty_result(now: DateTime<Utc>) -> OrchestrationResult {
    OrchestrationResult {
        mode: OrchestrationMode::SingleStage,
        complexity: ComplexityLevel::Moderate,
        complexity_confidence: 0.0,
        indicators: Vec::new(),
        stages: vec!["route".to_string()],
        routing: None,
        interpretation: None,
        plan: None,
        monitoring_enabled: false,
        error: Some("empty_request".to_string()),
        timestamp: now,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
