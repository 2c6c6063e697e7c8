// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing, complexity, and orchestration decision types.
//!
//! The string forms of these enums are load-bearing: they appear in
//! persisted JSON documents and on the CLI's `--json` surface.

use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the mechanical pre-router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteDecision {
    /// Deliver straight to a named agent
    Direct,
    /// Hand to the deliberating router
    Escalate,
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDecision::Direct => write!(f, "direct"),
            RouteDecision::Escalate => write!(f, "escalate"),
        }
    }
}

/// Result of a pre-routing decision.
///
/// Invariant: `decision == Direct` implies `agent` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub decision: RouteDecision,
    #[serde(default)]
    pub agent: Option<String>,
    pub reason: String,
    pub confidence: f64,
}

impl RoutingResult {
    pub fn direct(agent: impl Into<String>, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            decision: RouteDecision::Direct,
            agent: Some(agent.into()),
            reason: reason.into(),
            confidence,
        }
    }

    pub fn escalate(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            decision: RouteDecision::Escalate,
            agent: None,
            reason: reason.into(),
            confidence,
        }
    }

    /// Escalate while carrying a low-confidence candidate agent.
    pub fn escalate_with_candidate(
        agent: impl Into<String>,
        reason: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            decision: RouteDecision::Escalate,
            agent: Some(agent.into()),
            reason: reason.into(),
            confidence,
        }
    }
}

/// Confidence bucket for probabilistic routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingConfidence {
    /// >90% sure the tier can handle it
    High,
    /// 70-90% sure
    Medium,
    /// <70% sure; prefer a higher tier
    Low,
}

impl fmt::Display for RoutingConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingConfidence::High => write!(f, "high"),
            RoutingConfidence::Medium => write!(f, "medium"),
            RoutingConfidence::Low => write!(f, "low"),
        }
    }
}

/// Probabilistic routing decision with validation and fallback plan.
///
/// The fallback chain is strictly ascending in tier and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    #[serde(rename = "recommended_model")]
    pub recommended_tier: Tier,
    pub confidence: RoutingConfidence,
    pub fallback_chain: Vec<Tier>,
    pub validation_criteria: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Request complexity buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Simple => write!(f, "simple"),
            ComplexityLevel::Moderate => write!(f, "moderate"),
            ComplexityLevel::Complex => write!(f, "complex"),
        }
    }
}

/// Orchestration pipeline shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    /// route → execute
    SingleStage,
    /// route → execute with progress tracking attached by the host
    SingleStageMonitored,
    /// interpret → plan → execute
    MultiStage,
}

impl fmt::Display for OrchestrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationMode::SingleStage => write!(f, "single_stage"),
            OrchestrationMode::SingleStageMonitored => write!(f, "single_stage_monitored"),
            OrchestrationMode::MultiStage => write!(f, "multi_stage"),
        }
    }
}

/// Result of complexity classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAnalysis {
    pub level: ComplexityLevel,
    pub confidence: f64,
    /// Tagged match strings, e.g. `simple:mechanical_fix`
    pub indicators: Vec<String>,
    pub recommendation: OrchestrationMode,
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
