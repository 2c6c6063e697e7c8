// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Two-stage routing pipeline.
//!
//! The mechanical pre-router (`Router`) escalates or routes directly to an
//! agent; the probabilistic layer (`ProbabilisticRouter` +
//! `OptimisticExecutor`) picks a tier, executes optimistically, validates,
//! and walks a fallback chain. The adaptive orchestrator chooses between
//! single-stage and interpret→plan→execute pipelines by complexity.

mod checkers;
mod complexity;
mod core;
mod executor;
mod matcher;
mod orchestrator;
mod probabilistic;
mod validator;

pub use checkers::{CheckerRegistry, ExternalChecker, SyntaxChecker};
pub use complexity::ComplexityClassifier;
pub use self::core::{explicit_file_mentioned, Router};
pub use executor::{ExecuteError, ExecutionOutcome, OptimisticExecutor};
pub use matcher::{AgentMatcher, KeywordMatcher, LlmMatcher};
pub use orchestrator::{
    AdaptiveOrchestrator, ExecutionPlan, Interpretation, OrchestrationResult, OrchestratorConfig,
    Scope,
};
pub use probabilistic::{classify_task_type, ProbabilisticRouter, RoutingStats};
pub use validator::{ResultValidator, Validation, ValidationContext};
