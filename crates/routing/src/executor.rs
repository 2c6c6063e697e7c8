// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic execution with validated fallback.
//!
//! Execute with the recommended (cheapest plausible) tier, validate the
//! result, and walk the fallback chain on failure. A tier is skipped when
//! the failure signal says it cannot plausibly resolve it.

use crate::probabilistic::{classify_task_type, ProbabilisticRouter};
use crate::validator::{ResultValidator, Validation, ValidationContext};
use relay_adapters::{AgentError, AgentExecutor};
use relay_core::{RoutingDecision, Tier};
use relay_storage::DocError;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from optimistic execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("history persistence failed: {0}")]
    History(#[from] DocError),
}

/// Outcome of one optimistic execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Result of the last tier tried
    pub result: Value,
    /// The routing decision that drove execution
    pub decision: RoutingDecision,
    /// Tiers actually executed, in order
    pub escalation_path: Vec<Tier>,
    /// Whether the final result passed validation
    pub passed: bool,
    /// The last validation failure, if any tier failed
    pub last_failure: Option<String>,
}

/// Executes requests optimistically, escalating on validation failure.
pub struct OptimisticExecutor {
    router: ProbabilisticRouter,
    validator: ResultValidator,
    total_executions: u64,
    escalation_count: u64,
}

impl OptimisticExecutor {
    pub fn new(router: ProbabilisticRouter, validator: ResultValidator) -> Self {
        Self {
            router,
            validator,
            total_executions: 0,
            escalation_count: 0,
        }
    }

    /// Route, execute, validate, and escalate as needed.
    pub async fn execute(
        &mut self,
        request: &str,
        context: &ValidationContext,
        agent_exec: &dyn AgentExecutor,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let decision = self.router.route(request);
        info!(
            tier = %decision.recommended_tier,
            confidence = %decision.confidence,
            reasoning = %decision.reasoning,
            "optimistic routing",
        );

        self.total_executions += 1;
        let task_type = classify_task_type(request);
        let cwd = context.cwd.as_deref();
        let mut escalation_path = vec![decision.recommended_tier];

        let mut result = agent_exec
            .execute(request, decision.recommended_tier, cwd)
            .await?;

        // No criteria means optimistic success
        if decision.validation_criteria.is_empty() {
            self.router
                .record_outcome(decision.recommended_tier, task_type, true)?;
            return Ok(ExecutionOutcome {
                result,
                decision,
                escalation_path,
                passed: true,
                last_failure: None,
            });
        }

        let validation =
            self.validator
                .validate(&result, &decision.validation_criteria, context);
        if validation.is_pass() {
            self.router
                .record_outcome(decision.recommended_tier, task_type, true)?;
            return Ok(ExecutionOutcome {
                result,
                decision,
                escalation_path,
                passed: true,
                last_failure: None,
            });
        }

        let mut last_failure = validation
            .failure_reason()
            .unwrap_or("validation failed")
            .to_string();
        warn!(reason = %last_failure, "validation failed, walking fallback chain");
        self.router
            .record_outcome(decision.recommended_tier, task_type, false)?;

        if decision.fallback_chain.is_empty() {
            debug!("no fallback chain available");
            return Ok(ExecutionOutcome {
                result,
                decision,
                escalation_path,
                passed: false,
                last_failure: Some(last_failure),
            });
        }

        self.escalation_count += 1;

        let chain: Vec<Tier> = decision.fallback_chain.clone();
        for fallback in chain {
            if self.validator.should_skip_tier(&last_failure, fallback) {
                info!(tier = %fallback, "skipping tier, failure exceeds its capability");
                continue;
            }

            info!(tier = %fallback, "escalating");
            escalation_path.push(fallback);

            result = agent_exec.execute(request, fallback, cwd).await?;
            let validation =
                self.validator
                    .validate(&result, &decision.validation_criteria, context);

            if validation.is_pass() {
                self.router.record_outcome(fallback, task_type, true)?;
                info!(path = ?escalation_path, "escalation resolved");
                return Ok(ExecutionOutcome {
                    result,
                    decision,
                    escalation_path,
                    passed: true,
                    last_failure: None,
                });
            }

            last_failure = validation
                .failure_reason()
                .unwrap_or("validation failed")
                .to_string();
            warn!(tier = %fallback, reason = %last_failure, "fallback tier also failed");
            self.router.record_outcome(fallback, task_type, false)?;
        }

        warn!(path = ?escalation_path, "all tiers exhausted");
        Ok(ExecutionOutcome {
            result,
            decision,
            escalation_path,
            passed: false,
            last_failure: Some(last_failure),
        })
    }

    /// Fraction of executions that required escalation.
    pub fn escalation_rate(&self) -> f64 {
        if self.total_executions == 0 {
            return 0.0;
        }
        self.escalation_count as f64 / self.total_executions as f64
    }

    pub fn total_executions(&self) -> u64 {
        self.total_executions
    }

    pub fn router(&self) -> &ProbabilisticRouter {
        &self.router
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
