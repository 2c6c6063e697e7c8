// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable fake agent executor for tests.

use super::{AgentError, AgentExecutor};
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_core::Tier;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One recorded execution.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    pub request: String,
    pub tier: Tier,
    pub cwd: Option<PathBuf>,
}

/// Fake executor with per-tier scripted results and a call log.
///
/// Unscripted tiers return a default text result. Responses are consumed
/// in order; the last response for a tier repeats.
#[derive(Debug, Clone, Default)]
pub struct FakeAgentExecutor {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    responses: HashMap<Tier, Vec<Result<Value, String>>>,
    calls: Vec<AgentCall>,
}

impl FakeAgentExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result for a tier.
    pub fn enqueue(&self, tier: Tier, result: Value) {
        self.inner
            .lock()
            .responses
            .entry(tier)
            .or_default()
            .push(Ok(result));
    }

    /// Queue a text result for a tier.
    pub fn enqueue_text(&self, tier: Tier, text: &str) {
        self.enqueue(tier, Value::String(text.to_string()));
    }

    /// Queue an execution error for a tier.
    pub fn enqueue_error(&self, tier: Tier, message: &str) {
        self.inner
            .lock()
            .responses
            .entry(tier)
            .or_default()
            .push(Err(message.to_string()));
    }

    /// All executions so far, in order.
    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    /// Tiers tried, in execution order.
    pub fn tiers_tried(&self) -> Vec<Tier> {
        self.inner.lock().calls.iter().map(|c| c.tier).collect()
    }
}

#[async_trait]
impl AgentExecutor for FakeAgentExecutor {
    async fn execute(
        &self,
        request: &str,
        tier: Tier,
        cwd: Option<&Path>,
    ) -> Result<Value, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(AgentCall {
            request: request.to_string(),
            tier,
            cwd: cwd.map(Path::to_path_buf),
        });

        let response = match state.responses.get_mut(&tier) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue
                .first()
                .cloned()
                .unwrap_or(Ok(Value::String(format!("ok from {tier}")))),
            None => Ok(Value::String(format!("ok from {tier}"))),
        };

        response.map_err(AgentError::SpawnFailed)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
