// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent execution adapters.
//!
//! The `AgentExecutor` trait is the seam between the control plane and the
//! host assistant's agents. The production implementation shells out to the
//! host CLI; tests use `FakeAgentExecutor` to script results per tier.

mod cli;
mod defs;

pub use cli::CliAgentExecutor;
pub use defs::{tier_for_agent, AgentDefinition, DefinitionError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAgentExecutor};

use async_trait::async_trait;
use relay_core::Tier;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors from agent execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("agent exited with {code}: {stderr}")]
    Failed { code: i32, stderr: String },
    #[error("agent timed out: {0}")]
    Timeout(String),
}

/// Executes a request on an agent of the given tier.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run `request` on a `tier` agent, optionally in a working directory.
    ///
    /// The returned value is the agent's result: plain text becomes a JSON
    /// string, structured output is passed through as-is.
    async fn execute(
        &self,
        request: &str,
        tier: Tier,
        cwd: Option<&Path>,
    ) -> Result<Value, AgentError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
