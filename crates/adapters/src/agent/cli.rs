// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-assistant CLI executor.
//!
//! Spawns the host CLI in non-interactive mode
//! (`<cli> --print --model <model> <request>`) and captures stdout as the
//! agent's result.

use super::{AgentError, AgentExecutor};
use crate::subprocess::{run_with_timeout, AGENT_TIMEOUT};
use async_trait::async_trait;
use relay_core::Tier;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Agent executor backed by the host assistant CLI.
#[derive(Debug, Clone)]
pub struct CliAgentExecutor {
    command: PathBuf,
    timeout: Duration,
    /// Tier → model flag value; defaults to the tier names themselves
    model_names: HashMap<Tier, String>,
}

impl CliAgentExecutor {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            timeout: AGENT_TIMEOUT,
            model_names: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the model name passed for a tier.
    pub fn with_model_name(mut self, tier: Tier, model: impl Into<String>) -> Self {
        self.model_names.insert(tier, model.into());
        self
    }

    fn model_for(&self, tier: Tier) -> &str {
        self.model_names
            .get(&tier)
            .map(String::as_str)
            .unwrap_or(tier.as_str())
    }
}

#[async_trait]
impl AgentExecutor for CliAgentExecutor {
    async fn execute(
        &self,
        request: &str,
        tier: Tier,
        cwd: Option<&Path>,
    ) -> Result<Value, AgentError> {
        let model = self.model_for(tier);
        info!(%tier, model, "executing request via host CLI");

        let mut cmd = Command::new(&self.command);
        cmd.arg("--print").arg("--model").arg(model).arg(request);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = run_with_timeout(cmd, self.timeout, "agent execution")
            .await
            .map_err(|e| {
                if e.contains("timed out") {
                    AgentError::Timeout(e)
                } else {
                    AgentError::SpawnFailed(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.chars().take(500).collect(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(bytes = stdout.len(), "agent execution completed");

        // Structured results pass through; plain text becomes a string value
        match serde_json::from_str::<Value>(&stdout) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
            _ => Ok(Value::String(stdout)),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
