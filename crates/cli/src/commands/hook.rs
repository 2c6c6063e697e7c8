// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay hook` - host-assistant hook entry points.
//!
//! Hooks exchange JSON over stdin/stdout. `agent-start` and `agent-stop`
//! append agent events to the metrics log; `pre-tool-use` answers a
//! permission decision on stdout. Unknown events log and exit 0 so a
//! misconfigured hook never breaks the host.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::Args;
use relay_core::Clock;
use relay_metrics::{AgentEvent, MetricsRecord, MetricsSink, RequestTracking};
use serde_json::{json, Value};
use std::io::Read;
use tracing::{info, warn};

#[derive(Args)]
pub struct HookArgs {
    /// Hook event name (agent-start, agent-stop, pre-tool-use, …)
    event: String,
}

pub fn run(args: HookArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    // Suppression flag set by our own LLM matcher to avoid recursion
    if std::env::var("RELAY_NO_HOOKS").is_ok_and(|v| v == "1") {
        if args.event == "pre-tool-use" {
            println!("{}", json!({"permissionDecision": "allow"}));
        }
        return Ok(ExitCode::Success);
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let payload: Value = serde_json::from_str(&input).unwrap_or(Value::Null);

    match args.event.as_str() {
        "agent-start" | "agent-stop" => {
            let sink = MetricsSink::new(ctx.settings.metrics_dir(), ctx.clock.clone());
            let event = agent_event(&args.event, &payload, ctx);
            if let Err(e) = sink.record(&MetricsRecord::AgentEvent(event)) {
                // Hooks must not fail the host over a metrics problem
                warn!(error = %e, "could not record agent event");
            }

            // Stops carrying a request hash also feed the compliance join
            if args.event == "agent-stop" {
                if let Some(tracking) = request_tracking(&payload, ctx) {
                    if let Err(e) = sink.record(&MetricsRecord::RequestTracking(tracking)) {
                        warn!(error = %e, "could not record request tracking");
                    }
                }
            }
            Ok(ExitCode::Success)
        }
        "pre-tool-use" => {
            let decision = permission_decision(&payload);
            println!("{decision}");
            Ok(ExitCode::Success)
        }
        other => {
            info!(event = other, "unhandled hook event");
            Ok(ExitCode::Success)
        }
    }
}

fn agent_event(event: &str, payload: &Value, ctx: &CliContext) -> AgentEvent {
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    AgentEvent {
        event: event.replace('-', "_"),
        timestamp: ctx.clock.now_utc().to_rfc3339(),
        project: text("project"),
        agent_type: text("agent_type"),
        agent_id: text("agent_id"),
        model_tier: payload
            .get("model_tier")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        exit_status: payload
            .get("exit_status")
            .and_then(Value::as_str)
            .map(String::from),
        description: text("description"),
        duration_ms: payload.get("duration_ms").and_then(Value::as_u64),
    }
}

/// Tracking record for stops that carry a request hash.
fn request_tracking(payload: &Value, ctx: &CliContext) -> Option<RequestTracking> {
    let request_hash = payload.get("request_hash")?.as_str()?.to_string();
    let agent_invoked = payload
        .get("agent_type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(RequestTracking {
        timestamp: ctx.clock.now_utc().to_rfc3339(),
        request_hash,
        handler: if agent_invoked.is_some() {
            "agent".to_string()
        } else {
            "main".to_string()
        },
        agent_invoked,
        project: payload
            .get("project")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

/// Deny mutations of the agent-definition directory; allow the rest.
fn permission_decision(payload: &Value) -> Value {
    let tool = payload
        .get("tool_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let target = payload
        .get("tool_input")
        .and_then(|input| input.get("file_path"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mutating = matches!(tool, "Edit" | "Write" | "MultiEdit" | "NotebookEdit");
    if mutating && target.contains(".claude/agents") {
        return json!({
            "permissionDecision": "deny",
            "permissionDecisionReason": "agent definition changes require manual review",
        });
    }
    json!({"permissionDecision": "allow"})
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
