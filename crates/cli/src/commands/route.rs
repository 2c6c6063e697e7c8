// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay route` - mechanical pre-routing analysis.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::Args;
use relay_core::{Clock, RouteDecision};
use relay_metrics::{request_hash, MetricsRecord, MetricsSink, RoutingRecommendation};
use relay_routing::{LlmMatcher, Router};
use std::io::Read;
use tracing::warn;

#[derive(Args)]
pub struct RouteArgs {
    /// Request text; read from stdin when omitted
    request: Option<String>,

    /// Emit JSON instead of the human-readable report
    #[arg(long)]
    json: bool,
}

pub fn run(args: RouteArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let request = match args.request {
        Some(request) => request,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer.trim().to_string()
        }
    };

    let router = if ctx.settings.use_llm_matcher {
        Router::with_matcher(Box::new(LlmMatcher::new("claude")))
    } else {
        Router::keyword()
    };

    let result = router.route(&request)?;

    // The compliance view joins this against request_tracking later
    let sink = MetricsSink::new(ctx.settings.metrics_dir(), ctx.clock.clone());
    let record = MetricsRecord::RoutingRecommendation(RoutingRecommendation {
        timestamp: ctx.clock.now_utc().to_rfc3339(),
        request_hash: request_hash(&request),
        decision: result.decision.to_string(),
        agent: result.agent.clone(),
        confidence: result.confidence,
        reason: result.reason.clone(),
        project: None,
    });
    if let Err(e) = sink.record(&record) {
        warn!(error = %e, "could not record routing recommendation");
    }

    if args.json {
        let output = serde_json::json!({
            "request": request,
            "routing": result,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Routing Analysis");
        println!("{}", "=".repeat(50));
        println!("Request: {request}");
        println!();
        match result.decision {
            RouteDecision::Escalate => {
                println!("ESCALATE to deliberating router");
                println!("Reason: {}", result.reason);
                if let Some(agent) = &result.agent {
                    println!("Suggested agent: {agent}");
                }
            }
            RouteDecision::Direct => {
                let agent = result.agent.as_deref().unwrap_or("(unset)");
                let tier =
                    relay_adapters::tier_for_agent(agent, ctx.settings.agents_dir.as_deref());
                println!("DIRECT to agent: {agent} (tier: {tier})");
                println!("Reason: {}", result.reason);
            }
        }
        println!("Confidence: {:.0}%", result.confidence * 100.0);
    }
    Ok(ExitCode::Success)
}
