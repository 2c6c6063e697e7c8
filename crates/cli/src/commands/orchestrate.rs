// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay orchestrate` - adaptive orchestration of a request.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::Args;
use relay_metrics::MetricsSink;
use relay_routing::{AdaptiveOrchestrator, OrchestratorConfig, Router};

#[derive(Args)]
pub struct OrchestrateArgs {
    /// Request text
    request: Option<String>,

    /// Emit JSON instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Run the built-in classification examples
    #[arg(long)]
    test: bool,
}

const TEST_REQUESTS: [&str; 5] = [
    "Fix typo in README.md",
    "Design a caching architecture for the whole system",
    "fix typo please",
    "Search for usages, then refactor every module; verify the build",
    "Which library is best here?",
];

pub fn run(args: OrchestrateArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let sink = MetricsSink::new(ctx.settings.metrics_dir(), ctx.clock.clone());
    let orchestrator =
        AdaptiveOrchestrator::new(OrchestratorConfig::default(), Router::keyword())
            .with_metrics(sink);

    if args.test {
        println!("Orchestration examples");
        println!("{}", "=".repeat(60));
        for request in TEST_REQUESTS {
            let result = orchestrator.orchestrate(request)?;
            println!(
                "{:<58} {} / {}",
                truncate(request, 56),
                result.complexity,
                result.mode
            );
        }
        return Ok(ExitCode::Success);
    }

    let Some(request) = args.request else {
        anyhow::bail!("request argument required (or use --test)");
    };
    let result = orchestrator.orchestrate(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Orchestration");
        println!("{}", "=".repeat(50));
        println!("Complexity: {} ({:.0}%)", result.complexity, result.complexity_confidence * 100.0);
        println!("Mode: {}", result.mode);
        println!("Stages: {}", result.stages.join(" → "));
        if let Some(error) = &result.error {
            println!("Error: {error}");
        }
        if let Some(plan) = &result.plan {
            println!("Plan: {} via {}", plan.steps.join(", "), plan.recommended_tier);
            println!("Refined: {}", plan.refined_request);
        }
        if let Some(routing) = &result.routing {
            println!(
                "Routing: {} (agent: {}, {:.0}%)",
                routing.decision,
                routing.agent.as_deref().unwrap_or("-"),
                routing.confidence * 100.0
            );
            println!("Reason: {}", routing.reason);
        }
    }
    Ok(ExitCode::Success)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}
