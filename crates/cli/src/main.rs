// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relay - subscription-aware routing and scheduling control plane CLI

mod commands;
mod context;
mod exit;

use clap::{Parser, Subcommand};
use commands::{hook, metrics, orchestrate, overnight, quota, route, temporal, work};
use exit::ExitCode;

#[derive(Parser)]
#[command(
    name = "relay",
    version,
    about = "Subscription-aware routing and scheduling for tiered agents"
)]
struct Cli {
    /// Override the state root directory
    #[arg(long, global = true, value_name = "DIR")]
    state_root: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quota tracking
    Quota(quota::QuotaArgs),
    /// Work coordination
    Work(work::WorkArgs),
    /// Route a request through the mechanical pre-router
    Route(route::RouteArgs),
    /// Orchestrate a request adaptively
    Orchestrate(orchestrate::OrchestrateArgs),
    /// Temporal scheduling
    Temporal(temporal::TemporalArgs),
    /// Metrics recording and reports
    Metrics(metrics::MetricsArgs),
    /// Run scheduled overnight work
    Overnight(overnight::OvernightArgs),
    /// Host-assistant hook entry points (JSON on stdin)
    Hook(hook::HookArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = context::CliContext::new(cli.state_root);

    let code = match run(cli.command, &ctx).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Fatal
        }
    };
    std::process::exit(code.into());
}

async fn run(command: Commands, ctx: &context::CliContext) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Quota(args) => quota::run(args, ctx),
        Commands::Work(args) => work::run(args, ctx),
        Commands::Route(args) => route::run(args, ctx),
        Commands::Orchestrate(args) => orchestrate::run(args, ctx),
        Commands::Temporal(args) => temporal::run(args, ctx),
        Commands::Metrics(args) => metrics::run(args, ctx),
        Commands::Overnight(args) => overnight::run(args, ctx).await,
        Commands::Hook(args) => hook::run(args, ctx),
    }
}
