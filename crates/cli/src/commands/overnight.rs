// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay overnight` - execute the scheduled overnight queue.
//!
//! Intended to be invoked by a timer at the end of active hours. The whole
//! run is bounded by `--timeout`; on expiry the partial results stand and
//! the process exits with the timeout code.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::Args;
use relay_adapters::CliAgentExecutor;
use relay_engine::{OvernightExecutor, QuotaTracker, TemporalScheduler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Args)]
pub struct OvernightArgs {
    /// Temporal queue file (defaults to the state root's)
    #[arg(long)]
    queue_file: Option<PathBuf>,

    /// Results directory (defaults to the state root's)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Maximum concurrent tasks
    #[arg(long, default_value_t = 3)]
    max_concurrent: usize,

    /// Overall timeout in seconds
    #[arg(long, default_value_t = 10_800)]
    timeout: u64,

    /// Host CLI binary used to run agents
    #[arg(long, default_value = "claude")]
    agent_cli: String,
}

pub async fn run(args: OvernightArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let queue_file = args
        .queue_file
        .unwrap_or_else(|| ctx.settings.temporal_queue_file());
    let results_dir = args
        .results_dir
        .unwrap_or_else(|| ctx.settings.overnight_results_dir());

    let tracker = QuotaTracker::new(
        ctx.settings.quota_file(),
        ctx.lock_options(),
        ctx.clock.clone(),
    );
    let mut scheduler = TemporalScheduler::open(
        &queue_file,
        &tracker,
        ctx.lock_options(),
        ctx.clock.clone(),
        (
            ctx.settings.active_hours_start,
            ctx.settings.active_hours_end,
        ),
    )?;

    let items = scheduler.scheduled().to_vec();
    if items.is_empty() {
        info!("no work scheduled for tonight");
        println!("No work scheduled for tonight.");
        return Ok(ExitCode::Success);
    }

    info!(
        items = items.len(),
        max_concurrent = args.max_concurrent,
        timeout = args.timeout,
        "overnight execution starting"
    );

    let executor = OvernightExecutor::new(&results_dir, args.max_concurrent, ctx.clock.clone());
    let shutdown = executor.shutdown_flag();
    let agent_exec = Arc::new(
        CliAgentExecutor::new(&args.agent_cli).with_timeout(ctx.settings.agent_timeout),
    );

    // Ctrl-C stops new launches; in-flight items run to their own timeout
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.trigger();
            }
        }
    });

    let run = executor.run(items, &mut scheduler, agent_exec);
    match tokio::time::timeout(Duration::from_secs(args.timeout), run).await {
        Ok(Ok(outcome)) => {
            let failures = outcome.failure_count();
            let total = outcome.results.len();
            println!("Overnight run finished: {total} item(s), {failures} failed");
            if shutdown.is_triggered() {
                return Ok(ExitCode::Interrupted);
            }
            if failures == 0 {
                Ok(ExitCode::Success)
            } else if failures < total {
                Ok(ExitCode::PartialSuccess)
            } else {
                Ok(ExitCode::Fatal)
            }
        }
        Ok(Err(e)) => {
            error!(error = %e, "overnight execution failed");
            Err(e.into())
        }
        Err(_elapsed) => {
            error!(timeout = args.timeout, "overnight execution timed out");
            println!("Overnight run timed out after {}s; partial results stand", args.timeout);
            Ok(ExitCode::SubprocessTimeout)
        }
    }
}
