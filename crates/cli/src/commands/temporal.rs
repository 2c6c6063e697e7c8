// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay temporal` - sync/async queues and overnight planning.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::{Args, Subcommand};
use relay_core::{Clock, Tier, TimedWorkItem, WorkTiming};
use relay_engine::{classify_timing, estimate_tier, QuotaTracker, TemporalScheduler, TimingContext};
use std::path::PathBuf;

#[derive(Args)]
pub struct TemporalArgs {
    #[command(subcommand)]
    command: Option<TemporalCommand>,
}

#[derive(Subcommand)]
enum TemporalCommand {
    /// Show scheduler status
    Status,
    /// Add work to a queue
    Add {
        description: String,
        #[arg(long, value_enum, default_value_t = TimingArg::Either)]
        timing: TimingArg,
        /// Estimated quota usage in messages
        #[arg(long, default_value_t = 10)]
        quota: u32,
        /// Estimated duration in minutes
        #[arg(long, default_value_t = 30)]
        duration: u32,
        #[arg(long, default_value_t = 5)]
        priority: u8,
        #[arg(long)]
        project_path: Option<PathBuf>,
        #[arg(long)]
        project_name: Option<String>,
    },
    /// Select async work for the overnight window
    Schedule,
    /// Show the evening planning dashboard
    Evening,
    /// Classify the timing of a request
    Classify { request: String },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TimingArg {
    Sync,
    Async,
    Either,
}

impl From<TimingArg> for WorkTiming {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::Sync => WorkTiming::Sync,
            TimingArg::Async => WorkTiming::Async,
            TimingArg::Either => WorkTiming::Either,
        }
    }
}

pub fn run(args: TemporalArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let tracker = QuotaTracker::new(
        ctx.settings.quota_file(),
        ctx.lock_options(),
        ctx.clock.clone(),
    );
    let mut scheduler = TemporalScheduler::open(
        ctx.settings.temporal_queue_file(),
        &tracker,
        ctx.lock_options(),
        ctx.clock.clone(),
        (
            ctx.settings.active_hours_start,
            ctx.settings.active_hours_end,
        ),
    )?;

    match args.command.unwrap_or(TemporalCommand::Status) {
        TemporalCommand::Status => {
            let summary = scheduler.status_summary()?;
            println!("Temporal Scheduler Status");
            println!("{}", "=".repeat(40));
            println!(
                "Active hours: {}",
                if summary.is_active_hours { "yes" } else { "no" }
            );
            println!("Hours until reset: {:.1}", summary.hours_until_reset);
            println!("Sync queue: {} items", summary.sync_queue);
            println!("Async queue: {} items", summary.async_queue);
            println!("Scheduled overnight: {} items", summary.scheduled);
            println!("Completed overnight: {} items", summary.completed_overnight);
            println!("Failed: {} items", summary.failed);
            Ok(ExitCode::Success)
        }
        TemporalCommand::Add {
            description,
            timing,
            quota,
            duration,
            priority,
            project_path,
            project_name,
        } => {
            let id: String = uuid::Uuid::new_v4().to_string().chars().take(8).collect();
            let timing: WorkTiming = timing.into();
            let mut item =
                TimedWorkItem::new(&id, description, timing, ctx.clock.now_utc());
            item.estimated_quota = quota;
            item.estimated_duration_minutes = duration;
            item.priority = priority;
            item.project_path = project_path;
            item.project_name = project_name.clone();
            scheduler.add_work(item)?;
            println!("Added work: {id} ({timing})");
            if let Some(name) = project_name {
                println!("  Project: {name}");
            }
            Ok(ExitCode::Success)
        }
        TemporalCommand::Schedule => {
            let scheduled = scheduler.schedule_overnight_work()?;
            println!("Scheduled {} item(s) for overnight execution", scheduled.len());
            for item in scheduled {
                println!("  [{}] {}", item.priority, truncate(&item.description, 50));
            }
            Ok(ExitCode::Success)
        }
        TemporalCommand::Evening => {
            let summary = scheduler.status_summary()?;
            println!("Overnight Work Schedule");
            println!("{}", "=".repeat(60));
            println!("Time until quota reset: {:.1} hours", summary.hours_until_reset);
            println!();
            println!("Quota Utilization Forecast:");
            for tier in Tier::ALL {
                let pct = summary.quota_forecast.get(&tier).copied().unwrap_or(0.0);
                let filled = (pct / 5.0) as usize;
                let bar = format!("{}{}", "#".repeat(filled.min(20)), "-".repeat(20 - filled.min(20)));
                println!("  {tier:<8} [{bar}] {pct:.1}%");
            }
            println!();
            if scheduler.scheduled().is_empty() {
                println!("No work scheduled for tonight.");
            } else {
                println!("Scheduled for Tonight ({} items):", scheduler.scheduled().len());
                let mut total_minutes = 0u32;
                let mut total_quota = 0u32;
                for item in scheduler.scheduled() {
                    let tier = estimate_tier(item);
                    println!("  [{}] {}", item.priority, truncate(&item.description, 50));
                    println!(
                        "      Est: {}m, ~{} msgs ({tier})",
                        item.estimated_duration_minutes, item.estimated_quota
                    );
                    total_minutes += item.estimated_duration_minutes;
                    total_quota += item.estimated_quota;
                }
                println!();
                println!("  Total: {total_minutes}m, ~{total_quota} messages");
            }
            Ok(ExitCode::Success)
        }
        TemporalCommand::Classify { request } => {
            let timing = classify_timing(&request, &TimingContext::default());
            println!("Classification: {timing}");
            println!("  sync = requires user presence");
            println!("  async = can run unattended");
            println!("  either = flexible timing");
            Ok(ExitCode::Success)
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
