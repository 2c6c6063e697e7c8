// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay work` - the WIP-bounded work queue.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::{Args, Subcommand};
use relay_core::{WorkItem, WorkStatus};
use relay_engine::WorkCoordinator;

#[derive(Args)]
pub struct WorkArgs {
    /// Maximum concurrent active items
    #[arg(long)]
    wip_limit: Option<usize>,

    #[command(subcommand)]
    command: WorkCommand,
}

#[derive(Subcommand)]
enum WorkCommand {
    /// Add a work item
    Add {
        description: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value_t = 5)]
        priority: u8,
        #[arg(long, default_value_t = 3)]
        complexity: u8,
        /// Dependency ids (repeatable)
        #[arg(long = "dep")]
        deps: Vec<String>,
    },
    /// Fill free WIP slots with eligible work
    Schedule,
    /// Mark an item completed
    Complete {
        id: String,
        #[arg(long)]
        agent: Option<String>,
    },
    /// Mark an item failed
    Fail { id: String, error: String },
    /// Show queue status
    Status,
}

pub fn run(args: WorkArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let mut coordinator = WorkCoordinator::open(
        ctx.settings.work_queue_file(),
        args.wip_limit.unwrap_or(ctx.settings.wip_limit),
        ctx.lock_options(),
        ctx.clock.clone(),
    )?;

    match args.command {
        WorkCommand::Add {
            description,
            id,
            priority,
            complexity,
            deps,
        } => {
            let id = id.unwrap_or_else(|| {
                uuid::Uuid::new_v4().to_string().chars().take(8).collect()
            });
            let item = WorkItem::builder()
                .id(&id)
                .description(description)
                .priority(priority)
                .estimated_complexity(complexity)
                .dependencies(deps)
                .build();
            coordinator.add(item)?;
            println!("Added work: {id}");
            Ok(ExitCode::Success)
        }
        WorkCommand::Schedule => {
            let started = coordinator.schedule()?;
            println!("Started {} item(s)", started.len());
            for item in started {
                println!("  [{}] {}", item.id, item.description);
            }
            Ok(ExitCode::Success)
        }
        WorkCommand::Complete { id, agent } => {
            let newly = coordinator.complete(&id, agent.as_deref())?;
            println!("Completed {id}");
            for item in newly {
                println!("  started [{}] {}", item.id, item.description);
            }
            Ok(ExitCode::Success)
        }
        WorkCommand::Fail { id, error } => {
            let newly = coordinator.fail(&id, &error)?;
            println!("Failed {id}: {error}");
            for item in newly {
                println!("  started [{}] {}", item.id, item.description);
            }
            Ok(ExitCode::Success)
        }
        WorkCommand::Status => {
            let summary = coordinator.status_summary();
            println!("Work Status");
            println!("{}", "=".repeat(50));
            println!("Active ({}/{}):", summary.active, summary.wip_limit);
            for item in coordinator
                .items()
                .iter()
                .filter(|w| w.status == WorkStatus::Active)
            {
                println!(
                    "  [{}] {} (agent: {})",
                    item.id,
                    item.description,
                    item.agent.as_deref().unwrap_or("unassigned")
                );
            }
            println!("Queued: {}", summary.queued);
            println!("Completed: {}", summary.completed);
            println!("Failed: {}", summary.failed);
            Ok(ExitCode::Success)
        }
    }
}
