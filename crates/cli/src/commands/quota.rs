// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay quota` - quota status, increments, and recommendations.

use crate::context::CliContext;
use crate::exit::ExitCode;
use clap::{Args, Subcommand};
use relay_core::Tier;
use relay_engine::{QuotaAwareScheduler, QuotaTracker, TierSelection};

#[derive(Args)]
pub struct QuotaArgs {
    #[command(subcommand)]
    command: Option<QuotaCommand>,
}

#[derive(Subcommand)]
enum QuotaCommand {
    /// Show quota status
    Status,
    /// Increment quota usage for a tier
    Increment {
        tier: Tier,
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Check whether a tier has quota (exit 0 yes, 1 no)
    CanUse { tier: Tier },
    /// Recommend a tier for a 1-5 complexity estimate
    Recommend { complexity: u8 },
}

pub fn run(args: QuotaArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let tracker = QuotaTracker::new(
        ctx.settings.quota_file(),
        ctx.lock_options(),
        ctx.clock.clone(),
    );

    match args.command.unwrap_or(QuotaCommand::Status) {
        QuotaCommand::Status => {
            let summary = tracker.summary()?;
            println!("Quota Status");
            println!("{}", "=".repeat(50));
            println!("Date: {}", summary.date);
            for tier in Tier::ALL {
                let entry = summary.tier(tier);
                match entry.limit {
                    None => println!("  {tier}: {} used (unlimited)", entry.used),
                    Some(limit) => {
                        let status = if entry.percent < 80.0 {
                            "OK"
                        } else if entry.percent < 95.0 {
                            "WARNING"
                        } else {
                            "CRITICAL"
                        };
                        println!(
                            "  {tier}: {}/{limit} ({}%) [{status}]",
                            entry.used, entry.percent
                        );
                        if let Some(effective) = entry.effective_limit {
                            println!("    Effective limit (with buffer): {effective}");
                        }
                    }
                }
            }
            Ok(ExitCode::Success)
        }
        QuotaCommand::Increment { tier, count } => {
            let total = tracker.increment(tier, count)?;
            println!("Incremented {tier} by {count}. New total: {total}");
            Ok(ExitCode::Success)
        }
        QuotaCommand::CanUse { tier } => {
            let available = tracker.can_use(tier)?;
            println!("Can use {tier}: {available}");
            Ok(if available {
                ExitCode::Success
            } else {
                ExitCode::Fatal
            })
        }
        QuotaCommand::Recommend { complexity } => {
            let scheduler = QuotaAwareScheduler::new(&tracker);
            let rec = scheduler.recommend(complexity)?;
            match scheduler.select(complexity)? {
                TierSelection::Tier(tier) => println!("Recommended tier: {tier}"),
                TierSelection::DeferToTomorrow => println!("Recommended: defer to tomorrow"),
            }
            println!("Complexity: {}", rec.complexity);
            println!("Reasoning:");
            for line in &rec.reasoning {
                println!("  - {line}");
            }
            Ok(ExitCode::Success)
        }
    }
}
