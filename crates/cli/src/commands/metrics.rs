// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relay metrics` - record metrics and generate reports.

use crate::context::CliContext;
use crate::exit::ExitCode;
use chrono::Duration;
use clap::{Args, Subcommand};
use relay_core::{Clock, Tier};
use relay_metrics::{MetricsRecord, MetricsSink, SolutionMetric};

#[derive(Args)]
pub struct MetricsArgs {
    #[command(subcommand)]
    command: MetricsCommand,
}

#[derive(Subcommand)]
enum MetricsCommand {
    /// Record a solution metric
    Record {
        solution: String,
        metric: String,
        #[arg(long, default_value_t = 1.0)]
        value: f64,
    },
    /// Aggregate a daily or weekly report
    Report {
        #[arg(value_enum, default_value_t = ReportPeriod::Daily)]
        period: ReportPeriod,
    },
    /// Show recorded solution metrics for today
    Show,
    /// Remove metric files older than the retention window
    Cleanup,
    /// Routing compliance report (recommendations vs actual handlers)
    Compliance {
        /// Trailing window in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ReportPeriod {
    Daily,
    Weekly,
}

pub fn run(args: MetricsArgs, ctx: &CliContext) -> anyhow::Result<ExitCode> {
    let sink = MetricsSink::new(ctx.settings.metrics_dir(), ctx.clock.clone());

    match args.command {
        MetricsCommand::Record {
            solution,
            metric,
            value,
        } => {
            sink.record_solution_metric(&solution, &metric, value, serde_json::json!({}))?;
            println!("Recorded {solution}/{metric} = {value}");
            Ok(ExitCode::Success)
        }
        MetricsCommand::Report { period } => {
            let today = ctx.clock.today();
            let days = match period {
                ReportPeriod::Daily => 1,
                ReportPeriod::Weekly => 7,
            };

            println!("Metrics Report");
            println!("{}", "=".repeat(50));
            let mut all_events = Vec::new();
            for offset in 0..days {
                let date = today - Duration::days(offset);
                let report = sink.daily_report(date);
                if report.agent_events > 0 || report.solution_metrics > 0 {
                    println!(
                        "{}: {} events, {} metrics, escalation {:.1}%",
                        report.date,
                        report.agent_events,
                        report.solution_metrics,
                        report.escalation_rate_percent
                    );
                }
                all_events.extend(sink.read_day(date).into_iter().filter_map(|r| match r {
                    MetricsRecord::AgentEvent(e) => Some(e),
                    _ => None,
                }));
            }

            let efficiency = MetricsSink::efficiency(&all_events);
            println!();
            println!("Cost efficiency (vs all-mid baseline):");
            for tier in Tier::ALL {
                let count = efficiency.tier_distribution.get(&tier).copied().unwrap_or(0);
                println!("  {tier}: {count} invocations");
            }
            println!(
                "  {} of {} units ({:.1}% saved)",
                efficiency.actual_cost_units,
                efficiency.baseline_cost_units,
                efficiency.savings_percent
            );
            Ok(ExitCode::Success)
        }
        MetricsCommand::Show => {
            let records = sink.read_day(ctx.clock.today());
            let metrics: Vec<&SolutionMetric> = records
                .iter()
                .filter_map(|r| match r {
                    MetricsRecord::SolutionMetric(m) => Some(m),
                    _ => None,
                })
                .collect();
            if metrics.is_empty() {
                println!("No solution metrics recorded today.");
            }
            for metric in metrics {
                println!(
                    "{} {}/{} = {}",
                    metric.timestamp, metric.solution, metric.metric_name, metric.value
                );
            }
            Ok(ExitCode::Success)
        }
        MetricsCommand::Cleanup => {
            let removed = sink.cleanup(ctx.settings.metrics_retention_days)?;
            println!("Removed {removed} expired metric file(s)");
            Ok(ExitCode::Success)
        }
        MetricsCommand::Compliance { days } => {
            let end = ctx.clock.today();
            let start = end - Duration::days(days.max(0));
            let report = relay_metrics::ComplianceAnalyzer::new(&sink).report(start, end);

            println!("Routing Compliance ({start} - {end})");
            println!("{}", "=".repeat(50));
            println!("Recommendations: {}", report.total_recommendations);
            println!("  followed:     {}", report.followed);
            println!("  ignored:      {}", report.ignored);
            println!("  no directive: {}", report.no_directive);
            println!("  unknown:      {}", report.unknown);
            println!("Compliance rate: {:.1}%", report.compliance_rate);
            if !report.ignored_examples.is_empty() {
                println!();
                println!("Ignored directives:");
                for record in &report.ignored_examples {
                    println!(
                        "  {} wanted {} got {}",
                        record.request_hash,
                        record.routing_agent.as_deref().unwrap_or("-"),
                        record.agent_invoked.as_deref().unwrap_or("main"),
                    );
                }
            }
            Ok(ExitCode::Success)
        }
    }
}
