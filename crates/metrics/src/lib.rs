// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Append-only metrics log and compliance analysis.

mod compliance;
mod records;
mod sink;

pub use compliance::{request_hash, ComplianceAnalyzer, ComplianceReport, ComplianceStatus};
pub use records::{
    AgentEvent, MetricsRecord, RequestTracking, RoutingRecommendation, SolutionMetric,
};
pub use sink::{DailyReport, EfficiencyReport, MetricsSink, SinkError, TargetStatus};
