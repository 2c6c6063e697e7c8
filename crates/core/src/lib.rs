// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-core: Core types for the relay routing control plane

pub mod clock;
pub mod embed;
pub mod request;
pub mod routing;
pub mod settings;
pub mod shutdown;
pub mod tier;
pub mod timed;
pub mod work;

pub use clock::{Clock, FakeClock, SystemClock};
pub use embed::{cosine_similarity, Embedder, TokenFrequencyEmbedder};
pub use request::{validate_request, RequestError, MAX_REQUEST_LEN};
pub use routing::{
    ComplexityAnalysis, ComplexityLevel, OrchestrationMode, RouteDecision, RoutingConfidence,
    RoutingDecision, RoutingResult,
};
pub use settings::Settings;
pub use shutdown::ShutdownFlag;
pub use tier::Tier;
pub use timed::{TimedStatus, TimedWorkItem, WorkTiming};
pub use work::{WorkItem, WorkItemBuilder, WorkStatus};
