// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters to the outside world: agent subprocesses and agent definitions.

pub mod agent;
pub mod subprocess;

pub use agent::{AgentError, AgentExecutor, CliAgentExecutor};
pub use agent::{tier_for_agent, AgentDefinition, DefinitionError};
pub use subprocess::{run_blocking_with_deadline, run_with_timeout};

#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAgentExecutor};
