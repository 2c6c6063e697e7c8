// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability tiers.
//!
//! Every agent maps to exactly one tier via its definition's `model` field.
//! Tiers are totally ordered by capability and cost: cheap < mid < strong.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three capability levels a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Cheap,
    Mid,
    Strong,
}

impl Tier {
    /// All tiers, ascending by capability.
    pub const ALL: [Tier; 3] = [Tier::Cheap, Tier::Mid, Tier::Strong];

    /// The strongest tier is the end of every fallback chain.
    pub fn is_top(self) -> bool {
        self == Tier::Strong
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Cheap => "cheap",
            Tier::Mid => "mid",
            Tier::Strong => "strong",
        }
    }

    /// Default general-purpose agent name for this tier.
    pub fn general_agent(self) -> &'static str {
        match self {
            Tier::Cheap => "cheap-general",
            Tier::Mid => "mid-general",
            Tier::Strong => "strong-general",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized tier names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct ParseTierError(pub String);

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cheap" => Ok(Tier::Cheap),
            "mid" => Ok(Tier::Mid),
            "strong" => Ok(Tier::Strong),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tier_tests.rs"]
mod tests;
