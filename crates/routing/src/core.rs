// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mechanical pre-routing.
//!
//! A rule checklist the cheap tier can execute reliably: pattern matching
//! and keyword detection only, no judgment. First matching rule wins; a
//! request that survives every rule goes to agent matching.

use crate::matcher::{AgentMatcher, KeywordMatcher};
use regex::Regex;
use relay_core::{validate_request, RequestError, RoutingResult};
use std::sync::LazyLock;

/// Keywords that signal the request itself admits complexity.
const COMPLEXITY_KEYWORDS: [&str; 12] = [
    "complex",
    "subtle",
    "nuanced",
    "judgment",
    "trade-off",
    "best approach",
    "design",
    "architecture",
    "should i",
    "which is better",
    "recommend",
    "decide",
];

const DESTRUCTIVE_VERBS: [&str; 3] = ["delete", "remove", "drop"];
const BULK_QUANTIFIERS: [&str; 4] = ["all", "multiple", "*", "every"];
const FILE_OPERATIONS: [&str; 6] = ["edit", "modify", "change", "update", "delete", "remove"];
const MUTATING_VERBS: [&str; 3] = ["edit", "modify", "update"];
const OBJECTIVE_SEPARATORS: [&str; 5] = [" and ", ", then ", " after ", " before ", ";"];
const CREATION_KEYWORDS: [&str; 5] = ["new", "create", "design", "build", "implement"];

/// The host assistant's agent-definition directory.
const AGENTS_DIR_TOKEN: &str = ".claude/agents";

#[allow(clippy::expect_used)]
static FILE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // filename.ext (2-4 char extension); also matches version numbers
        // like 3.14; thresholds downstream are tuned against this
        Regex::new(r"\b\w+\.\w{2,4}\b").expect("constant regex pattern is valid"),
        // path/to/file or ./file
        Regex::new(r"[\./][\w/.-]+").expect("constant regex pattern is valid"),
        // dir/file
        Regex::new(r"\w+/\w+").expect("constant regex pattern is valid"),
        // ~/path/file
        Regex::new(r"~[\w/.-]+").expect("constant regex pattern is valid"),
    ]
});

/// Check whether a request names an explicit file or path.
pub fn explicit_file_mentioned(request: &str) -> bool {
    FILE_PATTERNS.iter().any(|p| p.is_match(request))
}

/// Mechanical pre-router.
pub struct Router {
    matcher: Box<dyn AgentMatcher>,
}

impl Default for Router {
    fn default() -> Self {
        Self::keyword()
    }
}

impl Router {
    /// Router backed by the keyword matcher.
    pub fn keyword() -> Self {
        Self {
            matcher: Box::new(KeywordMatcher::new()),
        }
    }

    pub fn with_matcher(matcher: Box<dyn AgentMatcher>) -> Self {
        Self { matcher }
    }

    /// Route a request: escalate on any mechanical trigger, otherwise match
    /// an agent and route directly when confidence clears the matcher's
    /// threshold.
    pub fn route(&self, request: &str) -> Result<RoutingResult, RequestError> {
        validate_request(request)?;
        let lower = request.to_lowercase();

        // Rule 1: explicit complexity signals
        if COMPLEXITY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Ok(RoutingResult::escalate(
                "Request contains complexity signal keywords",
                1.0,
            ));
        }

        // Rule 2: bulk destructive operations
        let is_destructive = DESTRUCTIVE_VERBS.iter().any(|v| lower.contains(v));
        let is_bulk = BULK_QUANTIFIERS.iter().any(|q| lower.contains(q));
        if is_destructive && is_bulk {
            return Ok(RoutingResult::escalate(
                "Bulk destructive operation requires judgment",
                1.0,
            ));
        }

        // Rule 3: multiple objectives. Checked before the ambiguous-target
        // rule so a multi-part request reports coordination, not discovery.
        let objective_count: usize = OBJECTIVE_SEPARATORS
            .iter()
            .map(|sep| lower.matches(sep).count())
            .sum();
        if objective_count >= 2 {
            return Ok(RoutingResult::escalate(
                format!("Multiple objectives ({objective_count}) require coordination"),
                0.9,
            ));
        }

        // Rule 4: file operations without an explicit target
        let has_explicit_path = request.contains('/') || explicit_file_mentioned(request);
        let has_file_operation = FILE_OPERATIONS.iter().any(|op| lower.contains(op));
        if has_file_operation && !has_explicit_path {
            return Ok(RoutingResult::escalate(
                "File operation without explicit path - needs file discovery",
                0.9,
            ));
        }

        // Rule 5: agent definition changes
        if request.contains(AGENTS_DIR_TOKEN)
            && MUTATING_VERBS.iter().any(|op| lower.contains(op))
        {
            return Ok(RoutingResult::escalate(
                "Agent definition changes require careful judgment",
                1.0,
            ));
        }

        // Rule 6: creation and design work, except plain "new file <path>"
        if CREATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
            && !(lower.contains("new file") && explicit_file_mentioned(request))
        {
            return Ok(RoutingResult::escalate(
                "Creation/design tasks require planning and judgment",
                0.85,
            ));
        }

        // Rule 7: agent matching
        let (matched, confidence) = self.matcher.match_request(request);
        let Some(agent) = matched else {
            return Ok(RoutingResult::escalate(
                "No clear agent match - needs intelligent routing",
                1.0,
            ));
        };

        if confidence < self.matcher.threshold() {
            return Ok(RoutingResult::escalate_with_candidate(
                agent,
                format!("Low confidence match ({confidence:.2}) - needs verification"),
                confidence,
            ));
        }

        Ok(RoutingResult::direct(
            agent,
            "High-confidence agent match",
            confidence,
        ))
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
