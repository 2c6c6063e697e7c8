// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent matching.
//!
//! Two interchangeable implementations behind one trait: a keyword matcher
//! (the default, and a pure function of the request) and an LLM matcher
//! that asks the cheap tier itself and falls back to keywords on any error.

use crate::core::explicit_file_mentioned;
use regex::Regex;
use relay_adapters::subprocess::{run_blocking_with_deadline, MATCHER_TIMEOUT};
use relay_core::Tier;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

/// Maps a request to a candidate agent with a confidence score.
pub trait AgentMatcher: Send + Sync {
    /// Returns the matched agent (if any) and the match confidence.
    fn match_request(&self, request: &str) -> (Option<String>, f64);

    /// Minimum confidence for direct routing.
    fn threshold(&self) -> f64;
}

#[allow(clippy::expect_used)]
static CHEAP_HIGH_CONFIDENCE: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"fix\s+(typo|spelling|syntax)", 0.95),
        (r"format\s+(code|file)", 0.95),
        (r"lint\s+", 0.95),
        (r"rename\s+\w+(\s+\w+)?\s+to\s+\w+", 0.95),
        (r"add\s+(semicolon|comma|bracket|import)", 0.90),
        (r"remove\s+(trailing\s+whitespace|unused)", 0.90),
        (r"correct\s+(spelling|typo)", 0.95),
        (r"sort\s+(imports|lines)", 0.90),
    ]
    .into_iter()
    .map(|(pattern, conf)| {
        (
            Regex::new(pattern).expect("constant regex pattern is valid"),
            conf,
        )
    })
    .collect()
});

const CHEAP_KEYWORDS: [&str; 8] = [
    "fix", "typo", "syntax", "format", "lint", "rename", "correct", "spelling",
];
const MID_KEYWORDS: [&str; 8] = [
    "analyze",
    "implement",
    "refactor",
    "integrate",
    "review",
    "optimize",
    "debug",
    "investigate",
];
const STRONG_KEYWORDS: [&str; 6] = [
    "prove",
    "formalize",
    "verify correctness",
    "mathematical",
    "theorem",
    "algorithm design",
];

/// Keyword-based matcher with tiered pattern groups.
#[derive(Debug, Default, Clone)]
pub struct KeywordMatcher;

impl KeywordMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl AgentMatcher for KeywordMatcher {
    fn match_request(&self, request: &str) -> (Option<String>, f64) {
        let lower = request.to_lowercase();

        // Mechanical patterns the cheap tier excels at, gated on an
        // explicit file target
        for (pattern, confidence) in CHEAP_HIGH_CONFIDENCE.iter() {
            if pattern.is_match(&lower) && explicit_file_mentioned(request) {
                return (Some(Tier::Cheap.general_agent().to_string()), *confidence);
            }
        }

        let cheap_matches = CHEAP_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
        if cheap_matches > 0 && explicit_file_mentioned(request) {
            let confidence = (0.6 + cheap_matches as f64 * 0.1).min(0.9);
            return (Some(Tier::Cheap.general_agent().to_string()), confidence);
        }

        let mid_matches = MID_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
        if mid_matches > 0 {
            let confidence = (0.5 + mid_matches as f64 * 0.15).min(0.9);
            return (Some(Tier::Mid.general_agent().to_string()), confidence);
        }

        let strong_matches = STRONG_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count();
        if strong_matches > 0 {
            let confidence = (0.7 + strong_matches as f64 * 0.1).min(0.95);
            return (Some(Tier::Strong.general_agent().to_string()), confidence);
        }

        // Simple operation with an explicit file still suits the cheap tier
        if explicit_file_mentioned(request) {
            return (Some(Tier::Cheap.general_agent().to_string()), 0.6);
        }

        (None, 0.0)
    }

    fn threshold(&self) -> f64 {
        0.8
    }
}

/// Expected answer shape from the LLM matcher. Any other shape is a miss.
#[derive(Debug, Deserialize)]
struct LlmAnswer {
    agent: Option<String>,
    #[serde(default)]
    confidence: f64,
}

/// LLM-backed matcher that shells out to the cheap tier.
///
/// Sets `RELAY_NO_HOOKS=1` in the child environment so the host's hooks do
/// not recursively invoke the router while it is routing.
pub struct LlmMatcher {
    command: PathBuf,
    timeout: Duration,
    descriptions: Vec<(String, String)>,
    fallback: KeywordMatcher,
}

impl LlmMatcher {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            timeout: MATCHER_TIMEOUT,
            descriptions: default_agent_descriptions(),
            fallback: KeywordMatcher::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_descriptions(mut self, descriptions: Vec<(String, String)>) -> Self {
        self.descriptions = descriptions;
        self
    }

    fn build_prompt(&self, request: &str) -> String {
        let agents_list = self
            .descriptions
            .iter()
            .map(|(name, desc)| format!("- {name}: {desc}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Given this user request, which agent should handle it?\n\n\
             Request: {request}\n\n\
             Available agents:\n{agents_list}\n\n\
             Respond with ONLY a JSON object (no markdown, no explanation):\n\
             {{\"agent\": \"<agent-name or null>\", \"confidence\": <0.0-1.0>}}\n\n\
             If the request is ambiguous or requires judgment to route, \
             return null with low confidence."
        )
    }

    /// Ask the cheap tier; `None` means the call failed and the keyword
    /// fallback should run.
    fn ask_llm(&self, request: &str) -> Option<(Option<String>, f64)> {
        let prompt = self.build_prompt(request);

        let mut cmd = std::process::Command::new(&self.command);
        cmd.arg("-p")
            .arg(&prompt)
            .arg("--model")
            .arg(Tier::Cheap.as_str())
            .arg("--output-format")
            .arg("json")
            .env("RELAY_NO_HOOKS", "1");

        let output = match run_blocking_with_deadline(cmd, self.timeout, "LLM agent matching") {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!(code = output.status.code(), "LLM matcher exited nonzero");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "LLM matcher call failed");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let envelope: serde_json::Value = serde_json::from_str(stdout.trim()).ok()?;
        let content = envelope.get("result")?.as_str()?;

        let answer = parse_answer(content)?;

        // Fail closed on agent names we did not offer
        if let Some(name) = &answer.agent {
            if !self.descriptions.iter().any(|(n, _)| n == name) {
                return Some((None, 0.0));
            }
        }
        Some((answer.agent, answer.confidence.clamp(0.0, 1.0)))
    }
}

/// Extract the `{agent, confidence}` object, tolerating markdown fences.
fn parse_answer(content: &str) -> Option<LlmAnswer> {
    #[allow(clippy::expect_used)]
    static FENCED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")
            .expect("constant regex pattern is valid")
    });

    let body = if content.contains("```") {
        FENCED.captures(content)?.get(1)?.as_str()
    } else {
        content.trim()
    };
    serde_json::from_str(body).ok()
}

impl AgentMatcher for LlmMatcher {
    fn match_request(&self, request: &str) -> (Option<String>, f64) {
        match self.ask_llm(request) {
            Some(answer) => answer,
            None => {
                warn!("LLM routing failed, falling back to keywords");
                self.fallback.match_request(request)
            }
        }
    }

    fn threshold(&self) -> f64 {
        0.7
    }
}

fn default_agent_descriptions() -> Vec<(String, String)> {
    vec![
        (
            "cheap-general".to_string(),
            "Simple mechanical tasks: fix typos, correct spelling, format code, \
             lint files, rename variables. Tasks with explicit file paths that \
             require no judgment."
                .to_string(),
        ),
        (
            "mid-general".to_string(),
            "Tasks requiring reasoning: analyze code, design features, implement \
             functionality, refactor, review, optimize. Default for tasks needing \
             judgment."
                .to_string(),
        ),
        (
            "strong-general".to_string(),
            "Complex reasoning: mathematical proofs, formal verification, \
             architecture decisions, algorithm design. High-stakes decisions \
             requiring deep analysis."
                .to_string(),
        ),
    ]
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
