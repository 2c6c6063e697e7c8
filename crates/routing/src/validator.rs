// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-execution result validation.
//!
//! Validators are a closed set keyed by tag; the table is built at
//! construction. Validation failures are ordinary values that drive the
//! fallback chain, not errors.

use crate::checkers::CheckerRegistry;
use regex::Regex;
use relay_adapters::subprocess::{run_blocking_with_deadline, TEST_COMMAND_TIMEOUT};
use relay_core::Tier;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Pass,
    Fail { reason: String },
}

impl Validation {
    pub fn fail(reason: impl Into<String>) -> Self {
        Validation::Fail {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Validation::Pass)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Validation::Pass => None,
            Validation::Fail { reason } => Some(reason),
        }
    }
}

/// Extra context validators may use.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Command (argv) that runs the project's tests
    pub test_command: Option<Vec<String>>,
    /// Working directory for the test command
    pub cwd: Option<PathBuf>,
}

type ValidatorFn = fn(&ResultValidator, &Value, &ValidationContext) -> Validation;

/// Markers that indicate an error buried in textual output.
const ERROR_MARKERS: [&str; 7] = [
    "error:",
    "failed:",
    "exception:",
    "traceback:",
    "fatal:",
    "panic:",
    "abort:",
];

/// Failure signals any tier can fix; never grounds for skipping one.
const MECHANICAL_INDICATORS: [&str; 9] = [
    "syntax error",
    "brace mismatch",
    "environment mismatch",
    "json syntax",
    "no results found",
    "no matches found",
    "no files found",
    "command not found",
    "timed out",
];

#[allow(clippy::expect_used)]
static REASONING_FAILURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"tests? failed.*logic",
        r"assertion.*error",
        r"unexpected (behavior|result|output)",
        r"design (flaw|issue|problem)",
        r"architectural",
        r"race condition",
        r"incorrect (logic|algorithm|approach)",
        r"fundamental",
        r"conceptual",
        r"misunderst",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("constant regex pattern is valid"))
    .collect()
});

/// Validates agent results against criteria tags.
pub struct ResultValidator {
    validators: HashMap<&'static str, ValidatorFn>,
    checkers: CheckerRegistry,
}

impl Default for ResultValidator {
    fn default() -> Self {
        Self::new(CheckerRegistry::default())
    }
}

impl ResultValidator {
    pub fn new(checkers: CheckerRegistry) -> Self {
        let mut validators: HashMap<&'static str, ValidatorFn> = HashMap::new();
        validators.insert("syntax_valid", Self::validate_syntax);
        validators.insert("no_logic_change", Self::validate_no_logic_change);
        validators.insert("results_found", Self::validate_results_found);
        validators.insert("output_valid", Self::validate_output);
        validators.insert("user_verify", Self::validate_user_verify);
        Self {
            validators,
            checkers,
        }
    }

    /// Run criteria in order; the first failure wins. Unknown tags are
    /// skipped.
    pub fn validate(
        &self,
        result: &Value,
        criteria: &[String],
        context: &ValidationContext,
    ) -> Validation {
        for criterion in criteria {
            if let Some(validator) = self.validators.get(criterion.as_str()) {
                let outcome = validator(self, result, context);
                if !outcome.is_pass() {
                    return outcome;
                }
            }
        }
        Validation::Pass
    }

    /// Should a fallback tier be skipped for this failure?
    ///
    /// The strongest tier is never skipped. Mechanical failures are fixable
    /// anywhere; reasoning-level failures exceed intermediate tiers.
    pub fn should_skip_tier(&self, failure_reason: &str, candidate: Tier) -> bool {
        if candidate.is_top() {
            return false;
        }

        let lower = failure_reason.to_lowercase();
        if MECHANICAL_INDICATORS.iter().any(|ind| lower.contains(ind)) {
            return false;
        }

        if REASONING_FAILURES.iter().any(|p| p.is_match(&lower)) {
            info!(%candidate, "failure indicates reasoning complexity, skipping tier");
            return true;
        }

        false
    }

    // ── Validators ───────────────────────────────────────────────────────

    /// `syntax_valid`: if the result names a modified file, run its
    /// extension's checker.
    fn validate_syntax(&self, result: &Value, _context: &ValidationContext) -> Validation {
        let path = match result {
            Value::Object(map) => map
                .get("modified_file")
                .or_else(|| map.get("file_path"))
                .and_then(Value::as_str)
                .map(PathBuf::from),
            Value::String(s) if Path::new(s).exists() => Some(PathBuf::from(s)),
            _ => None,
        };

        match path {
            Some(path) => self.checkers.check(&path),
            None => Validation::Pass,
        }
    }

    /// `no_logic_change`: run the configured test command; no command
    /// means nothing to verify.
    fn validate_no_logic_change(&self, _result: &Value, context: &ValidationContext) -> Validation {
        let Some(argv) = context.test_command.as_deref() else {
            return Validation::Pass;
        };
        let Some((program, args)) = argv.split_first() else {
            return Validation::Pass;
        };

        let mut cmd = std::process::Command::new(program);
        cmd.args(args);
        if let Some(cwd) = &context.cwd {
            cmd.current_dir(cwd);
        }

        match run_blocking_with_deadline(cmd, TEST_COMMAND_TIMEOUT, "test command") {
            Ok(output) if output.status.success() => Validation::Pass,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Validation::fail(format!(
                    "Tests failed: {}",
                    stderr.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.contains("timed out") => Validation::fail("Tests timed out"),
            // Unrunnable test command is not the agent's failure
            Err(_) => Validation::Pass,
        }
    }

    /// `results_found`: search-style results must be non-empty.
    fn validate_results_found(&self, result: &Value, _context: &ValidationContext) -> Validation {
        match result {
            Value::Array(items) if items.is_empty() => Validation::fail("No results found"),
            Value::Object(map) => {
                for (key, label) in [
                    ("results", "No results found"),
                    ("matches", "No matches found"),
                    ("files", "No files found"),
                ] {
                    if let Some(Value::Array(items)) = map.get(key) {
                        if items.is_empty() {
                            return Validation::fail(label);
                        }
                    }
                }
                Validation::Pass
            }
            Value::String(s) => {
                let lower = s.to_lowercase();
                if lower.contains("no results") || lower.contains("not found") {
                    Validation::fail("No results found")
                } else {
                    Validation::Pass
                }
            }
            _ => Validation::Pass,
        }
    }

    /// `output_valid`: scan for error markers in text or error fields in
    /// structured results.
    fn validate_output(&self, result: &Value, _context: &ValidationContext) -> Validation {
        match result {
            Value::String(s) => {
                let lower = s.to_lowercase();
                for marker in ERROR_MARKERS {
                    if lower.contains(marker) {
                        return Validation::fail(format!("Error detected in output: {marker}"));
                    }
                }
                Validation::Pass
            }
            Value::Object(map) => {
                let has_error = map.get("error").is_some_and(|e| !e.is_null())
                    || map.get("status").and_then(Value::as_str) == Some("error");
                if has_error {
                    let detail = map
                        .get("error")
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    Validation::fail(format!("Error in result: {detail}"))
                } else {
                    Validation::Pass
                }
            }
            _ => Validation::Pass,
        }
    }

    /// `user_verify`: always passes, but the review flag is observable in
    /// the logs.
    fn validate_user_verify(&self, _result: &Value, _context: &ValidationContext) -> Validation {
        info!("result flagged for user review");
        Validation::Pass
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
