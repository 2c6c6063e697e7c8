// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable per-extension syntax checkers.
//!
//! In-process checks for formats the control plane can parse itself
//! (JSON, LaTeX balance), external tools for the rest. A missing external
//! tool is a PASS: absence of a checker is not evidence of bad syntax.

use crate::validator::Validation;
use regex::Regex;
use relay_adapters::subprocess::{run_blocking_with_deadline, CHECKER_TIMEOUT};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Checks one file for syntax errors.
pub trait SyntaxChecker: Send + Sync {
    fn check(&self, path: &Path) -> Validation;
}

/// Registry mapping file extensions to checkers. Unknown extensions pass.
pub struct CheckerRegistry {
    by_extension: HashMap<String, Box<dyn SyntaxChecker>>,
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        let mut registry = Self {
            by_extension: HashMap::new(),
        };
        registry.register("json", Box::new(JsonChecker));
        registry.register("tex", Box::new(LatexChecker));
        registry.register(
            "py",
            Box::new(ExternalChecker::new("python3", &["-m", "py_compile"])),
        );
        for ext in ["js", "ts", "tsx"] {
            registry.register(ext, Box::new(ExternalChecker::new("node", &["--check"])));
        }
        registry
    }
}

impl CheckerRegistry {
    pub fn register(&mut self, extension: &str, checker: Box<dyn SyntaxChecker>) {
        self.by_extension.insert(extension.to_string(), checker);
    }

    /// Check a file with the checker registered for its extension.
    pub fn check(&self, path: &Path) -> Validation {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Validation::Pass;
        };
        match self.by_extension.get(ext) {
            Some(checker) => checker.check(path),
            None => Validation::Pass,
        }
    }
}

/// In-process JSON parse check.
struct JsonChecker;

impl SyntaxChecker for JsonChecker {
    fn check(&self, path: &Path) -> Validation {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Validation::fail(format!("JSON validation error: {e}")),
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(_) => Validation::Pass,
            Err(e) => Validation::fail(format!(
                "JSON syntax error at line {}: {}",
                e.line(),
                e
            )),
        }
    }
}

/// Brace and environment balance checks for LaTeX.
struct LatexChecker;

#[allow(clippy::expect_used)]
static BEGIN_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{(\w+)\}").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static END_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\{(\w+)\}").expect("constant regex pattern is valid"));

impl SyntaxChecker for LatexChecker {
    fn check(&self, path: &Path) -> Validation {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Validation::fail(format!("LaTeX validation error: {e}")),
        };

        let open = content.matches('{').count();
        let close = content.matches('}').count();
        if open != close {
            return Validation::fail(format!(
                "Brace mismatch: {open} open, {close} close"
            ));
        }

        let begins = BEGIN_ENV.find_iter(&content).count();
        let ends = END_ENV.find_iter(&content).count();
        if begins != ends {
            return Validation::fail(format!(
                "Environment mismatch: {begins} begins, {ends} ends"
            ));
        }

        Validation::Pass
    }
}

/// External tool checker (`python3 -m py_compile`, `node --check`, …).
///
/// Tool absence is PASS, matching the contract that missing toolchains
/// never fail validation.
pub struct ExternalChecker {
    program: String,
    args: Vec<String>,
}

impl ExternalChecker {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SyntaxChecker for ExternalChecker {
    fn check(&self, path: &Path) -> Validation {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args).arg(path);

        let description = format!("{} syntax check", self.program);
        match run_blocking_with_deadline(cmd, CHECKER_TIMEOUT, &description) {
            Ok(output) if output.status.success() => Validation::Pass,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Validation::fail(format!(
                    "{} syntax error: {}",
                    self.program,
                    stderr.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.contains("timed out") => Validation::fail(e),
            Err(e) => {
                // Tool not installed or not runnable: skip the check
                debug!(tool = %self.program, error = %e, "syntax checker unavailable");
                Validation::Pass
            }
        }
    }
}

#[cfg(test)]
#[path = "checkers_tests.rs"]
mod tests;
