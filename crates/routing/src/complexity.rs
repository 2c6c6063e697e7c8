// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heuristic complexity classification.
//!
//! Pure pattern matching, no model calls, so classification adds no
//! latency to the request path.

use crate::core::explicit_file_mentioned;
use crate::orchestrator::OrchestratorConfig;
use regex::Regex;
use relay_core::{ComplexityAnalysis, ComplexityLevel, OrchestrationMode};
use tracing::warn;

/// Simple indicators: mechanical or read-only, single explicit target.
const SIMPLE_INDICATORS: [(&str, &str); 13] = [
    (r"fix\s+(typo|spelling|syntax)", "mechanical_fix"),
    (r"format\s+(code|file)", "mechanical_format"),
    (r"lint\s+", "mechanical_lint"),
    (r"rename\s+\w+.*\s+to\s+\w+", "mechanical_rename"),
    (r"add\s+(semicolon|comma|bracket|import)", "mechanical_add"),
    (r"remove\s+(trailing\s+whitespace|unused)", "mechanical_remove"),
    (r"correct\s+(spelling|typo)", "mechanical_correct"),
    (r"sort\s+(imports|lines)", "mechanical_sort"),
    (r"show\s+", "read_only_show"),
    (r"display\s+", "read_only_display"),
    (r"list\s+", "read_only_list"),
    (r"get\s+", "read_only_get"),
    (r"read\s+", "read_only_read"),
];

/// Complex indicators: ambiguity, judgment, multi-step structure.
const COMPLEX_INDICATORS: [(&str, &str); 8] = [
    (r"\b(design|architecture|implement)\b", "requires_design"),
    (r"\b(best|better|optimal|should i|which)\b", "requires_judgment"),
    (
        r"\b(trade-off|tradeoff|pros and cons|evaluate)\b",
        "requires_analysis",
    ),
    (r"\b(complex|nuanced|subtle|careful)\b", "explicit_complexity"),
    (r"\b(integrate|refactor|restructure)\b", "structural_change"),
    (
        r"\b(multiple|several|all|every)\b.*\b(file|module|component)\b",
        "multi_target",
    ),
    (r"\b(plan|strategy|approach)\b", "requires_planning"),
    (r"\banalyze\b", "requires_analysis"),
];

/// Separators suggesting distinct objectives needing coordination.
const MULTI_OBJECTIVE_MARKERS: [&str; 6] =
    [" and then ", ", then ", " after ", " before ", ";", "\n"];

/// Objective count at which a request is complex outright.
const COMPLEX_OBJECTIVE_COUNT: usize = 3;

/// Fast heuristic complexity classifier.
pub struct ComplexityClassifier {
    simple: Vec<(Regex, String)>,
    complex: Vec<(Regex, String)>,
    simple_base: f64,
    simple_weight: f64,
    complex_base: f64,
    complex_weight: f64,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(&OrchestratorConfig::default())
    }
}

impl ComplexityClassifier {
    /// Build the classifier, merging configured custom patterns with the
    /// built-in families. Invalid custom patterns are dropped with a
    /// warning.
    pub fn new(config: &OrchestratorConfig) -> Self {
        let compile = |built_in: &[(&str, &str)], custom: &[(String, String)]| {
            let mut patterns = Vec::with_capacity(built_in.len() + custom.len());
            for (pattern, tag) in built_in {
                #[allow(clippy::expect_used)]
                patterns.push((
                    Regex::new(pattern).expect("constant regex pattern is valid"),
                    (*tag).to_string(),
                ));
            }
            for (pattern, tag) in custom {
                match Regex::new(pattern) {
                    Ok(regex) => patterns.push((regex, tag.clone())),
                    Err(e) => warn!(pattern, error = %e, "invalid custom pattern dropped"),
                }
            }
            patterns
        };

        Self {
            simple: compile(&SIMPLE_INDICATORS, &config.custom_simple_patterns),
            complex: compile(&COMPLEX_INDICATORS, &config.custom_complex_patterns),
            simple_base: config.simple_base,
            simple_weight: config.simple_weight,
            complex_base: config.complex_base,
            complex_weight: config.complex_weight,
        }
    }

    /// Count distinct objectives (1 plus separator occurrences).
    pub fn count_objectives(&self, request: &str) -> usize {
        let lower = request.to_lowercase();
        1 + MULTI_OBJECTIVE_MARKERS
            .iter()
            .map(|marker| lower.matches(marker).count())
            .sum::<usize>()
    }

    /// Classify a request.
    pub fn classify(&self, request: &str) -> ComplexityAnalysis {
        let lower = request.to_lowercase();
        let mut indicators = Vec::new();

        let simple_matches: Vec<&str> = self
            .simple
            .iter()
            .filter(|(pattern, _)| pattern.is_match(&lower))
            .map(|(_, tag)| tag.as_str())
            .collect();
        for tag in &simple_matches {
            indicators.push(format!("simple:{tag}"));
        }

        let mut complex_count = 0usize;
        for (pattern, tag) in &self.complex {
            if pattern.is_match(&lower) {
                indicators.push(format!("complex:{tag}"));
                complex_count += 1;
            }
        }

        let has_explicit_path = explicit_file_mentioned(request);
        if has_explicit_path {
            indicators.push("has_explicit_path".to_string());
        }

        let objectives = self.count_objectives(request);
        if objectives >= COMPLEX_OBJECTIVE_COUNT {
            indicators.push(format!("multi_objective:{objectives}"));
            complex_count += 1;
        }

        if !simple_matches.is_empty() && has_explicit_path && complex_count == 0 {
            return ComplexityAnalysis {
                level: ComplexityLevel::Simple,
                confidence: (self.simple_base + simple_matches.len() as f64 * self.simple_weight)
                    .min(0.95),
                indicators,
                recommendation: OrchestrationMode::SingleStage,
            };
        }

        if complex_count > 0 {
            return ComplexityAnalysis {
                level: ComplexityLevel::Complex,
                confidence: (self.complex_base + complex_count as f64 * self.complex_weight)
                    .min(0.95),
                indicators,
                recommendation: OrchestrationMode::MultiStage,
            };
        }

        ComplexityAnalysis {
            level: ComplexityLevel::Moderate,
            confidence: 0.6,
            indicators: if indicators.is_empty() {
                vec!["no_strong_indicators".to_string()]
            } else {
                indicators
            },
            recommendation: OrchestrationMode::SingleStageMonitored,
        }
    }
}

#[cfg(test)]
#[path = "complexity_tests.rs"]
mod tests;
