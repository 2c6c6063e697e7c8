// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-domain configuration.
//!
//! Domains describe workflows, default agents, risk patterns, and quota
//! allocation as YAML. Malformed config logs a warning and falls back to
//! defaults; it never prevents startup.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Workflow parallelism classes, mapped to WIP limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parallelism {
    Sequential,
    Low,
    #[default]
    Medium,
    High,
}

impl Parallelism {
    /// WIP limit this parallelism class allows.
    pub fn wip_limit(self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Low => 2,
            Parallelism::Medium => 3,
            Parallelism::High => 4,
        }
    }
}

/// One named workflow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub quality_gates: Vec<String>,
    #[serde(default)]
    pub parallelism: Parallelism,
}

/// Risk pattern groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskPatterns {
    #[serde(default)]
    pub high_risk: Vec<String>,
    #[serde(default)]
    pub medium_risk: Vec<String>,
}

/// Per-domain configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub workflows: HashMap<String, WorkflowConfig>,
    #[serde(default)]
    pub default_agents: Vec<String>,
    #[serde(default)]
    pub context_strategy: Option<String>,
    #[serde(default)]
    pub thresholds: HashMap<String, f64>,
    #[serde(default)]
    pub quality_requirements: HashMap<String, String>,
    #[serde(default)]
    pub file_patterns: Vec<String>,
    #[serde(default)]
    pub risk_patterns: RiskPatterns,
    #[serde(default)]
    pub quota_allocation: HashMap<String, u64>,
    #[serde(default)]
    pub specialized_agents: Vec<String>,
}

impl DomainConfig {
    /// Parse a domain document from YAML.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from a file; missing or malformed config yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "domain config unreadable, using defaults");
                return Self::default();
            }
        };
        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "domain config malformed, using defaults");
                Self::default()
            }
        }
    }

    /// WIP limit for a workflow, or the default when unknown.
    pub fn wip_limit_for(&self, workflow: &str) -> usize {
        self.workflows
            .get(workflow)
            .map(|w| w.parallelism.wip_limit())
            .unwrap_or(Parallelism::default().wip_limit())
    }
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
