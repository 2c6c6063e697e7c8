// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent definition files.
//!
//! Each agent is a markdown document whose YAML front-matter declares at
//! least `name`, `description`, and `model`. The control plane consumes
//! `model` (agent → tier) and `name`; everything else belongs to the host.

use relay_core::Tier;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Parsed agent front-matter.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub model: Tier,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(rename = "permissionMode", default)]
    pub permission_mode: Option<String>,
}

/// Errors from definition loading.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing front-matter in {0}")]
    MissingFrontMatter(String),
    #[error("invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Tools that mutate the filesystem and therefore require
/// `permissionMode: acceptEdits`.
const WRITE_TOOLS: [&str; 4] = ["Edit", "Write", "MultiEdit", "NotebookEdit"];

impl AgentDefinition {
    /// Parse the YAML front-matter of an agent markdown file.
    pub fn parse(content: &str, source: &str) -> Result<Self, DefinitionError> {
        let Some(rest) = content.strip_prefix("---") else {
            return Err(DefinitionError::MissingFrontMatter(source.to_string()));
        };
        let Some(end) = rest.find("\n---") else {
            return Err(DefinitionError::MissingFrontMatter(source.to_string()));
        };
        Ok(serde_yaml::from_str(&rest[..end])?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    fn has_write_tools(&self) -> bool {
        self.tools.iter().any(|t| WRITE_TOOLS.contains(&t.as_str()))
    }

    /// Check the write-capability contract: agents with write tools must
    /// declare `permissionMode: acceptEdits`, read-only agents must not.
    pub fn check(&self) -> Result<(), String> {
        let accepts_edits = self.permission_mode.as_deref() == Some("acceptEdits");
        if self.has_write_tools() && !accepts_edits {
            return Err(format!(
                "agent {} has write tools but no permissionMode: acceptEdits",
                self.name
            ));
        }
        if !self.has_write_tools() && accepts_edits {
            return Err(format!(
                "read-only agent {} must not declare permissionMode: acceptEdits",
                self.name
            ));
        }
        Ok(())
    }
}

/// Resolve an agent name to its tier.
///
/// Reads `<agents_dir>/<name>.md` front-matter; a missing or malformed
/// file falls back to name-substring matching, and then to mid.
pub fn tier_for_agent(name: &str, agents_dir: Option<&Path>) -> Tier {
    if let Some(dir) = agents_dir {
        let path = dir.join(format!("{name}.md"));
        if path.exists() {
            match AgentDefinition::load(&path) {
                Ok(def) => return def.model,
                Err(e) => {
                    warn!(agent = name, error = %e, "unreadable agent definition");
                }
            }
        }
    }

    let lower = name.to_lowercase();
    if lower.contains("cheap") {
        Tier::Cheap
    } else if lower.contains("strong") {
        Tier::Strong
    } else {
        Tier::Mid
    }
}

#[cfg(test)]
#[path = "defs_tests.rs"]
mod tests;
