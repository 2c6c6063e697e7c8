// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

const WRITER_AGENT: &str = "---\n\
name: cheap-general\n\
description: Mechanical fixes with explicit targets\n\
model: cheap\n\
tools:\n\
  - Read\n\
  - Edit\n\
permissionMode: acceptEdits\n\
---\n\
\n\
You fix typos.\n";

const READER_AGENT: &str = "---\n\
name: searcher\n\
description: Read-only search\n\
model: mid\n\
tools:\n\
  - Read\n\
  - Grep\n\
---\n\
Body.\n";

#[test]
fn parses_front_matter() {
    let def = AgentDefinition::parse(WRITER_AGENT, "test").unwrap();
    assert_eq!(def.name, "cheap-general");
    assert_eq!(def.model, Tier::Cheap);
    assert_eq!(def.permission_mode.as_deref(), Some("acceptEdits"));
    assert_eq!(def.tools, vec!["Read", "Edit"]);
}

#[test]
fn missing_front_matter_errors() {
    let err = AgentDefinition::parse("just a body", "test").unwrap_err();
    assert!(matches!(err, DefinitionError::MissingFrontMatter(_)));
}

#[test]
fn write_agent_without_accept_edits_fails_check() {
    let mut def = AgentDefinition::parse(WRITER_AGENT, "test").unwrap();
    def.permission_mode = None;
    assert!(def.check().is_err());
}

#[test]
fn read_only_agent_with_accept_edits_fails_check() {
    let mut def = AgentDefinition::parse(READER_AGENT, "test").unwrap();
    def.permission_mode = Some("acceptEdits".to_string());
    assert!(def.check().is_err());
}

#[test]
fn valid_agents_pass_check() {
    assert!(AgentDefinition::parse(WRITER_AGENT, "t").unwrap().check().is_ok());
    assert!(AgentDefinition::parse(READER_AGENT, "t").unwrap().check().is_ok());
}

#[test]
fn tier_from_definition_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cheap-general.md"), WRITER_AGENT).unwrap();

    assert_eq!(
        tier_for_agent("cheap-general", Some(dir.path())),
        Tier::Cheap
    );
}

#[test]
fn tier_falls_back_to_name_substring() {
    assert_eq!(tier_for_agent("cheap-formatter", None), Tier::Cheap);
    assert_eq!(tier_for_agent("strong-prover", None), Tier::Strong);
    assert_eq!(tier_for_agent("reviewer", None), Tier::Mid);
}

#[test]
fn malformed_definition_falls_back() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.md"), "---\nmodel: [unclosed\n---\n").unwrap();
    assert_eq!(tier_for_agent("broken", Some(dir.path())), Tier::Mid);
}
