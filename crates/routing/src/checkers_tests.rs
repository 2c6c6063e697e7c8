// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn valid_json_passes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "good.json", r#"{"ok": true}"#);
    assert!(CheckerRegistry::default().check(&path).is_pass());
}

#[test]
fn invalid_json_fails_with_line() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.json", "{\"ok\": \n");
    let validation = CheckerRegistry::default().check(&path);
    let reason = validation.failure_reason().unwrap();
    assert!(reason.contains("JSON syntax error"), "{reason}");
}

#[test]
fn balanced_latex_passes() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "doc.tex",
        "\\begin{document}\\section{Intro}\\end{document}",
    );
    assert!(CheckerRegistry::default().check(&path).is_pass());
}

#[test]
fn unbalanced_braces_fail() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.tex", "\\section{Intro");
    let result = CheckerRegistry::default().check(&path);
    let reason = result.failure_reason().unwrap();
    assert!(reason.contains("Brace mismatch"), "{reason}");
}

#[test]
fn unbalanced_environments_fail() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.tex", "\\begin{proof}{}");
    let result = CheckerRegistry::default().check(&path);
    let reason = result.failure_reason().unwrap();
    assert!(reason.contains("Environment mismatch"), "{reason}");
}

#[test]
fn unknown_extension_passes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "notes.xyz", "anything at all");
    assert!(CheckerRegistry::default().check(&path).is_pass());
}

#[test]
fn no_extension_passes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "Makefile", "all:\n\techo hi\n");
    assert!(CheckerRegistry::default().check(&path).is_pass());
}

#[test]
fn missing_external_tool_passes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "script.zz", "whatever");
    let mut registry = CheckerRegistry::default();
    registry.register(
        "zz",
        Box::new(ExternalChecker::new("definitely-not-a-real-tool-xyz", &[])),
    );
    assert!(registry.check(&path).is_pass());
}
