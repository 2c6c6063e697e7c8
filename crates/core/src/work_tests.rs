// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_item_is_queued_with_defaults() {
    let item = WorkItem::new("w1", "Fix imports", 8);
    assert_eq!(item.status, WorkStatus::Queued);
    assert_eq!(item.estimated_complexity, 3);
    assert!(item.dependencies.is_empty());
    assert!(item.started_at.is_none());
    assert!(item.completed_at.is_none());
}

#[test]
fn builder_normalizes_aliases() {
    let item = WorkItem::builder()
        .task_id("factory_test")
        .task_name("Factory created")
        .priority(7)
        .agent_assigned("mid-general")
        .build();

    assert_eq!(item.id, "factory_test");
    assert_eq!(item.description, "Factory created");
    assert_eq!(item.priority, 7);
    assert_eq!(item.agent.as_deref(), Some("mid-general"));
}

#[test]
fn builder_defaults_priority_to_five() {
    let item = WorkItem::builder().id("w").description("d").build();
    assert_eq!(item.priority, 5);
    assert_eq!(item.estimated_complexity, 3);
}

#[test]
fn serialization_uses_canonical_names() {
    let mut item = WorkItem::new("w1", "Task", 5);
    item.agent = Some("cheap-general".to_string());
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["id"], "w1");
    assert_eq!(json["description"], "Task");
    assert_eq!(json["agent"], "cheap-general");
    assert_eq!(json["status"], "queued");
    assert!(json.get("task_id").is_none());
    assert!(json.get("agent_assigned").is_none());
}

#[test]
fn round_trip_is_identity() {
    let mut item = WorkItem::new("w2", "Task with deps", 9);
    item.dependencies = vec!["w1".to_string()];
    item.status = WorkStatus::Completed;
    item.started_at = Some("2026-07-01T08:00:00Z".parse().unwrap());
    item.completed_at = Some("2026-07-01T09:30:00Z".parse().unwrap());

    let json = serde_json::to_string(&item).unwrap();
    let back: WorkItem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, item);
}

#[test]
fn terminal_statuses() {
    assert!(WorkStatus::Completed.is_terminal());
    assert!(WorkStatus::Failed.is_terminal());
    assert!(!WorkStatus::Active.is_terminal());
    assert!(!WorkStatus::Queued.is_terminal());
}
