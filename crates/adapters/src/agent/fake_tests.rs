// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn unscripted_tier_returns_default_text() {
    let fake = FakeAgentExecutor::new();
    let result = fake.execute("do it", Tier::Cheap, None).await.unwrap();
    assert_eq!(result, Value::String("ok from cheap".to_string()));
}

#[tokio::test]
async fn scripted_responses_consumed_in_order_last_repeats() {
    let fake = FakeAgentExecutor::new();
    fake.enqueue_text(Tier::Mid, "first");
    fake.enqueue_text(Tier::Mid, "second");

    assert_eq!(
        fake.execute("r", Tier::Mid, None).await.unwrap(),
        Value::String("first".into())
    );
    assert_eq!(
        fake.execute("r", Tier::Mid, None).await.unwrap(),
        Value::String("second".into())
    );
    // Last response repeats
    assert_eq!(
        fake.execute("r", Tier::Mid, None).await.unwrap(),
        Value::String("second".into())
    );
}

#[tokio::test]
async fn records_calls_with_tier_order() {
    let fake = FakeAgentExecutor::new();
    fake.execute("a", Tier::Cheap, None).await.unwrap();
    fake.execute("b", Tier::Strong, None).await.unwrap();

    assert_eq!(fake.tiers_tried(), vec![Tier::Cheap, Tier::Strong]);
    let calls = fake.calls();
    assert_eq!(calls[0].request, "a");
    assert_eq!(calls[1].request, "b");
}

#[tokio::test]
async fn scripted_error_surfaces() {
    let fake = FakeAgentExecutor::new();
    fake.enqueue_error(Tier::Cheap, "boom");
    let err = fake.execute("r", Tier::Cheap, None).await.unwrap_err();
    assert!(err.to_string().contains("boom"));
}
