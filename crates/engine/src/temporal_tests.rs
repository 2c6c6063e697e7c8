// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::quota::{QuotaLimits, TierLimit};
use chrono::TimeZone;
use relay_core::FakeClock;
use tempfile::TempDir;
use yare::parameterized;

fn clock_at(hour: u32) -> Arc<FakeClock> {
    Arc::new(FakeClock::new(
        chrono::Utc.with_ymd_and_hms(2026, 7, 1, hour, 0, 0).unwrap(),
    ))
}

fn active_hours() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    )
}

fn tracker(dir: &TempDir, clock: Arc<FakeClock>) -> QuotaTracker {
    QuotaTracker::new(
        dir.path().join("quota.json"),
        LockOptions::default(),
        clock,
    )
}

fn scheduler<'a>(
    dir: &TempDir,
    tracker: &'a QuotaTracker,
    clock: Arc<FakeClock>,
) -> TemporalScheduler<'a> {
    TemporalScheduler::open(
        dir.path().join("temporal-work-queue.json"),
        tracker,
        LockOptions::default(),
        clock,
        active_hours(),
    )
    .unwrap()
}

fn async_item(id: &str, priority: u8) -> TimedWorkItem {
    let mut item = TimedWorkItem::new(
        id,
        format!("index the {id} archive"),
        WorkTiming::Async,
        chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
    );
    item.priority = priority;
    item.estimated_quota = 10;
    item.estimated_duration_minutes = 30;
    item
}

// ── classify_timing ──────────────────────────────────────────────────────────

#[parameterized(
    help_me = { "help me choose an approach" },
    review = { "review this diff with me" },
    show_me = { "show me the failing assertions" },
    preference = { "what is your preference for naming" },
    destructive = { "delete the staging rows" },
)]
fn sync_signals(request: &str) {
    assert_eq!(
        classify_timing(request, &TimingContext::default()),
        WorkTiming::Sync
    );
}

#[parameterized(
    search = { "search for papers on mitochondria" },
    report = { "generate report on weekly errors" },
    overnight = { "overnight rebuild of the embeddings" },
    away = { "run the sweep when I'm away" },
    lint = { "lint the whole workspace" },
    format_all = { "format all source files" },
    read_only = { "count the TODO markers" },
)]
fn async_signals(request: &str) {
    assert_eq!(
        classify_timing(request, &TimingContext::default()),
        WorkTiming::Async
    );
}

#[test]
fn unclassified_is_either() {
    assert_eq!(
        classify_timing("process the data", &TimingContext::default()),
        WorkTiming::Either
    );
}

#[test]
fn context_flags_decide_the_unclassified() {
    let approval = TimingContext {
        requires_approval: true,
        batch_mode: false,
    };
    assert_eq!(
        classify_timing("process the data", &approval),
        WorkTiming::Sync
    );

    let batch = TimingContext {
        requires_approval: false,
        batch_mode: true,
    };
    assert_eq!(
        classify_timing("process the data", &batch),
        WorkTiming::Async
    );
}

#[test]
fn keywords_win_over_context_flags() {
    let batch = TimingContext {
        requires_approval: false,
        batch_mode: true,
    };
    assert_eq!(
        classify_timing("help me choose an approach", &batch),
        WorkTiming::Sync
    );
}

// ── estimate_tier ────────────────────────────────────────────────────────────

#[parameterized(
    proof = { "formalize the proof of lemma 2", Tier::Strong },
    analysis = { "analyze citation trends", Tier::Mid },
    mechanical = { "reformat the bibliography", Tier::Cheap },
)]
fn tier_estimation(description: &str, expected: Tier) {
    let item = TimedWorkItem::new(
        "t",
        description,
        WorkTiming::Async,
        chrono::Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
    );
    assert_eq!(estimate_tier(&item), expected);
}

// ── queue routing ────────────────────────────────────────────────────────────

#[test]
fn timing_routes_to_matching_queue() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(12);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    let mut sync_item = async_item("s", 5);
    sync_item.timing = WorkTiming::Sync;
    scheduler.add_work(sync_item).unwrap();
    scheduler.add_work(async_item("a", 5)).unwrap();

    let summary = scheduler.status_summary().unwrap();
    assert_eq!(summary.sync_queue, 1);
    assert_eq!(summary.async_queue, 1);
}

#[test]
fn either_follows_time_of_day() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(12);
    let day_tracker = tracker(&dir, clock.clone());
    {
        let mut scheduler = scheduler(&dir, &day_tracker, clock.clone());
        let mut item = async_item("day", 5);
        item.timing = WorkTiming::Either;
        scheduler.add_work(item).unwrap();
        assert_eq!(scheduler.status_summary().unwrap().sync_queue, 1);
    }

    // 23:00 local is outside active hours
    let night = clock_at(23);
    let night_tracker = tracker(&dir, night.clone());
    let mut scheduler = scheduler(&dir, &night_tracker, night);
    let mut item = async_item("night", 5);
    item.timing = WorkTiming::Either;
    scheduler.add_work(item).unwrap();
    assert_eq!(scheduler.status_summary().unwrap().async_queue, 1);
}

#[test]
fn next_sync_work_pops_highest_priority() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(12);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    for (id, priority) in [("low", 2), ("high", 9), ("mid", 5)] {
        let mut item = async_item(id, priority);
        item.timing = WorkTiming::Sync;
        scheduler.add_work(item).unwrap();
    }

    assert_eq!(scheduler.next_sync_work().unwrap().unwrap().id, "high");
    assert_eq!(scheduler.next_sync_work().unwrap().unwrap().id, "mid");
}

// ── overnight scheduling ─────────────────────────────────────────────────────

#[test]
fn schedules_work_that_fits_budgets() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    scheduler.add_work(async_item("a", 8)).unwrap();
    scheduler.add_work(async_item("b", 6)).unwrap();

    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert_eq!(scheduled.len(), 2);
    assert_eq!(scheduled[0].id, "a", "priority order");
    assert!(scheduled
        .iter()
        .all(|w| w.status == TimedStatus::Scheduled && w.scheduled_for.is_some()));
}

#[test]
fn rescheduling_without_completions_reselects_same_set() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    scheduler.add_work(async_item("a", 8)).unwrap();
    scheduler.add_work(async_item("b", 6)).unwrap();

    let first: Vec<String> = scheduler
        .schedule_overnight_work()
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    let second: Vec<String> = scheduler
        .schedule_overnight_work()
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn quota_budget_excludes_expensive_work() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let limits = QuotaLimits {
        strong: TierLimit {
            limit: Some(20),
            buffer: 0.0,
        },
        ..QuotaLimits::default()
    };
    let tracker = QuotaTracker::new(
        dir.path().join("quota.json"),
        LockOptions::default(),
        clock.clone(),
    )
    .with_limits(limits);
    let mut scheduler = scheduler(&dir, &tracker, clock);

    let mut proof = async_item("proof", 9);
    proof.description = "formalize the proof".to_string();
    proof.estimated_quota = 50; // beyond the strong budget of 20
    scheduler.add_work(proof).unwrap();
    scheduler.add_work(async_item("cheap-work", 3)).unwrap();

    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, "cheap-work");
    assert_eq!(scheduler.status_summary().unwrap().async_queue, 1);
}

#[test]
fn time_budget_excludes_long_work() {
    let dir = TempDir::new().unwrap();
    // 23:00 → one hour until reset
    let clock = clock_at(23);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    let mut long = async_item("long", 9);
    long.estimated_duration_minutes = 120;
    scheduler.add_work(long).unwrap();
    let mut short = async_item("short", 3);
    short.estimated_duration_minutes = 30;
    scheduler.add_work(short).unwrap();

    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, "short");
}

#[test]
fn unmet_dependencies_stay_queued() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    let mut dependent = async_item("dependent", 9);
    dependent.dependencies = vec!["base".to_string()];
    scheduler.add_work(dependent).unwrap();

    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert!(scheduled.is_empty());
    assert_eq!(scheduler.status_summary().unwrap().async_queue, 1);
}

#[test]
fn completed_dependency_unblocks_selection() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    scheduler.add_work(async_item("base", 5)).unwrap();
    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert_eq!(scheduled[0].id, "base");
    scheduler.mark_completed("base", Some("done".to_string())).unwrap();

    let mut dependent = async_item("dependent", 9);
    dependent.dependencies = vec!["base".to_string()];
    scheduler.add_work(dependent).unwrap();

    let scheduled = scheduler.schedule_overnight_work().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, "dependent");
}

// ── completion bookkeeping ───────────────────────────────────────────────────

#[test]
fn mark_completed_moves_item() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    scheduler.add_work(async_item("w", 5)).unwrap();
    scheduler.schedule_overnight_work().unwrap();

    assert!(scheduler.mark_completed("w", Some("found 15 papers".into())).unwrap());
    let summary = scheduler.status_summary().unwrap();
    assert_eq!(summary.scheduled, 0);
    assert_eq!(summary.completed_overnight, 1);

    assert!(!scheduler.mark_completed("w", None).unwrap(), "already moved");
}

#[test]
fn mark_failed_moves_item() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    scheduler.add_work(async_item("w", 5)).unwrap();
    scheduler.schedule_overnight_work().unwrap();

    assert!(scheduler.mark_failed("w", "agent timeout").unwrap());
    let summary = scheduler.status_summary().unwrap();
    assert_eq!(summary.failed, 1);
}

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    {
        let mut scheduler = scheduler(&dir, &tracker, clock.clone());
        scheduler.add_work(async_item("w", 5)).unwrap();
        scheduler.schedule_overnight_work().unwrap();
        scheduler.mark_completed("w", Some("ok".into())).unwrap();
    }

    let scheduler = scheduler(&dir, &tracker, clock);
    assert_eq!(scheduler.status_summary().unwrap().completed_overnight, 1);
}

#[test]
fn forecast_projects_scheduled_usage() {
    let dir = TempDir::new().unwrap();
    let clock = clock_at(22);
    let tracker = tracker(&dir, clock.clone());
    let mut scheduler = scheduler(&dir, &tracker, clock);

    let mut item = async_item("analysis", 5);
    item.description = "analyze the archive".to_string();
    item.estimated_quota = 225; // 20% of the default mid limit
    scheduler.add_work(item).unwrap();
    scheduler.schedule_overnight_work().unwrap();

    let forecast = scheduler.quota_forecast().unwrap();
    assert_eq!(forecast[&Tier::Mid], 20.0);
    assert_eq!(forecast[&Tier::Cheap], 0.0);
}
