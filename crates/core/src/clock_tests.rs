// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_reports_fixed_instant() {
    let start = Utc.with_ymd_and_hms(2026, 7, 1, 21, 30, 0).unwrap();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now_utc(), start);
    assert_eq!(clock.today(), start.date_naive());
}

#[test]
fn advance_moves_both_readings() {
    let start = Utc.with_ymd_and_hms(2026, 7, 1, 23, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    clock.advance(chrono::Duration::hours(2));

    assert_eq!(clock.now_utc(), start + chrono::Duration::hours(2));
    // Crossed midnight
    assert_eq!(
        clock.today(),
        start.date_naive() + chrono::Duration::days(1)
    );
}

#[test]
fn local_can_diverge_from_utc() {
    let utc = Utc.with_ymd_and_hms(2026, 7, 1, 2, 0, 0).unwrap();
    let local = utc.naive_utc() - chrono::Duration::hours(7);
    let clock = FakeClock::with_local(utc, local);

    assert_eq!(clock.now_utc(), utc);
    assert_eq!(clock.today(), local.date());
}

#[test]
fn system_clock_is_monotonic_enough() {
    let clock = SystemClock;
    let a = clock.now_utc();
    let b = clock.now_utc();
    assert!(b >= a);
}
