// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction.
//!
//! Quota day-resets and active-hours boundaries use local wall-clock time
//! while persisted timestamps use UTC, so both flow through one trait and
//! tests can pin them independently.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC (persisted timestamps).
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current local wall-clock time (day boundaries, active hours).
    fn now_local(&self) -> NaiveDateTime;

    /// Today's local calendar date.
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }

    /// Current local time-of-day.
    fn local_time(&self) -> NaiveTime {
        self.now_local().time()
    }
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Controllable clock for tests.
#[derive(Debug, Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

#[derive(Debug)]
struct FakeClockState {
    utc: DateTime<Utc>,
    local: NaiveDateTime,
}

impl FakeClock {
    /// Create a fake clock where local time equals UTC.
    pub fn new(utc: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                utc,
                local: utc.naive_utc(),
            })),
        }
    }

    /// Create a fake clock with distinct UTC and local readings.
    pub fn with_local(utc: DateTime<Utc>, local: NaiveDateTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState { utc, local })),
        }
    }

    /// Advance both readings by the same duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut state = self.inner.lock();
        state.utc += duration;
        state.local += duration;
    }

    /// Jump the local wall-clock without moving UTC (timezone shifts in tests).
    pub fn set_local(&self, local: NaiveDateTime) {
        self.inner.lock().local = local;
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().utc
    }

    fn now_local(&self) -> NaiveDateTime {
        self.inner.lock().local
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
