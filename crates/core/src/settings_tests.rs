// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn paths_hang_off_one_root() {
    let settings = Settings::with_state_root("/tmp/relay-test");
    assert_eq!(
        settings.quota_file(),
        PathBuf::from("/tmp/relay-test/state/quota-tracking.json")
    );
    assert_eq!(
        settings.temporal_queue_file(),
        PathBuf::from("/tmp/relay-test/state/temporal-work-queue.json")
    );
    assert_eq!(
        settings.metrics_dir(),
        PathBuf::from("/tmp/relay-test/metrics")
    );
    assert_eq!(
        settings.memory_dir(),
        PathBuf::from("/tmp/relay-test/memory")
    );
    assert_eq!(
        settings.overnight_results_dir(),
        PathBuf::from("/tmp/relay-test/state/overnight-results")
    );
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::with_state_root("/tmp/x");
    assert_eq!(settings.lock_timeout, Duration::from_secs(30));
    assert_eq!(settings.lock_poll_interval, Duration::from_millis(100));
    assert_eq!(settings.wip_limit, 3);
    assert_eq!(settings.overnight_max_concurrent, 3);
    assert_eq!(settings.metrics_retention_days, 90);
    assert_eq!(settings.session_ttl_days, 30);
    assert_eq!(
        settings.active_hours_start,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );
    assert_eq!(
        settings.active_hours_end,
        NaiveTime::from_hms_opt(22, 0, 0).unwrap()
    );
}
