// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty = { "" },
    spaces = { "   " },
    mixed_whitespace = { "   \t\n " },
)]
fn rejects_blank_requests(request: &str) {
    assert_eq!(validate_request(request), Err(RequestError::Empty));
}

#[test]
fn rejects_oversized_request() {
    let request = "x".repeat(MAX_REQUEST_LEN + 1);
    assert_eq!(
        validate_request(&request),
        Err(RequestError::TooLong(MAX_REQUEST_LEN + 1))
    );
}

#[test]
fn accepts_request_at_limit() {
    let request = "x".repeat(MAX_REQUEST_LEN);
    assert!(validate_request(&request).is_ok());
}

#[test]
fn accepts_normal_request() {
    assert!(validate_request("Fix typo in README.md").is_ok());
}
