// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request validation at the API boundary.

use thiserror::Error;

/// Maximum accepted request length in characters.
pub const MAX_REQUEST_LEN: usize = 10_000;

/// Rejections at the routing boundary. These are not logged as routing
/// events; the request never reaches the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("empty request")]
    Empty,
    #[error("request too long: {0} chars (max {MAX_REQUEST_LEN})")]
    TooLong(usize),
}

/// Validate a raw request string before routing.
///
/// Empty and whitespace-only requests are rejected, as are requests over
/// [`MAX_REQUEST_LEN`] characters.
pub fn validate_request(request: &str) -> Result<(), RequestError> {
    if request.trim().is_empty() {
        return Err(RequestError::Empty);
    }
    let len = request.chars().count();
    if len > MAX_REQUEST_LEN {
        return Err(RequestError::TooLong(len));
    }
    Ok(())
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
