// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes.

/// Exit code policy shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Fatal,
    /// Some overnight items failed
    PartialSuccess,
    /// A subprocess (agent, checker) hit its timeout
    SubprocessTimeout,
    /// Interrupted by the user
    Interrupted,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => 0,
            ExitCode::Fatal => 1,
            ExitCode::PartialSuccess => 2,
            ExitCode::SubprocessTimeout => 124,
            ExitCode::Interrupted => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_policy() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Fatal), 1);
        assert_eq!(i32::from(ExitCode::PartialSuccess), 2);
        assert_eq!(i32::from(ExitCode::SubprocessTimeout), 124);
        assert_eq!(i32::from(ExitCode::Interrupted), 130);
    }
}
