// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers.
//!
//! Every external process the control plane launches runs under an
//! explicit deadline; timeouts surface as errors, never as hangs.

use std::process::Output;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Default timeout for syntax checker invocations.
pub const CHECKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for test commands run by validators.
pub const TEST_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for LLM-backed agent matching.
pub const MATCHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a single agent execution.
pub const AGENT_TIMEOUT: Duration = Duration::from_secs(3_600);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Blocking variant for synchronous callers (validators, matchers).
///
/// Spawns the child and polls `try_wait` until completion or the deadline,
/// then kills it. Piped output is drained on background threads so a
/// chatty child cannot wedge itself against a full pipe.
pub fn run_blocking_with_deadline(
    mut cmd: std::process::Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    use std::io::Read;

    cmd.stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| format!("{} failed: {}", description, e))?;

    let drain = |pipe: Option<Box<dyn Read + Send>>| {
        std::thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Some(mut pipe) = pipe {
                let _ = pipe.read_to_end(&mut buffer);
            }
            buffer
        })
    };
    let stdout_reader = drain(
        child
            .stdout
            .take()
            .map(|p| Box::new(p) as Box<dyn Read + Send>),
    );
    let stderr_reader = drain(
        child
            .stderr
            .take()
            .map(|p| Box::new(p) as Box<dyn Read + Send>),
    );

    let deadline = Instant::now() + timeout;
    let poll = Duration::from_millis(50);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(format!(
                        "{} timed out after {}s",
                        description,
                        timeout.as_secs()
                    ));
                }
                std::thread::sleep(poll);
            }
            Err(e) => return Err(format!("{} failed: {}", description, e)),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
