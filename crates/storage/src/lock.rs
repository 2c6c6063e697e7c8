// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive/shared file locking with stale-lock recovery.
//!
//! Writers take an exclusive OS lock on the state file and record their
//! identity in a `<path>.lock` sidecar so a blocked acquirer can tell a
//! live holder from a dead one. A dead holder's sidecar is removed and
//! acquisition retried once; a live holder surfaces as [`LockError::Busy`]
//! naming the holding PID.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from lock acquisition.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("could not acquire lock on {path} within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },
    #[error("{path} locked by active process {pid} (since {since})")]
    Busy {
        path: PathBuf,
        pid: u32,
        since: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Options for lock acquisition.
#[derive(Debug, Clone)]
pub struct LockOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Create the file (containing `{}`) and parent directories if missing
    pub create_if_missing: bool,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            create_if_missing: false,
        }
    }
}

impl LockOptions {
    pub fn create_if_missing(mut self) -> Self {
        self.create_if_missing = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sidecar record identifying the lock holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub acquired_at: String,
    pub file_path: String,
}

/// A held file lock. Released (and the holder sidecar removed) on drop,
/// including on panic and early-return paths.
#[derive(Debug)]
pub struct LockedFile {
    file: File,
    path: PathBuf,
    exclusive: bool,
}

impl LockedFile {
    /// Acquire an exclusive lock for a read-modify-write cycle.
    pub fn exclusive(path: &Path, options: &LockOptions) -> Result<Self, LockError> {
        Self::acquire(path, options, true)
    }

    /// Acquire a shared lock for reading. Multiple readers may coexist;
    /// no holder sidecar is written.
    pub fn shared(path: &Path, options: &LockOptions) -> Result<Self, LockError> {
        Self::acquire(path, options, false)
    }

    fn acquire(path: &Path, options: &LockOptions, exclusive: bool) -> Result<Self, LockError> {
        if options.create_if_missing && !path.exists() {
            create_secure(path)?;
        }

        let deadline = Instant::now() + options.timeout;
        loop {
            // Re-open every attempt: an atomic rename commit replaces the
            // inode, and a lock on the old inode guards nothing.
            let file = open_for_lock(path, exclusive)?;
            if try_lock(&file, exclusive).is_ok() {
                // The previous holder may have renamed a new document over
                // the path between our open and lock. Locking a replaced
                // inode guards stale data, so verify and retry.
                if is_current_inode(&file, path) {
                    if exclusive {
                        write_holder(path);
                    }
                    return Ok(Self {
                        file,
                        path: path.to_owned(),
                        exclusive,
                    });
                }
                let _ = FileExt::unlock(&file);
            }

            if Instant::now() >= deadline {
                return Self::recover_or_fail(path, options, exclusive);
            }
            std::thread::sleep(options.poll_interval);
        }
    }

    /// On timeout, decide between stale recovery, Busy, and Timeout.
    ///
    /// A dead or unreadable holder is treated as stale: the sidecar is
    /// removed and one immediate retry attempted.
    fn recover_or_fail(
        path: &Path,
        options: &LockOptions,
        exclusive: bool,
    ) -> Result<Self, LockError> {
        let holder_path = holder_path(path);
        if let Some(holder) = read_holder(&holder_path) {
            if pid_alive(holder.pid) {
                return Err(LockError::Busy {
                    path: path.to_owned(),
                    pid: holder.pid,
                    since: holder.acquired_at,
                });
            }
            warn!(
                path = %path.display(),
                pid = holder.pid,
                "removing stale lock held by dead process",
            );
        }
        let _ = std::fs::remove_file(&holder_path);

        // One retry after stale recovery
        let file = open_for_lock(path, exclusive)?;
        if try_lock(&file, exclusive).is_ok() && is_current_inode(&file, path) {
            if exclusive {
                write_holder(path);
            }
            debug!(path = %path.display(), "lock acquired after stale recovery");
            return Ok(Self {
                file,
                path: path.to_owned(),
                exclusive,
            });
        }

        Err(LockError::Timeout {
            path: path.to_owned(),
            timeout: options.timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release file lock");
        }
        if self.exclusive {
            remove_holder(&self.path);
        }
    }
}

fn open_for_lock(path: &Path, exclusive: bool) -> Result<File, LockError> {
    let mut opts = OpenOptions::new();
    opts.read(true);
    if exclusive {
        opts.write(true);
    }
    Ok(opts.open(path)?)
}

// UFCS keeps these resolving to fs2 even on toolchains where std has
// inherent file-locking methods of the same names.
fn try_lock(file: &File, exclusive: bool) -> io::Result<()> {
    if exclusive {
        FileExt::try_lock_exclusive(file)
    } else {
        FileExt::try_lock_shared(file)
    }
}

/// Check that `file`'s inode is still the one living at `path`.
#[cfg(unix)]
fn is_current_inode(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.ino() == current.ino() && held.dev() == current.dev(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_current_inode(_file: &File, _path: &Path) -> bool {
    true
}

fn holder_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".lock");
    PathBuf::from(s)
}

/// Record the holder PID. Failure is non-fatal; the sidecar exists for
/// diagnosis and stale detection, not correctness.
fn write_holder(path: &Path) {
    let holder = LockHolder {
        pid: std::process::id(),
        acquired_at: now_iso(),
        file_path: path.display().to_string(),
    };
    if let Ok(json) = serde_json::to_vec(&holder) {
        if let Err(e) = std::fs::write(holder_path(path), json) {
            debug!(path = %path.display(), error = %e, "could not write lock holder file");
        }
    }
}

fn remove_holder(path: &Path) {
    let _ = std::fs::remove_file(holder_path(path));
}

/// Read the holder sidecar; `None` means missing or malformed (both stale).
fn read_holder(holder_path: &Path) -> Option<LockHolder> {
    let bytes = std::fs::read(holder_path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Check whether a process is still alive.
#[cfg(target_os = "linux")]
pub(crate) fn pid_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn pid_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Create a state file (containing `{}`) mode 0600, parents mode 0700.
fn create_secure(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
        set_mode(parent, 0o700);
    }
    std::fs::write(path, b"{}")?;
    set_mode(path, 0o600);
    Ok(())
}

#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "could not set permissions");
    }
}

#[cfg(not(unix))]
pub(crate) fn set_mode(_path: &Path, _mode: u32) {}

/// Generate an ISO-8601 timestamp string (UTC).
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
