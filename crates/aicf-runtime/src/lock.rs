//! Exclusive cycle lock.
//!
//! One lock file per project, `.aicf/.watcher.lock`, holding the owner's
//! PID. Concurrent cycles on the same project are forbidden; an invocation
//! that cannot take the lock within one second reports busy and the caller
//! exits silently. A lock whose PID is no longer alive is stale and
//! reclaimed, so one crash never disables the watcher permanently.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(1);
const RETRY_DELAY: Duration = Duration::from_millis(100);

pub struct CycleLock {
    path: PathBuf,
}

impl CycleLock {
    /// Take the lock, retrying within [`ACQUIRE_TIMEOUT`].
    pub fn acquire(path: &Path) -> Result<Self> {
        let deadline = Instant::now() + ACQUIRE_TIMEOUT;

        loop {
            match try_create(path) {
                Ok(()) => {
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    if holder_is_dead(path) {
                        let _ = std::fs::remove_file(path);
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(Error::LockBusy);
                    }
                    std::thread::sleep(RETRY_DELAY);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn try_create(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);

    use std::io::Write;
    let mut file = options.open(path)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(())
}

/// A lock is stale when its recorded PID no longer exists.
fn holder_is_dead(path: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(pid) = text.trim().parse::<u32>() else {
        // Unreadable owner: do not reclaim, the writer may be mid-write.
        return false;
    };

    if pid == std::process::id() {
        return false;
    }

    pid_is_dead(pid)
}

#[cfg(unix)]
fn pid_is_dead(pid: u32) -> bool {
    // kill(pid, 0) probes existence without signaling; ESRCH means gone.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    rc != 0 && std::io::Error::last_os_error().raw_os_error() == Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn pid_is_dead(_pid: u32) -> bool {
    false
}
