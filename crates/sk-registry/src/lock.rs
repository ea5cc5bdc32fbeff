//! Exclusive writer lock around registry read-modify-write cycles.
//!
//! The lock is a file created with `create_new` holding the owner's PID.
//! A lock whose PID is no longer running is treated as stale and removed.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::RegistryError;

const LOCK_RETRY_DELAY: Duration = Duration::from_millis(100);

pub struct WriteLockGuard {
    path: PathBuf,
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Block until the lock at `lock_path` is ours or `timeout` elapses.
pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<WriteLockGuard, RegistryError> {
    let started = Instant::now();

    loop {
        match try_acquire(lock_path) {
            Ok(guard) => return Ok(guard),
            Err(LockState::HeldBy(pid)) => {
                if started.elapsed() >= timeout {
                    return Err(RegistryError::Lock(format!(
                        "another registry write is running (pid {pid}); try again after it finishes"
                    )));
                }
                std::thread::sleep(LOCK_RETRY_DELAY);
            }
            Err(LockState::Stale) => {
                warn!(path = %lock_path.display(), "removing stale registry lock");
                let _ = std::fs::remove_file(lock_path);
            }
            Err(LockState::Unknown) => {
                if started.elapsed() >= timeout {
                    return Err(RegistryError::Lock(format!(
                        "could not acquire {}; remove it if no skl process is running",
                        lock_path.display()
                    )));
                }
                std::thread::sleep(LOCK_RETRY_DELAY);
            }
        }
    }
}

#[derive(Debug)]
enum LockState {
    HeldBy(i32),
    Stale,
    Unknown,
}

fn try_acquire(lock_path: &Path) -> Result<WriteLockGuard, LockState> {
    if let Some(parent) = lock_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            let pid = std::process::id();
            let _ = writeln!(file, "{pid}");
            Ok(WriteLockGuard {
                path: lock_path.to_path_buf(),
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            let mut pid_buf = String::new();
            if OpenOptions::new()
                .read(true)
                .open(lock_path)
                .and_then(|mut file| file.read_to_string(&mut pid_buf))
                .is_err()
            {
                return Err(LockState::Unknown);
            }

            match pid_buf.trim().parse::<i32>().ok() {
                Some(pid) if is_process_running(pid) => Err(LockState::HeldBy(pid)),
                Some(_) => Err(LockState::Stale),
                None => Err(LockState::Unknown),
            }
        }
        Err(_) => Err(LockState::Unknown),
    }
}

/// Signal 0 probes for existence; EPERM means alive under another user.
#[cfg(unix)]
fn is_process_running(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    pid > 0 && matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
}

#[cfg(not(unix))]
const fn is_process_running(_pid: i32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_and_releases_lock_file() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let lock_path = temp.path().join("index.json.lock");

        let guard = acquire(&lock_path, Duration::from_secs(1)).expect("lock should acquire");
        assert!(lock_path.is_file());
        drop(guard);
        assert!(!lock_path.exists());
    }

    #[test]
    fn held_lock_times_out() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let lock_path = temp.path().join("index.json.lock");

        let _guard = acquire(&lock_path, Duration::from_secs(1)).expect("lock should acquire");
        let err = acquire(&lock_path, Duration::from_millis(200))
            .err()
            .expect("second writer must wait");
        assert!(err.to_string().contains("another registry write"));
    }

    #[test]
    fn stale_lock_is_recovered() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let lock_path = temp.path().join("index.json.lock");
        // PIDs near i32::MAX are not in use on any realistic system.
        std::fs::write(&lock_path, "2147483000\n").unwrap();

        let guard = acquire(&lock_path, Duration::from_secs(1)).expect("stale lock is replaced");
        drop(guard);
        assert!(!lock_path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn liveness_probe_sees_own_process_only() {
        let own = i32::try_from(std::process::id()).expect("pid fits in i32");
        assert!(is_process_running(own));
        assert!(!is_process_running(2_147_483_000));
        assert!(!is_process_running(0));
    }
}
