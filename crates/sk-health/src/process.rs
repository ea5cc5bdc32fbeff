//! Timeout-bounded subprocess execution.
//!
//! Every external command the toolchain runs (syntax check, import probe,
//! standalone run) goes through [`ScopedProcess`]. stdout and stderr are
//! drained on reader threads so a chatty child cannot block on a full pipe
//! while we poll for exit. The child runs in its own process group; once it
//! exits or the timeout elapses, the group is killed so background
//! descendants cannot hold the pipes open past the deadline.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ProcessError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time allowed for the pipes to close after the group has been killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Longest diagnostic carried into an issue string.
const MAX_DIAGNOSTIC_CHARS: usize = 2_000;

/// A command with a mandatory timeout.
#[derive(Debug, Clone)]
pub struct ScopedProcess {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

/// Result of a process that was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was killed or terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The child, or a descendant holding its output open, outlived the
    /// timeout.
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Human-readable reason for a failure: the timeout, or the captured
    /// stderr (stdout when stderr is empty), trimmed.
    #[must_use]
    pub fn diagnostic(&self, timeout: Duration) -> String {
        if self.timed_out {
            return format!("timed out after {}s", timeout.as_secs());
        }
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let code = self
            .exit_code
            .map_or_else(|| "signal".to_string(), |code| code.to_string());
        if text.is_empty() {
            return format!("exit status {code}");
        }
        truncate(text, MAX_DIAGNOSTIC_CHARS)
    }
}

impl ScopedProcess {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run to completion or until the timeout elapses.
    ///
    /// The bound covers the whole process group: output still held open by
    /// a background descendant at the deadline counts as a timeout.
    pub fn run(&self) -> Result<ProcessOutcome, ProcessError> {
        let started = Instant::now();
        let deadline = started + self.timeout;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let mut timed_out = false;
        let status = loop {
            if let Some(status) = child.try_wait().map_err(|source| self.wait_error(source))? {
                break status;
            }
            if Instant::now() >= deadline {
                timed_out = true;
                kill_group(&mut child);
                break child.wait().map_err(|source| self.wait_error(source))?;
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !timed_out {
            kill_group(&mut child);
        }
        let drain_until = deadline.max(Instant::now() + DRAIN_GRACE);
        let stdout = collect(&stdout_rx, drain_until);
        let stderr = collect(&stderr_rx, drain_until);
        let pipes_closed = stdout.is_some() && stderr.is_some();
        if !pipes_closed {
            warn!(program = %self.program, "output still open at deadline");
            timed_out = true;
        }
        let elapsed = started.elapsed();

        let outcome = ProcessOutcome {
            exit_code: if timed_out { None } else { status.code() },
            stdout: String::from_utf8_lossy(&stdout.unwrap_or_default()).into_owned(),
            stderr: String::from_utf8_lossy(&stderr.unwrap_or_default()).into_owned(),
            timed_out,
            elapsed,
        };

        if timed_out {
            warn!(
                program = %self.program,
                timeout_secs = self.timeout.as_secs(),
                "process timed out"
            );
        } else {
            debug!(
                program = %self.program,
                exit_code = ?outcome.exit_code,
                elapsed_ms = elapsed.as_millis(),
                "process finished"
            );
        }
        Ok(outcome)
    }

    fn wait_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::Wait {
            program: self.program.clone(),
            source,
        }
    }
}

/// Read `pipe` to EOF on a detached thread. The bytes arrive on the
/// returned channel once the last writer closes the pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

fn collect(rx: &Receiver<Vec<u8>>, until: Instant) -> Option<Vec<u8>> {
    rx.recv_timeout(until.saturating_duration_since(Instant::now()))
        .ok()
}

/// SIGKILL the child's process group, then the child itself.
///
/// Descendants that left the group (`setsid`) are out of reach; their open
/// pipes surface as a timeout in [`ScopedProcess::run`].
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Ok(pgid) = i32::try_from(child.id()) {
            if let Err(errno) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                if errno != nix::errno::Errno::ESRCH {
                    debug!(pgid, %errno, "could not signal process group");
                }
            }
        }
    }
    let _ = child.kill();
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sh(script: &str, timeout: Duration) -> ProcessOutcome {
        ScopedProcess::new("sh", timeout)
            .args(["-c", script])
            .run()
            .expect("sh should start")
    }

    #[test]
    fn captures_exit_code_and_streams() {
        let outcome = sh("echo out; echo err >&2; exit 3", Duration::from_secs(5));
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
        assert!(!outcome.success());
        assert_eq!(outcome.diagnostic(Duration::from_secs(5)), "err");
    }

    #[test]
    fn zero_exit_is_success() {
        let outcome = sh("true", Duration::from_secs(5));
        assert!(outcome.success());
        assert!(!outcome.timed_out);
    }

    #[test]
    fn slow_process_is_killed_at_timeout() {
        let outcome = sh("sleep 10", Duration::from_millis(300));
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, None);
        assert!(outcome.elapsed < Duration::from_secs(5));
        assert_eq!(outcome.diagnostic(Duration::from_secs(1)), "timed out after 1s");
    }

    #[test]
    fn background_child_does_not_outlast_the_timeout() {
        let outcome = sh("sleep 8 & exit 0", Duration::from_secs(1));
        assert!(outcome.elapsed < Duration::from_secs(3));
        assert!(outcome.success());
    }

    #[test]
    fn background_child_output_before_exit_is_kept() {
        let outcome = sh("echo ready; sleep 8 & exit 0", Duration::from_secs(2));
        assert_eq!(outcome.stdout, "ready\n");
        assert!(outcome.elapsed < Duration::from_secs(4));
    }

    #[test]
    fn timeout_with_background_child_still_returns() {
        let outcome = sh("sleep 8 & sleep 8", Duration::from_millis(300));
        assert!(outcome.timed_out);
        assert!(outcome.elapsed < Duration::from_secs(3));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = ScopedProcess::new("definitely-not-a-real-binary-xyz", Duration::from_secs(1))
            .run()
            .expect_err("spawn should fail");
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }

    #[test]
    fn silent_failure_reports_exit_status() {
        let outcome = sh("exit 2", Duration::from_secs(5));
        assert_eq!(outcome.diagnostic(Duration::from_secs(5)), "exit status 2");
    }

    #[test]
    fn long_diagnostics_are_truncated() {
        let long = "x".repeat(MAX_DIAGNOSTIC_CHARS + 10);
        let truncated = truncate(&long, MAX_DIAGNOSTIC_CHARS);
        assert_eq!(truncated.len(), MAX_DIAGNOSTIC_CHARS + 3);
    }
}
