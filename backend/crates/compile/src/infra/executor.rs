//! Process Executor
//!
//! Spawns one external program, captures both output streams into
//! fixed-capacity buffers and enforces a wall-clock deadline.
//!
//! ## Guarantees
//! - stdin is closed; the child cannot wait on input
//! - each stream is drained by its own task, so the child never blocks on
//!   a full pipe; bytes past the cap are read and thrown away
//! - on deadline expiry the child is killed and reaped, and whatever output
//!   was captured so far is returned with the error
//! - on Unix the child leads its own process group; the whole group is
//!   killed once the child exits, at the deadline, or when the executing
//!   future is dropped, so forked helpers never outlive the call

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::domain::entity::{CapturedOutput, ExecutionResult};

/// Per-stream capture capacity (1 MiB)
pub const DEFAULT_CAPTURE_LIMIT: usize = 1024 * 1024;

/// Wall-clock limit for one process
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// How long readers may keep draining after the child exits
///
/// A grandchild can inherit the pipe and hold it open indefinitely.
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(1);

const READ_CHUNK: usize = 8 * 1024;

/// Process execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Program missing or not executable
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Deadline passed; the child was killed
    #[error("Process exceeded the {limit:?} deadline")]
    Timeout {
        limit: Duration,
        partial: ExecutionResult,
    },

    /// Waiting on the child failed
    #[error("I/O error while supervising process: {0}")]
    Io(#[from] io::Error),
}

/// Runs external programs under a deadline with bounded capture
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    capture_limit: usize,
    deadline: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_LIMIT, DEFAULT_DEADLINE)
    }
}

impl ProcessExecutor {
    pub fn new(capture_limit: usize, deadline: Duration) -> Self {
        Self {
            capture_limit,
            deadline,
        }
    }

    pub fn capture_limit(&self) -> usize {
        self.capture_limit
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `program` with `args`, optionally inside `working_dir`
    ///
    /// A non-zero exit is a normal result with `succeeded == false`.
    pub async fn execute(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, ExecutionError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        command.process_group(0);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| {
            tracing::warn!(program, error = %source, "Spawn failed");
            ExecutionError::SpawnFailed {
                program: program.to_string(),
                source,
            }
        })?;

        tracing::debug!(program, pid = child.id(), "Process spawned");
        let mut group = ProcessGroup::new(child.id());

        let stdout = StreamCapture::start(child.stdout.take(), self.capture_limit);
        let stderr = StreamCapture::start(child.stderr.take(), self.capture_limit);

        let waited = tokio::time::timeout(self.deadline, child.wait()).await;
        match waited {
            Ok(status) => {
                let status = status?;
                let elapsed = started.elapsed();
                group.kill();
                let (stdout, stderr) = tokio::join!(stdout.finish(), stderr.finish());

                tracing::debug!(
                    program,
                    exit_code = status.code(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    stdout_truncated = stdout.truncated,
                    stderr_truncated = stderr.truncated,
                    "Process exited"
                );

                Ok(ExecutionResult {
                    succeeded: status.success(),
                    exit_code: status.code(),
                    stdout,
                    stderr,
                    elapsed,
                })
            }
            Err(_) => {
                group.kill();
                if let Err(e) = child.kill().await {
                    tracing::error!(program, error = %e, "Failed to kill timed-out process");
                }
                let elapsed = started.elapsed();
                let (stdout, stderr) = tokio::join!(stdout.finish(), stderr.finish());

                tracing::warn!(
                    program,
                    limit_ms = self.deadline.as_millis() as u64,
                    "Process killed at deadline"
                );

                Err(ExecutionError::Timeout {
                    limit: self.deadline,
                    partial: ExecutionResult {
                        succeeded: false,
                        exit_code: None,
                        stdout,
                        stderr,
                        elapsed,
                    },
                })
            }
        }
    }
}

// ============================================================================
// Process group
// ============================================================================

/// The group led by one spawned child
///
/// Killed at most once: explicitly via [`ProcessGroup::kill`] or on drop.
struct ProcessGroup {
    leader: Option<u32>,
}

impl ProcessGroup {
    fn new(leader: Option<u32>) -> Self {
        Self { leader }
    }

    #[cfg(unix)]
    fn kill(&mut self) {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pgid) = self.leader.take() else {
            return;
        };
        match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
            // Nothing left in the group
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => tracing::warn!(pgid, error = %e, "Failed to kill process group"),
        }
    }

    #[cfg(not(unix))]
    fn kill(&mut self) {
        self.leader = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

// ============================================================================
// Stream capture
// ============================================================================

/// Background reader for one pipe
///
/// The buffer is shared so the captured prefix survives aborting the reader.
struct StreamCapture {
    buffer: Arc<Mutex<CapturedOutput>>,
    task: Option<JoinHandle<()>>,
}

impl StreamCapture {
    fn start<R>(reader: Option<R>, limit: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(CapturedOutput::default()));
        let task = reader.map(|reader| tokio::spawn(drain(reader, limit, Arc::clone(&buffer))));
        Self { buffer, task }
    }

    async fn finish(self) -> CapturedOutput {
        if let Some(mut task) = self.task {
            if tokio::time::timeout(PIPE_DRAIN_GRACE, &mut task).await.is_err() {
                task.abort();
                tracing::debug!("Output pipe still open after exit; keeping captured prefix");
            }
        }
        std::mem::take(&mut *lock(&self.buffer))
    }
}

async fn drain<R>(mut reader: R, limit: usize, sink: Arc<Mutex<CapturedOutput>>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                lock(&sink).append_bounded(&chunk[..n], limit);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Output stream read failed");
                break;
            }
        }
    }
}

fn lock(buffer: &Mutex<CapturedOutput>) -> MutexGuard<'_, CapturedOutput> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exit_zero_succeeds() {
        let result = ProcessExecutor::default()
            .execute("true", &[], None)
            .await
            .unwrap();
        assert!(result.succeeded);
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_exit_nonzero_is_a_result() {
        let result = ProcessExecutor::default()
            .execute("false", &[], None)
            .await
            .unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let result = ProcessExecutor::default()
            .execute("sh", &args(&["-c", "echo out; echo err >&2; exit 3"]), None)
            .await
            .unwrap();
        assert_eq!(result.stdout.to_text(), "out\n");
        assert_eq!(result.stderr.to_text(), "err\n");
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.stdout.truncated);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ProcessExecutor::default()
            .execute("definitely-not-a-real-program-4b1d", &[], None)
            .await
            .unwrap_err();
        match err {
            ExecutionError::SpawnFailed { program, source } => {
                assert_eq!(program, "definitely-not-a-real-program-4b1d");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_output_truncated_to_prefix() {
        let executor = ProcessExecutor::new(1000, DEFAULT_DEADLINE);
        let result = executor
            .execute("sh", &args(&["-c", "head -c 200000 /dev/zero"]), None)
            .await
            .unwrap();
        assert!(result.succeeded);
        assert_eq!(result.stdout.bytes.len(), 1000);
        assert!(result.stdout.bytes.iter().all(|&b| b == 0));
        assert!(result.stdout.truncated);
        assert!(!result.stderr.truncated);
    }

    #[tokio::test]
    async fn test_deadline_kills_and_keeps_partial_output() {
        let executor = ProcessExecutor::new(DEFAULT_CAPTURE_LIMIT, Duration::from_millis(300));
        let err = executor
            .execute("sh", &args(&["-c", "echo partial; exec sleep 10"]), None)
            .await
            .unwrap_err();

        match err {
            ExecutionError::Timeout { limit, partial } => {
                assert_eq!(limit, Duration::from_millis(300));
                assert_eq!(partial.stdout.to_text(), "partial\n");
                assert!(!partial.succeeded);
                assert!(partial.elapsed < Duration::from_secs(5));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_kills_forked_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = format!("(sleep 1; touch '{}') & wait", marker.display());

        let executor = ProcessExecutor::new(DEFAULT_CAPTURE_LIMIT, Duration::from_millis(300));
        let err = executor
            .execute("sh", &args(&["-c", &script]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background job survived the deadline");
    }

    #[tokio::test]
    async fn test_background_job_does_not_outlive_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = format!("(sleep 1; touch '{}') & exit 0", marker.display());

        let result = ProcessExecutor::default()
            .execute("sh", &args(&["-c", &script]), None)
            .await
            .unwrap();
        assert!(result.succeeded);
        assert!(result.elapsed < Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background job survived the exit");
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessExecutor::default()
            .execute("pwd", &[], Some(dir.path()))
            .await
            .unwrap();
        let reported = std::fs::canonicalize(result.stdout.to_text().trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
