//! Build Entities
//!
//! Transient records: nothing here is persisted.

use std::time::Duration;

/// Source submitted for one request
#[derive(Debug, Clone)]
pub struct BuildSpec {
    /// Canonical language tag the builder was resolved from
    pub language: String,
    pub source: String,
}

/// Which toolchain command a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Stage {
    #[display("build")]
    Build,
    #[display("run")]
    Run,
    #[display("test")]
    Test,
}

/// One output stream, capped at a fixed capacity
///
/// Holds the first bytes the process wrote; `truncated` records that more
/// arrived and were discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl CapturedOutput {
    /// Append as much of `chunk` as fits under `limit`
    pub fn append_bounded(&mut self, chunk: &[u8], limit: usize) {
        let room = limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    /// Captured bytes as text, invalid UTF-8 replaced
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Outcome of one process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit status was zero
    pub succeeded: bool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: CapturedOutput,
    pub stderr: CapturedOutput,
    /// Wall-clock time from spawn to exit
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
