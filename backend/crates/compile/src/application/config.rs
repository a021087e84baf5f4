//! Application Configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::infra::executor::{DEFAULT_CAPTURE_LIMIT, DEFAULT_DEADLINE, ProcessExecutor};

/// Compile application configuration
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Parent of the per-request workspace directories
    pub work_root: PathBuf,
    /// Wall-clock limit for each toolchain or program run
    pub deadline: Duration,
    /// Per-stream output capture capacity in bytes
    pub capture_limit: usize,
    /// Largest accepted source submission in bytes
    pub max_source_bytes: usize,
    /// Keep workspaces after responding (debugging aid)
    pub retain_workspaces: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from("./workspaces"),
            deadline: DEFAULT_DEADLINE,
            capture_limit: DEFAULT_CAPTURE_LIMIT,
            max_source_bytes: 256 * 1024,
            retain_workspaces: false,
        }
    }
}

impl CompileConfig {
    /// Config for development: workspaces are kept for inspection
    pub fn development() -> Self {
        Self {
            retain_workspaces: true,
            ..Default::default()
        }
    }

    /// Executor honoring these limits
    pub fn executor(&self) -> ProcessExecutor {
        ProcessExecutor::new(self.capture_limit, self.deadline)
    }
}
