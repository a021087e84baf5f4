//! Language Builder Contract

use std::path::{Path, PathBuf};

/// Maps a source file to the toolchain commands that build, run and test it
///
/// Commands are returned as argv vectors (program first); the pipeline runs
/// them with the workspace directory as the working directory.
pub trait LanguageBuilder: Send + Sync {
    /// Human-readable language name
    fn name(&self) -> &'static str;

    /// Lowercase registry tag
    fn tag(&self) -> &'static str;

    /// Additional tags that resolve to this builder
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Source file extension, without the dot
    fn extension(&self) -> &'static str;

    fn build(&self, path: &Path, extra_args: &[String]) -> Vec<String>;

    fn run(&self, path: &Path, extra_args: &[String]) -> Vec<String>;

    fn test(&self, path: &Path, extra_args: &[String]) -> Vec<String>;

    /// Where `build` leaves the executable for `path`
    fn artifact(&self, path: &Path) -> PathBuf {
        path.with_extension(std::env::consts::EXE_EXTENSION)
    }

    /// Materialized source gets owner rwx (0o700)
    fn executable_source(&self) -> bool {
        true
    }
}

/// `head` followed by `extra_args`
pub(crate) fn command_line(head: &[&str], extra_args: &[String]) -> Vec<String> {
    head.iter()
        .map(|s| s.to_string())
        .chain(extra_args.iter().cloned())
        .collect()
}

/// Render a path as a command argument
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
