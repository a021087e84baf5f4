use std::path::Path;

use crate::domain::builder::{LanguageBuilder, command_line, path_arg};

/// Zig, `build-exe` on a single root file
#[derive(Debug, Clone, Default)]
pub struct ZigBuilder;

impl LanguageBuilder for ZigBuilder {
    fn name(&self) -> &'static str {
        "Zig"
    }

    fn tag(&self) -> &'static str {
        "zig"
    }

    fn extension(&self) -> &'static str {
        "zig"
    }

    fn build(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let path = path_arg(path);
        command_line(&["zig", "build-exe", path.as_str()], extra_args)
    }

    fn run(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let artifact = path_arg(&self.artifact(path));
        command_line(&[artifact.as_str()], extra_args)
    }

    fn test(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let path = path_arg(path);
        command_line(&["zig", "test", path.as_str()], extra_args)
    }

    // Zig reads the file; nothing executes it directly
    fn executable_source(&self) -> bool {
        false
    }
}
