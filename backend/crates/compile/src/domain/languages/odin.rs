use std::path::Path;

use crate::domain::builder::{LanguageBuilder, command_line, path_arg};

/// Odin, single-file package mode
#[derive(Debug, Clone, Default)]
pub struct OdinBuilder;

impl LanguageBuilder for OdinBuilder {
    fn name(&self) -> &'static str {
        "Odin"
    }

    fn tag(&self) -> &'static str {
        "odin"
    }

    fn extension(&self) -> &'static str {
        "odin"
    }

    fn build(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let path = path_arg(path);
        command_line(&["odin", "build", path.as_str(), "-file"], extra_args)
    }

    fn run(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let artifact = path_arg(&self.artifact(path));
        command_line(&[artifact.as_str()], extra_args)
    }

    fn test(&self, path: &Path, extra_args: &[String]) -> Vec<String> {
        let path = path_arg(path);
        command_line(&["odin", "test", path.as_str(), "-file"], extra_args)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_commands() {
        let path = PathBuf::from("/work/abc/main.odin");
        let builder = OdinBuilder;

        assert_eq!(
            builder.build(&path, &[]),
            vec!["odin", "build", "/work/abc/main.odin", "-file"]
        );
        assert_eq!(
            builder.test(&path, &["-vet".to_string()]),
            vec!["odin", "test", "/work/abc/main.odin", "-file", "-vet"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_uses_artifact() {
        let path = PathBuf::from("/work/abc/main.odin");
        assert_eq!(
            OdinBuilder.run(&path, &["x".to_string()]),
            vec!["/work/abc/main", "x"]
        );
    }
}
