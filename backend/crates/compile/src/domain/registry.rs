//! Builder Registry
//!
//! Resolves a request's language tag to its builder. Resolution is a pure
//! map lookup: an unknown tag fails before anything touches the filesystem
//! or spawns a process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::builder::LanguageBuilder;
use crate::domain::languages::{OdinBuilder, ZigBuilder};

/// Language tag did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Tag → builder map
#[derive(Clone, Default)]
pub struct BuilderRegistry {
    builders: HashMap<String, Arc<dyn LanguageBuilder>>,
}

impl BuilderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shipped builder
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(OdinBuilder);
        registry.register(ZigBuilder);
        registry
    }

    /// Add a builder under its tag and aliases
    ///
    /// Existing languages are untouched unless they share a tag.
    pub fn register<B>(&mut self, builder: B) -> &mut Self
    where
        B: LanguageBuilder + 'static,
    {
        let builder: Arc<dyn LanguageBuilder> = Arc::new(builder);
        let tags = std::iter::once(builder.tag()).chain(builder.aliases().iter().copied());

        for tag in tags {
            if let Some(previous) = self
                .builders
                .insert(tag.to_ascii_lowercase(), Arc::clone(&builder))
            {
                tracing::warn!(
                    tag,
                    replaced = previous.name(),
                    by = builder.name(),
                    "Language tag re-registered"
                );
            }
        }
        self
    }

    /// Look up the builder for `tag` (case-insensitive)
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn LanguageBuilder>, ResolutionError> {
        self.builders
            .get(&tag.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ResolutionError::UnsupportedLanguage(tag.to_string()))
    }

    /// Every tag that resolves, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    struct Shell;

    impl LanguageBuilder for Shell {
        fn name(&self) -> &'static str {
            "Shell"
        }
        fn tag(&self) -> &'static str {
            "sh"
        }
        fn aliases(&self) -> &'static [&'static str] {
            &["shell", "posix-sh"]
        }
        fn extension(&self) -> &'static str {
            "sh"
        }
        fn build(&self, path: &Path, _: &[String]) -> Vec<String> {
            vec!["sh".into(), "-n".into(), path.display().to_string()]
        }
        fn run(&self, path: &Path, _: &[String]) -> Vec<String> {
            vec!["sh".into(), path.display().to_string()]
        }
        fn test(&self, path: &Path, args: &[String]) -> Vec<String> {
            self.run(path, args)
        }
    }

    #[test]
    fn test_defaults() {
        let registry = BuilderRegistry::with_defaults();
        assert_eq!(registry.tags(), vec!["odin", "zig"]);
        assert_eq!(registry.resolve("odin").unwrap().name(), "Odin");
        assert_eq!(registry.resolve("ODIN").unwrap().extension(), "odin");
    }

    #[test]
    fn test_unknown_language() {
        let registry = BuilderRegistry::with_defaults();
        assert_eq!(
            registry.resolve("cobol").err(),
            Some(ResolutionError::UnsupportedLanguage("cobol".into()))
        );
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_register_is_additive() {
        let mut registry = BuilderRegistry::with_defaults();
        registry.register(Shell);

        assert_eq!(registry.resolve("shell").unwrap().tag(), "sh");
        assert_eq!(registry.resolve("posix-sh").unwrap().tag(), "sh");
        assert_eq!(registry.resolve("odin").unwrap().tag(), "odin");
        assert_eq!(registry.tags().len(), 5);
    }
}
