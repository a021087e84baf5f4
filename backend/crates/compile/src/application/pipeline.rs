//! Build Pipeline
//!
//! Writes submitted source into a fresh per-request directory and runs the
//! builder's commands there through the process executor.
//!
//! Layout: `<work_root>/<uuid>/main.<ext>`. Build artifacts land next to
//! the source because every command runs with the workspace as its
//! working directory. A relative `work_root` is resolved against the
//! process working directory when the workspace is created.

use std::io;
use std::path::{Path, PathBuf};

use kernel::error::resource::ResourceError;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::builder::LanguageBuilder;
use crate::domain::entity::{BuildSpec, ExecutionResult};
use crate::error::{CompileError, CompileResult};
use crate::infra::executor::{ExecutionError, ProcessExecutor};

/// File stem of every materialized source
pub const SOURCE_STEM: &str = "main";

/// Directory and source file for one request
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    source: PathBuf,
}

impl Workspace {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source_path(&self) -> &Path {
        &self.source
    }

    /// Delete the directory and everything the build left in it
    pub async fn remove(self) -> io::Result<()> {
        fs::remove_dir_all(&self.dir).await
    }
}

/// Materializes source and drives builder commands
#[derive(Debug, Clone)]
pub struct BuildPipeline {
    work_root: PathBuf,
    executor: ProcessExecutor,
}

impl BuildPipeline {
    pub fn new(work_root: impl Into<PathBuf>, executor: ProcessExecutor) -> Self {
        Self {
            work_root: work_root.into(),
            executor,
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Create `<work_root>/<uuid>/main.<ext>` holding the submitted source
    pub async fn materialize(
        &self,
        spec: &BuildSpec,
        builder: &dyn LanguageBuilder,
    ) -> CompileResult<Workspace> {
        // Commands run with `dir` as cwd, so builders only ever see absolute paths
        let dir = std::path::absolute(self.work_root.join(Uuid::new_v4().to_string()))?;
        fs::create_dir_all(&dir).await?;

        let source = dir.join(format!("{SOURCE_STEM}.{}", builder.extension()));
        write_source(&source, &spec.source, builder.executable_source()).await?;

        tracing::debug!(
            language = %spec.language,
            path = %source.display(),
            bytes = spec.source.len(),
            "Source materialized"
        );

        Ok(Workspace { dir, source })
    }

    /// Materialize and build, returning the build status unchanged
    ///
    /// Neither runs the artifact nor deletes anything; the caller owns the
    /// returned workspace.
    pub async fn build_and_capture(
        &self,
        spec: &BuildSpec,
        builder: &dyn LanguageBuilder,
    ) -> CompileResult<(Workspace, ExecutionResult)> {
        let workspace = self.materialize(spec, builder).await?;
        let result = self.build(&workspace, builder, &[]).await?;
        Ok((workspace, result))
    }

    /// Run the builder's build command in `workspace`
    pub async fn build(
        &self,
        workspace: &Workspace,
        builder: &dyn LanguageBuilder,
        args: &[String],
    ) -> CompileResult<ExecutionResult> {
        self.invoke(workspace, builder.build(workspace.source_path(), args))
            .await
    }

    /// Run the artifact a successful build left in `workspace`
    pub async fn run_artifact(
        &self,
        workspace: &Workspace,
        builder: &dyn LanguageBuilder,
        args: &[String],
    ) -> CompileResult<ExecutionResult> {
        self.invoke(workspace, builder.run(workspace.source_path(), args))
            .await
    }

    /// Run the builder's test command on the source in `workspace`
    pub async fn test_source(
        &self,
        workspace: &Workspace,
        builder: &dyn LanguageBuilder,
        args: &[String],
    ) -> CompileResult<ExecutionResult> {
        self.invoke(workspace, builder.test(workspace.source_path(), args))
            .await
    }

    async fn invoke(
        &self,
        workspace: &Workspace,
        argv: Vec<String>,
    ) -> CompileResult<ExecutionResult> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ExecutionError::SpawnFailed {
                program: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "builder produced no command"),
            }
            .into());
        };

        Ok(self
            .executor
            .execute(program, args, Some(workspace.dir()))
            .await?)
    }
}

/// Write `source` to `path`, claiming an existing path only if it is a regular file
async fn write_source(path: &Path, source: &str, executable: bool) -> CompileResult<()> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let metadata = fs::symlink_metadata(path).await?;
            if !metadata.file_type().is_file() {
                return Err(ResourceError::FileConflict(path.to_path_buf()).into());
            }
            tracing::debug!(path = %path.display(), "Reusing existing source file");
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(path)
                .await?
        }
        Err(e) => return Err(CompileError::Io(e)),
    };

    file.write_all(source.as_bytes()).await?;
    file.flush().await?;

    #[cfg(unix)]
    if executable {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)).await?;
    }
    #[cfg(not(unix))]
    let _ = executable;

    Ok(())
}
