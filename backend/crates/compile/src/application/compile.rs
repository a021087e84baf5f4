//! Compile Use Case
//!
//! Drives one request through
//! `Received → Authenticated → LanguageResolved → SourceMaterialized →
//! Executed → Reported`. Any step before `Executed` may reject the request;
//! nothing is spawned for an unauthenticated request or an unknown language.

use std::sync::Arc;

use auth::application::SessionStore;
use auth::domain::repository::UserRepository;
use auth::domain::value_object::{session_key::SessionKey, user_id::UserId};
use auth::error::AuthResult;

use crate::application::config::CompileConfig;
use crate::application::pipeline::{BuildPipeline, Workspace};
use crate::domain::builder::LanguageBuilder;
use crate::domain::entity::{BuildSpec, ExecutionResult, Stage};
use crate::domain::registry::BuilderRegistry;
use crate::error::{CompileError, CompileResult};

/// Resolves a request's claimed identity
pub trait SessionAuthority: Send + Sync {
    /// Owner of `key`, provided it is `user_name`
    fn validate_for(&self, user_name: &str, key: &SessionKey) -> AuthResult<UserId>;
}

impl<U> SessionAuthority for SessionStore<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    fn validate_for(&self, user_name: &str, key: &SessionKey) -> AuthResult<UserId> {
        SessionStore::validate_for(self, user_name, key)
    }
}

/// Compile input
pub struct CompileInput {
    pub language: String,
    pub user_name: String,
    pub session_key: SessionKey,
    pub source: String,
    pub stage: Stage,
    /// Passed to the program (run) or the test command (test)
    pub args: Vec<String>,
}

/// Compile output
#[derive(Debug)]
pub enum CompileOutput {
    Built(ExecutionResult),
    /// `run` is `None` when the build failed
    Ran {
        build: ExecutionResult,
        run: Option<ExecutionResult>,
    },
    Tested(ExecutionResult),
}

/// Compile use case
pub struct CompileUseCase<S>
where
    S: SessionAuthority,
{
    sessions: Arc<S>,
    registry: Arc<BuilderRegistry>,
    pipeline: Arc<BuildPipeline>,
    config: Arc<CompileConfig>,
}

impl<S> CompileUseCase<S>
where
    S: SessionAuthority,
{
    pub fn new(
        sessions: Arc<S>,
        registry: Arc<BuilderRegistry>,
        pipeline: Arc<BuildPipeline>,
        config: Arc<CompileConfig>,
    ) -> Self {
        Self {
            sessions,
            registry,
            pipeline,
            config,
        }
    }

    pub async fn execute(&self, input: CompileInput) -> CompileResult<CompileOutput> {
        let user_id = self
            .sessions
            .validate_for(&input.user_name, &input.session_key)?;
        tracing::debug!(%user_id, stage = %input.stage, "Request authenticated");

        let builder = self.registry.resolve(&input.language)?;
        tracing::debug!(language = builder.tag(), "Language resolved");

        let size = input.source.len();
        if size > self.config.max_source_bytes {
            return Err(CompileError::SourceTooLarge {
                size,
                limit: self.config.max_source_bytes,
            });
        }

        let spec = BuildSpec {
            language: builder.tag().to_string(),
            source: input.source,
        };
        let workspace = self.pipeline.materialize(&spec, builder.as_ref()).await?;
        tracing::debug!(workspace = %workspace.dir().display(), "Source materialized");

        let outcome = self
            .run_stage(&workspace, builder.as_ref(), input.stage, &input.args)
            .await;
        self.release(workspace).await;
        let output = outcome?;

        tracing::info!(
            %user_id,
            language = builder.tag(),
            stage = %input.stage,
            succeeded = output.succeeded(),
            elapsed_ms = output.elapsed_ms(),
            "Compile request completed"
        );

        Ok(output)
    }

    async fn run_stage(
        &self,
        workspace: &Workspace,
        builder: &dyn LanguageBuilder,
        stage: Stage,
        args: &[String],
    ) -> CompileResult<CompileOutput> {
        match stage {
            Stage::Build => {
                let build = self.pipeline.build(workspace, builder, &[]).await?;
                Ok(CompileOutput::Built(build))
            }
            Stage::Run => {
                let build = self.pipeline.build(workspace, builder, &[]).await?;
                let run = if build.succeeded {
                    Some(self.pipeline.run_artifact(workspace, builder, args).await?)
                } else {
                    None
                };
                Ok(CompileOutput::Ran { build, run })
            }
            Stage::Test => {
                let test = self.pipeline.test_source(workspace, builder, args).await?;
                Ok(CompileOutput::Tested(test))
            }
        }
    }

    async fn release(&self, workspace: Workspace) {
        if self.config.retain_workspaces {
            tracing::debug!(workspace = %workspace.dir().display(), "Workspace retained");
            return;
        }
        let dir = workspace.dir().to_path_buf();
        if let Err(e) = workspace.remove().await {
            tracing::warn!(workspace = %dir.display(), error = %e, "Failed to remove workspace");
        }
    }
}

impl CompileOutput {
    /// Every stage that ran succeeded
    pub fn succeeded(&self) -> bool {
        match self {
            CompileOutput::Built(result) | CompileOutput::Tested(result) => result.succeeded,
            CompileOutput::Ran { build, run } => {
                build.succeeded && run.as_ref().is_some_and(|r| r.succeeded)
            }
        }
    }

    /// Total wall-clock time across stages
    pub fn elapsed_ms(&self) -> u64 {
        match self {
            CompileOutput::Built(result) | CompileOutput::Tested(result) => result.elapsed_ms(),
            CompileOutput::Ran { build, run } => {
                build.elapsed_ms() + run.as_ref().map_or(0, ExecutionResult::elapsed_ms)
            }
        }
    }
}
