//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;

use auth::domain::value_object::session_key::SessionKey;

use crate::application::compile::{CompileInput, CompileOutput, CompileUseCase, SessionAuthority};
use crate::domain::entity::Stage;
use crate::error::CompileResult;
use crate::presentation::dto::{CompileRequest, ExecutionResponse, RunRequest, RunResponse};

/// Shared state for compile handlers
pub struct CompileAppState<S>
where
    S: SessionAuthority + 'static,
{
    pub use_case: Arc<CompileUseCase<S>>,
}

// Manual impl: derive would demand `S: Clone`
impl<S> Clone for CompileAppState<S>
where
    S: SessionAuthority + 'static,
{
    fn clone(&self) -> Self {
        Self {
            use_case: Arc::clone(&self.use_case),
        }
    }
}

fn compile_input(
    language: String,
    auth: auth::presentation::dto::SessionCredentials,
    source: String,
    stage: Stage,
    args: Vec<String>,
) -> CompileInput {
    CompileInput {
        language,
        user_name: auth.user_name,
        session_key: SessionKey::from_client(auth.session_key),
        source,
        stage,
        args,
    }
}

/// POST /api/compile/{language}
pub async fn compile<S>(
    State(state): State<CompileAppState<S>>,
    Path(language): Path<String>,
    Json(req): Json<CompileRequest>,
) -> CompileResult<Json<ExecutionResponse>>
where
    S: SessionAuthority + 'static,
{
    let input = compile_input(language, req.auth, req.source_code, Stage::Build, Vec::new());

    match state.use_case.execute(input).await? {
        CompileOutput::Built(result) => Ok(Json(ExecutionResponse::from(&result))),
        other => unreachable_stage(other),
    }
}

/// POST /api/run/{language}
pub async fn run<S>(
    State(state): State<CompileAppState<S>>,
    Path(language): Path<String>,
    Json(req): Json<RunRequest>,
) -> CompileResult<Json<RunResponse>>
where
    S: SessionAuthority + 'static,
{
    let input = compile_input(language, req.auth, req.source_code, Stage::Run, req.args);

    match state.use_case.execute(input).await? {
        CompileOutput::Ran { build, run } => Ok(Json(RunResponse {
            build: ExecutionResponse::from(&build),
            run: run.as_ref().map(ExecutionResponse::from),
        })),
        other => unreachable_stage(other),
    }
}

/// POST /api/test/{language}
pub async fn test<S>(
    State(state): State<CompileAppState<S>>,
    Path(language): Path<String>,
    Json(req): Json<RunRequest>,
) -> CompileResult<Json<ExecutionResponse>>
where
    S: SessionAuthority + 'static,
{
    let input = compile_input(language, req.auth, req.source_code, Stage::Test, req.args);

    match state.use_case.execute(input).await? {
        CompileOutput::Tested(result) => Ok(Json(ExecutionResponse::from(&result))),
        other => unreachable_stage(other),
    }
}

/// The use case answers with the variant of the stage it was given
fn unreachable_stage<T>(output: CompileOutput) -> CompileResult<T> {
    tracing::error!(?output, "Use case returned output for a different stage");
    Err(std::io::Error::other("stage mismatch").into())
}
