//! API Server Entry Point
//!
//! Startup uses `anyhow`; request-level errors go through
//! `kernel::error::AppError`.

mod app;
mod settings;

use std::sync::Arc;

use auth::application::{AdminProvisioning, SessionStore, provision_admin};
use auth::presentation::AuthAppState;
use auth::SqliteUserRepository;
use compile::application::CompileUseCase;
use compile::presentation::CompileAppState;
use compile::{BuildPipeline, BuilderRegistry};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,compile=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    // Database
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    tracing::info!(url = %settings.database_url, "Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;
    tracing::info!("Migrations completed");

    // Auth
    let repo = Arc::new(SqliteUserRepository::new(pool));
    let verifier = Arc::new(settings.auth.credential_verifier()?);

    match provision_admin(
        repo.as_ref(),
        &verifier,
        settings.admin_initial_password.clone(),
    )
    .await?
    {
        AdminProvisioning::AlreadyPresent => {}
        AdminProvisioning::Created => {
            tracing::info!("Administrator created with the configured password");
        }
        AdminProvisioning::CreatedWithGeneratedPassword(password) => {
            tracing::warn!(
                user_name = auth::application::provision::ADMIN_USER_NAME,
                password = %password,
                "Administrator created with a generated password; record it now, it is not shown again"
            );
        }
    }

    let sessions = Arc::new(SessionStore::new(Arc::clone(&repo), verifier));
    if let Some(period) = settings.auth.sweep_interval {
        Arc::clone(&sessions).spawn_sweeper(period);
        tracing::info!(period_secs = period.as_secs(), "Session sweeper started");
    }

    // Compile
    tokio::fs::create_dir_all(&settings.compile.work_root).await?;
    let registry = BuilderRegistry::with_defaults();
    tracing::info!(languages = ?registry.tags(), work_root = %settings.compile.work_root.display(), "Builders registered");

    let pipeline = BuildPipeline::new(
        settings.compile.work_root.clone(),
        settings.compile.executor(),
    );
    let use_case = CompileUseCase::new(
        Arc::clone(&sessions),
        Arc::new(registry),
        Arc::new(pipeline),
        Arc::new(settings.compile),
    );

    let app = app::build_router(
        AuthAppState {
            repo,
            sessions,
            config: Arc::new(settings.auth),
        },
        CompileAppState {
            use_case: Arc::new(use_case),
        },
        &settings.frontend_origins,
    );

    tracing::info!("Listening on {}", settings.bind_addr);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
