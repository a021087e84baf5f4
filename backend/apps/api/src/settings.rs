//! Environment Settings
//!
//! Reads process configuration from environment variables (after `.env`
//! has been loaded). Every variable has a default except the optional
//! secrets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use compile::CompileConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://data.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Process settings
#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    /// Password for a newly provisioned administrator
    pub admin_initial_password: Option<String>,
    pub auth: AuthConfig,
    pub compile: CompileConfig,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_or(&var, "BIND_ADDR", DEFAULT_BIND_ADDR.parse()?)?;

        let password_pepper = var("PASSWORD_PEPPER")
            .map(|b64| general_purpose::STANDARD.decode(b64.trim()))
            .transpose()
            .context("PASSWORD_PEPPER must be base64")?;

        let sweep_secs: u64 = parse_or(&var, "SESSION_SWEEP_SECS", 60)?;

        let auth = AuthConfig {
            session_ttl: Duration::from_secs(parse_or(&var, "SESSION_TTL_SECS", 10)?),
            password_pepper,
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            ..AuthConfig::default()
        };

        let defaults = CompileConfig::default();
        let compile = CompileConfig {
            work_root: var("WORK_ROOT").map_or(defaults.work_root.clone(), PathBuf::from),
            deadline: Duration::from_secs(parse_or(
                &var,
                "COMPILE_TIMEOUT_SECS",
                defaults.deadline.as_secs(),
            )?),
            capture_limit: parse_or(&var, "CAPTURE_LIMIT_BYTES", defaults.capture_limit)?,
            max_source_bytes: parse_or(&var, "MAX_SOURCE_BYTES", defaults.max_source_bytes)?,
            retain_workspaces: var("RETAIN_WORKSPACES").is_some_and(|v| is_truthy(&v)),
        };

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            frontend_origins,
            admin_initial_password: var("ADMIN_INITIAL_PASSWORD"),
            auth,
            compile,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
