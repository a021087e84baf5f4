//! Router Assembly

use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::domain::repository::UserRepository;
use auth::presentation::{AuthAppState, auth_router};
use compile::application::SessionAuthority;
use compile::presentation::{CompileAppState, compile_router};

/// Full HTTP surface: `/`, `/api/auth/*`, `/api/{compile,run,test}/*`
pub fn build_router<R, S>(
    auth_state: AuthAppState<R>,
    compile_state: CompileAppState<S>,
    frontend_origins: &[String],
) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    S: SessionAuthority + 'static,
{
    let api = Router::new()
        .nest("/auth", auth_router(auth_state))
        .merge(compile_router(compile_state));

    Router::new()
        .route("/", get(hello))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors(frontend_origins)),
        )
}

async fn hello() -> &'static str {
    "hello"
}

fn cors(frontend_origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use auth::application::{AuthConfig, SessionStore};
    use auth::infra::memory::InMemoryUserRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use compile::application::{BuildPipeline, CompileConfig, CompileUseCase};
    use compile::domain::registry::BuilderRegistry;
    use platform::password::KdfParams;
    use tower::ServiceExt;

    use super::*;

    fn router(work_root: &Path) -> Router {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = AuthConfig {
            kdf: KdfParams::minimal(),
            ..AuthConfig::development()
        };
        let verifier = Arc::new(config.credential_verifier().unwrap());
        let sessions = Arc::new(SessionStore::new(Arc::clone(&repo), verifier));

        let compile_config = CompileConfig {
            work_root: work_root.to_path_buf(),
            ..Default::default()
        };
        let use_case = CompileUseCase::new(
            Arc::clone(&sessions),
            Arc::new(BuilderRegistry::with_defaults()),
            Arc::new(BuildPipeline::new(work_root, compile_config.executor())),
            Arc::new(compile_config),
        );

        build_router(
            AuthAppState {
                repo,
                sessions,
                config: Arc::new(config),
            },
            CompileAppState {
                use_case: Arc::new(use_case),
            },
            &["http://localhost:5173".to_string()],
        )
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_hello() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(router(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn test_routes_are_mounted_under_api() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(dir.path());

        let (status, _) = send(
            app.clone(),
            post_json(
                "/api/auth/login",
                r#"{"userName":"nobody","password":"irrelevant"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            app.clone(),
            post_json(
                "/api/compile/odin",
                r#"{"auth":{"userName":"nobody","sessionKey":"x"},"sourceCode":""}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/nothing-here")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
