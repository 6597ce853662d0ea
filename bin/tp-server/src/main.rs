//! TaskPilot Server
//!
//! Production server for the TaskPilot REST APIs:
//! - Member APIs: signup, login, logout, profile
//! - Auth APIs: token refresh, validation, social account binding
//! - Project / Task APIs: owner-scoped tracking
//! - Agent APIs: tool-style task operations for automation clients
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TP_PORT` | `8080` | HTTP API port |
//! | `TP_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `TP_MONGO_DB` | `taskpilot` | MongoDB database name |
//! | `TP_JWT_SECRET` | - | HS256 signing secret (required outside dev) |
//! | `TP_ACCESS_TOKEN_EXPIRY_SECS` | `3600` | Access token lifetime |
//! | `TP_REFRESH_TOKEN_EXPIRY_SECS` | `604800` | Refresh token lifetime |
//! | `TP_SERVER_BASE_URL` | `http://localhost:8080` | Public base URL of this server |
//! | `TP_CLIENT_BASE_URL` | `http://localhost:3000` | Frontend base URL for OAuth redirects |
//! | `TP_OAUTH_FAILURE_URL` | `{client}/login` | Frontend URL for OAuth failures |
//! | `TP_GOOGLE_CLIENT_ID` / `TP_GOOGLE_CLIENT_SECRET` | - | Google OAuth2 credentials |
//! | `TP_KAKAO_CLIENT_ID` / `TP_KAKAO_CLIENT_SECRET` | - | Kakao OAuth2 credentials |
//! | `TP_COOKIE_SECURE` | `true` | Secure flag on the refresh cookie |
//! | `TP_RATE_LIMIT_PER_MINUTE` | `30` | Global request quota per minute |
//! | `RUST_LOG` | `info` | Log level |

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use tp_platform::api::{
    agent_router, auth_router, health_router, member_router, oauth_login_router, project_router,
    task_router, AgentState, AppState, AuthLayer, AuthState, HealthState, MembersState,
    OAuthLoginState, ProjectsState, RateLimitLayer, TasksState,
};
use tp_platform::auth::{
    AuthorizationRequestStore, BindingStore, OidcClient, ProviderEndpoints, TokenConfig,
};
use tp_platform::{
    MemberAuthProviderRepository, MemberRepository, MemberService, PasswordService,
    ProjectRepository, ProjectService, RefreshSessionRepository, TaskRepository, TaskService,
    TokenService,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    tp_common::logging::init_logging("tp-server");

    info!("Starting TaskPilot Server");

    // Configuration from environment
    let port: u16 = env_or_parse("TP_PORT", 8080);
    let mongo_url = env_or("TP_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("TP_MONGO_DB", "taskpilot");
    let server_base_url = env_or("TP_SERVER_BASE_URL", "http://localhost:8080");
    let client_base_url = env_or("TP_CLIENT_BASE_URL", "http://localhost:3000");
    let failure_url = env_or(
        "TP_OAUTH_FAILURE_URL",
        &format!("{}/login", client_base_url.trim_end_matches('/')),
    );
    let cookie_secure: bool = env_or_parse("TP_COOKIE_SECURE", true);
    let rate_limit: u32 = env_or_parse("TP_RATE_LIMIT_PER_MINUTE", 30);

    let jwt_secret = match std::env::var("TP_JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            warn!("TP_JWT_SECRET not set, using an insecure development secret");
            "taskpilot-dev-secret".to_string()
        }
    };

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    // Repositories
    let member_repo = Arc::new(MemberRepository::new(&db));
    let auth_provider_repo = Arc::new(MemberAuthProviderRepository::new(&db));
    let refresh_session_repo = Arc::new(RefreshSessionRepository::new(&db));
    let project_repo = Arc::new(ProjectRepository::new(&db));
    let task_repo = Arc::new(TaskRepository::new(&db));
    info!("Repositories initialized");

    // Token and password services
    let mut token_config = TokenConfig::new(jwt_secret);
    token_config.access_token_expiry_secs = env_or_parse("TP_ACCESS_TOKEN_EXPIRY_SECS", 3600);
    token_config.refresh_token_expiry_secs =
        env_or_parse("TP_REFRESH_TOKEN_EXPIRY_SECS", 604_800);
    let refresh_token_expiry_secs = token_config.refresh_token_expiry_secs;
    let token_service = Arc::new(TokenService::new(token_config));
    let password_service = Arc::new(PasswordService::default());

    // Domain services
    let member_service = Arc::new(MemberService::new(
        member_repo.clone(),
        auth_provider_repo,
        password_service,
        token_service.clone(),
        refresh_session_repo.clone(),
    ));
    let project_service = Arc::new(ProjectService::new(project_repo.clone(), task_repo.clone()));
    let task_service = Arc::new(TaskService::new(task_repo, project_repo));

    // OAuth2 plumbing
    let binding_store = Arc::new(BindingStore::new());
    let request_store = Arc::new(AuthorizationRequestStore::new());
    let mut oidc_client = OidcClient::new(&server_base_url);
    if let (Ok(id), Ok(secret)) = (
        std::env::var("TP_GOOGLE_CLIENT_ID"),
        std::env::var("TP_GOOGLE_CLIENT_SECRET"),
    ) {
        oidc_client = oidc_client.with_google(ProviderEndpoints::google(id, secret));
        info!("Google OAuth2 login enabled");
    }
    if let (Ok(id), Ok(secret)) = (
        std::env::var("TP_KAKAO_CLIENT_ID"),
        std::env::var("TP_KAKAO_CLIENT_SECRET"),
    ) {
        oidc_client = oidc_client.with_kakao(ProviderEndpoints::kakao(id, secret));
        info!("Kakao OAuth2 login enabled");
    }
    let oidc_client = Arc::new(oidc_client);
    info!("Auth services initialized");

    // API states
    let members_state = MembersState::new(member_service.clone()).with_refresh_cookie_settings(
        "refresh-token",
        cookie_secure,
        refresh_token_expiry_secs,
    );
    let auth_state = AuthState::new(
        token_service.clone(),
        refresh_session_repo,
        member_repo,
        binding_store.clone(),
    )
    .with_authorize_base_url(&server_base_url)
    .with_refresh_cookie_settings("refresh-token", cookie_secure, refresh_token_expiry_secs);
    let oauth_login_state = OAuthLoginState::new(
        oidc_client,
        request_store,
        binding_store,
        member_service,
        &client_base_url,
        &failure_url,
    )
    .with_refresh_cookie_settings("refresh-token", cookie_secure, refresh_token_expiry_secs);
    let projects_state = ProjectsState {
        project_service: project_service.clone(),
    };
    let tasks_state = TasksState {
        task_service: task_service.clone(),
    };
    let agent_state = AgentState {
        project_service,
        task_service,
    };
    let health_state = HealthState::new(Some(db), Some(env!("CARGO_PKG_VERSION").to_string()));

    // Auth middleware state
    let app_state = AppState {
        token_service: token_service.clone(),
    };

    // API router with auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/member", member_router(members_state))
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/project", project_router(projects_state))
        .nest("/api/task", task_router(tasks_state))
        .nest("/api/agent", agent_router(agent_state))
        .split_for_parts();

    openapi.info.title = "TaskPilot API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description =
        Some("REST APIs for members, authentication, projects, and tasks".to_string());

    let rate_limit_layer = NonZeroU32::new(rate_limit)
        .map(RateLimitLayer::per_minute)
        .unwrap_or_default();

    let app = Router::new()
        .merge(router)
        // Provider redirect endpoints live at the root, not under /api
        .merge(oauth_login_router(oauth_login_state))
        .nest("/health", health_router(health_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(rate_limit_layer)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = format!("0.0.0.0:{}", port);
    info!("API server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("TaskPilot Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
