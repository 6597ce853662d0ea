//! TaskPilot Platform
//!
//! Core platform providing:
//! - Member accounts with local and social authentication
//! - JWT access/refresh token lifecycle with single-session refresh
//! - OAuth2 social login (Google, Kakao) and account binding
//! - Owner-scoped project and task tracking
//! - Agent-facing tool API mirroring the task operations
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `service` - Domain operations
//! - `api` - REST endpoints

// Core aggregates
pub mod member;
pub mod project;
pub mod task;

// Authentication
pub mod auth;

// Agent tool surface
pub mod agent;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export main entity types for convenience
pub use auth::refresh_session::RefreshSession;
pub use auth::token_service::{TokenClaims, TokenInfo};
pub use member::entity::{AuthProvider, Member, MemberAuthProvider};
pub use project::entity::{Project, ProjectStatus};
pub use task::entity::{Task, TaskStatus};

// Re-export repositories
pub use auth::refresh_session_repository::RefreshSessionRepository;
pub use member::repository::{MemberAuthProviderRepository, MemberRepository};
pub use project::repository::ProjectRepository;
pub use task::repository::TaskRepository;

// Re-export services
pub use auth::password_service::PasswordService;
pub use auth::token_service::TokenService;
pub use member::service::MemberService;
pub use project::service::ProjectService;
pub use task::service::TaskService;

/// API state, router, and middleware re-exports
pub mod api {
    pub use crate::shared::middleware::{AppState, Authenticated, AuthLayer, CurrentUser};
    pub use crate::shared::rate_limit::RateLimitLayer;

    pub use crate::agent::api::{agent_router, AgentState};
    pub use crate::auth::auth_api::{auth_router, AuthState};
    pub use crate::auth::oauth_login_api::{oauth_login_router, OAuthLoginState};
    pub use crate::member::api::{member_router, MembersState};
    pub use crate::project::api::{project_router, ProjectsState};
    pub use crate::task::api::{task_router, TasksState};

    pub use crate::shared::health_api::{health_router, HealthState};
}
