//! Auth Module
//!
//! Tokens, refresh sessions, passwords, and the OAuth2 login flow.

pub mod auth_api;
pub mod binding;
pub mod oauth_login_api;
pub mod oauth_state;
pub mod oauth_user_info;
pub mod oidc_client;
pub mod password_service;
pub mod refresh_session;
pub mod refresh_session_repository;
pub mod token_service;

pub use auth_api::{auth_router, AuthState};
pub use binding::{BindingRequest, BindingStore};
pub use oauth_login_api::{oauth_login_router, OAuthLoginState};
pub use oauth_state::{AuthorizationRequestStore, StateParam};
pub use oauth_user_info::OAuth2UserInfo;
pub use oidc_client::{OidcClient, ProviderEndpoints};
pub use password_service::{Argon2Config, PasswordPolicy, PasswordService};
pub use refresh_session::RefreshSession;
pub use refresh_session_repository::RefreshSessionRepository;
pub use token_service::{TokenClaims, TokenConfig, TokenInfo, TokenService};
