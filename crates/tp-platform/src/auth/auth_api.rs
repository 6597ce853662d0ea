//! Auth API Endpoints
//!
//! Token lifecycle endpoints.
//! - POST /api/auth/refresh - Exchange a refresh token for a new access token
//! - GET /api/auth/validate - Check whether a bearer token is still live
//! - GET /api/auth/roles - Authorities carried by the current token
//! - GET /api/auth/bind/{provider} - Start linking a social account

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::binding::BindingStore;
use crate::auth::refresh_session::RefreshSession;
use crate::auth::refresh_session_repository::RefreshSessionRepository;
use crate::auth::token_service::{extract_bearer_token, TokenInfo, TokenService};
use crate::member::entity::AuthProvider;
use crate::member::repository::MemberRepository;
use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Refresh request. The refresh token may also arrive as a cookie; an
/// explicit body value wins.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Token validity response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
}

/// Authorities response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolesResponse {
    pub roles: Vec<String>,
}

/// Bind initiation response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindRedirectResponse {
    /// URL the client should navigate the browser to
    pub redirect_url: String,
}

/// Auth endpoints state
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<TokenService>,
    pub refresh_sessions: Arc<RefreshSessionRepository>,
    pub members: Arc<MemberRepository>,
    pub binding_store: Arc<BindingStore>,
    /// Public base URL of this service, used to build bind redirect URLs
    pub authorize_base_url: String,
    /// Refresh cookie name (default: "refresh-token")
    pub refresh_cookie_name: String,
    pub refresh_cookie_secure: bool,
    pub refresh_token_expiry_secs: i64,
}

impl AuthState {
    pub fn new(
        token_service: Arc<TokenService>,
        refresh_sessions: Arc<RefreshSessionRepository>,
        members: Arc<MemberRepository>,
        binding_store: Arc<BindingStore>,
    ) -> Self {
        Self {
            token_service,
            refresh_sessions,
            members,
            binding_store,
            authorize_base_url: "http://localhost:8080".to_string(),
            refresh_cookie_name: "refresh-token".to_string(),
            refresh_cookie_secure: true,
            refresh_token_expiry_secs: 604_800,
        }
    }

    pub fn with_authorize_base_url(mut self, url: &str) -> Self {
        self.authorize_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_refresh_cookie_settings(
        mut self,
        name: &str,
        secure: bool,
        expiry_secs: i64,
    ) -> Self {
        self.refresh_cookie_name = name.to_string();
        self.refresh_cookie_secure = secure;
        self.refresh_token_expiry_secs = expiry_secs;
        self
    }

    fn refresh_cookie(&self, value: String) -> axum_extra::extract::cookie::Cookie<'static> {
        axum_extra::extract::cookie::Cookie::build((self.refresh_cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.refresh_cookie_secure)
            .same_site(axum_extra::extract::cookie::SameSite::Lax)
            .max_age(time::Duration::seconds(self.refresh_token_expiry_secs))
            .build()
    }
}

/// Refresh access token
///
/// Exchanges a valid refresh token for a new access token. The refresh token
/// itself is only rotated when it is close to expiry, so an active client
/// keeps its session alive without a new token on every call.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    operation_id = "postAuthRefresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = BaseResponse<TokenInfo>),
        (status = 400, description = "Refresh token missing"),
        (status = 401, description = "Refresh token rejected")
    )
)]
pub async fn refresh(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, PlatformError> {
    let refresh_token = body
        .and_then(|Json(req)| req.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            jar.get(&state.refresh_cookie_name)
                .map(|c| c.value().to_string())
        })
        .ok_or(PlatformError::RefreshTokenMissing)?;

    if !state.token_service.validate(&refresh_token) {
        return Err(PlatformError::RefreshTokenInvalid);
    }

    let claims = state.token_service.decode_claims(&refresh_token)?;
    let member_id = claims.user_id.ok_or(PlatformError::UserIdMissingInToken)?;

    let session = state
        .refresh_sessions
        .find(&member_id)
        .await?
        .ok_or(PlatformError::RefreshTokenNotFound)?;
    if !session.matches(&refresh_token) {
        return Err(PlatformError::RefreshTokenMismatch);
    }

    // authorities come from the member record, so role changes apply on the
    // next refresh
    let member = state
        .members
        .find_by_id(&member_id)
        .await?
        .ok_or(PlatformError::RefreshTokenNotFound)?;

    let access_token = state.token_service.issue_access_token(
        member.subject(),
        &member.id,
        &[member.role.clone()],
    )?;

    let remaining = state.token_service.remaining_lifetime_secs(&refresh_token)?;
    let (refresh_token, jar) = if state.token_service.should_rotate(remaining) {
        let rotated = state
            .token_service
            .issue_refresh_token(member.subject(), &member.id)?;
        state
            .refresh_sessions
            .save(&RefreshSession::new(&member.id, &rotated))
            .await?;
        let jar = jar.add(state.refresh_cookie(rotated.clone()));
        (rotated, jar)
    } else {
        (refresh_token, jar)
    };

    Ok((
        jar,
        Json(BaseResponse::ok(TokenInfo::bearer(
            access_token,
            refresh_token,
        ))),
    ))
}

/// Check bearer token validity
///
/// Reports whether the presented bearer token is well-formed, correctly
/// signed, and not expired. Always answers 200; the verdict is in the body.
#[utoipa::path(
    get,
    path = "/validate",
    tag = "auth",
    operation_id = "getAuthValidate",
    responses(
        (status = 200, description = "Validity verdict", body = BaseResponse<ValidateResponse>)
    )
)]
pub async fn validate(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Json<BaseResponse<ValidateResponse>> {
    let valid = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .map(|token| !state.token_service.is_expired(token))
        .unwrap_or(false);

    Json(BaseResponse::ok(ValidateResponse { valid }))
}

/// Authorities of the current token
#[utoipa::path(
    get,
    path = "/roles",
    tag = "auth",
    operation_id = "getAuthRoles",
    responses(
        (status = 200, description = "Granted authorities", body = BaseResponse<RolesResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn roles(auth: Authenticated) -> Json<BaseResponse<RolesResponse>> {
    Json(BaseResponse::ok(RolesResponse {
        roles: auth.authorities.clone(),
    }))
}

/// Start linking a social account
///
/// Issues a single-use bind token for the authenticated member and returns
/// the authorization URL the browser should visit. The bind token rides in
/// the OAuth2 state parameter and correlates the callback with this member.
#[utoipa::path(
    get,
    path = "/bind/{provider}",
    tag = "auth",
    operation_id = "getAuthBind",
    params(
        ("provider" = String, Path, description = "Social provider key (google, kakao)")
    ),
    responses(
        (status = 200, description = "Bind redirect URL", body = BaseResponse<BindRedirectResponse>),
        (status = 400, description = "Unsupported provider"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn bind(
    State(state): State<AuthState>,
    auth: Authenticated,
    Path(provider): Path<String>,
) -> Result<Json<BaseResponse<BindRedirectResponse>>, PlatformError> {
    let provider = AuthProvider::from_key(&provider)
        .filter(AuthProvider::is_social)
        .ok_or(PlatformError::UnsupportedSocialProvider { provider })?;

    let bind_token = state.binding_store.issue(&auth.member_id);
    let redirect_url = format!(
        "{}/oauth2/authorization/{}?state={}",
        state.authorize_base_url,
        provider.key(),
        urlencoding::encode(&bind_token),
    );

    Ok(Json(BaseResponse::ok(BindRedirectResponse { redirect_url })))
}

/// Create the auth router
pub fn auth_router(state: AuthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(refresh))
        .routes(routes!(validate))
        .routes(routes!(roles))
        .routes(routes!(bind))
        .with_state(state)
}
