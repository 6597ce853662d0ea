//! Member API Endpoints
//!
//! Local account endpoints.
//! - POST /api/member/signup - Register a local account
//! - POST /api/member/login - Password-based login
//! - POST /api/member/logout - Clear the refresh session
//! - GET /api/member/me - Current member profile
//! - PUT /api/member/me - Update profile

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::token_service::TokenInfo;
use crate::member::entity::Member;
use crate::member::service::MemberService;
use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Signup request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub login_id: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
}

/// Member profile response, without credential fields
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub role: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            login_id: member.login_id,
            name: member.name,
            email: member.email,
            phone_number: member.phone_number,
            department: member.department,
            description: member.description,
            profile_image_url: member.profile_image_url,
            role: member.role,
        }
    }
}

/// Member endpoints state
#[derive(Clone)]
pub struct MembersState {
    pub member_service: Arc<MemberService>,
    /// Refresh cookie name (default: "refresh-token")
    pub refresh_cookie_name: String,
    /// Whether to set Secure flag on the refresh cookie
    pub refresh_cookie_secure: bool,
    /// Refresh cookie lifetime in seconds
    pub refresh_token_expiry_secs: i64,
}

impl MembersState {
    pub fn new(member_service: Arc<MemberService>) -> Self {
        Self {
            member_service,
            refresh_cookie_name: "refresh-token".to_string(),
            refresh_cookie_secure: true,
            refresh_token_expiry_secs: 604_800,
        }
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

    /// Refresh cookie with the standard attributes
    pub fn refresh_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.refresh_cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.refresh_cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.refresh_token_expiry_secs))
            .build()
    }

    /// Expired cookie that clears the refresh token in the browser
    pub fn clear_refresh_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.refresh_cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Register a local account
#[utoipa::path(
    post,
    path = "/signup",
    tag = "member",
    operation_id = "postMemberSignup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Member registered", body = BaseResponse<MemberResponse>),
        (status = 409, description = "Login id already in use")
    )
)]
pub async fn signup(
    State(state): State<MembersState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<BaseResponse<MemberResponse>>, PlatformError> {
    let member = state
        .member_service
        .signup(&req.login_id, &req.password, &req.name, req.email)
        .await?;
    Ok(Json(BaseResponse::ok(member.into())))
}

/// Login with login id and password
///
/// Returns a token pair and sets the refresh token as an HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = "member",
    operation_id = "postMemberLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = BaseResponse<TokenInfo>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<MembersState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, PlatformError> {
    let tokens = state
        .member_service
        .login(&req.login_id, &req.password)
        .await?;

    let jar = jar.add(state.refresh_cookie(tokens.refresh_token.clone()));
    Ok((jar, Json(BaseResponse::ok(tokens))))
}

/// Logout
///
/// Drops the refresh session and clears the refresh cookie. The access token
/// stays valid until it expires.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "member",
    operation_id = "postMemberLogout",
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout(
    State(state): State<MembersState>,
    jar: CookieJar,
    auth: Authenticated,
) -> Result<impl IntoResponse, PlatformError> {
    state.member_service.logout(&auth.member_id).await?;

    let jar = jar.add(state.clear_refresh_cookie());
    Ok((
        jar,
        (
            StatusCode::OK,
            Json(BaseResponse::success("logged out")),
        ),
    ))
}

/// Get current member profile
#[utoipa::path(
    get,
    path = "/me",
    tag = "member",
    operation_id = "getMemberMe",
    responses(
        (status = 200, description = "Current member", body = BaseResponse<MemberResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_info(
    State(state): State<MembersState>,
    auth: Authenticated,
) -> Result<Json<BaseResponse<MemberResponse>>, PlatformError> {
    let member = state.member_service.my_info(&auth.member_id).await?;
    Ok(Json(BaseResponse::ok(member.into())))
}

/// Update current member profile
#[utoipa::path(
    put,
    path = "/me",
    tag = "member",
    operation_id = "putMemberMe",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = BaseResponse<MemberResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<MembersState>,
    auth: Authenticated,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<BaseResponse<MemberResponse>>, PlatformError> {
    let member = state
        .member_service
        .update_profile(
            &auth.member_id,
            req.name,
            req.email,
            req.phone_number,
            req.department,
            req.description,
        )
        .await?;
    Ok(Json(BaseResponse::ok(member.into())))
}

/// Create the member router
pub fn member_router(state: MembersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signup))
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(my_info, update_profile))
        .with_state(state)
}
