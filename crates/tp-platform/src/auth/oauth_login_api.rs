//! OAuth2 Login Endpoints
//!
//! Browser-facing social login flow.
//! - GET /oauth2/authorization/{provider} - Redirect the browser to the provider
//! - GET /login/oauth2/code/{provider} - Provider callback
//!
//! The callback serves three cases from one code path: first-time social
//! login (registers a member), repeat login, and account binding when the
//! state parameter carries a bind token.

use axum::{
    extract::{Path, Query, State},
    http::{header::ACCEPT, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::binding::{BindingRequest, BindingStore};
use crate::auth::oauth_state::{AuthorizationRequestStore, StateParam};
use crate::auth::oauth_user_info::OAuth2UserInfo;
use crate::auth::oidc_client::OidcClient;
use crate::member::entity::{AuthProvider, Member};
use crate::member::service::MemberService;
use crate::shared::envelope::BaseResponse;
use crate::shared::error::{PlatformError, Result};

/// OAuth2 login endpoints state
#[derive(Clone)]
pub struct OAuthLoginState {
    pub oidc_client: Arc<OidcClient>,
    pub request_store: Arc<AuthorizationRequestStore>,
    pub binding_store: Arc<BindingStore>,
    pub member_service: Arc<MemberService>,
    /// Frontend base URL the browser returns to after login
    pub client_base_url: String,
    /// Frontend URL for login failures
    pub failure_url: String,
    pub refresh_cookie_name: String,
    pub refresh_cookie_secure: bool,
    pub refresh_token_expiry_secs: i64,
}

impl OAuthLoginState {
    pub fn new(
        oidc_client: Arc<OidcClient>,
        request_store: Arc<AuthorizationRequestStore>,
        binding_store: Arc<BindingStore>,
        member_service: Arc<MemberService>,
        client_base_url: &str,
        failure_url: &str,
    ) -> Self {
        Self {
            oidc_client,
            request_store,
            binding_store,
            member_service,
            client_base_url: client_base_url.trim_end_matches('/').to_string(),
            failure_url: failure_url.to_string(),
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

    fn refresh_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.refresh_cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.refresh_cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.refresh_token_expiry_secs))
            .build()
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthorizationParams {
    /// Optional bind token handed out by the bind endpoint
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Redirect the browser to the provider's authorization endpoint
pub async fn authorize(
    State(state): State<OAuthLoginState>,
    Path(provider): Path<String>,
    Query(params): Query<AuthorizationParams>,
) -> Result<Redirect> {
    let provider = AuthProvider::from_key(&provider)
        .filter(AuthProvider::is_social)
        .ok_or(PlatformError::UnsupportedSocialProvider { provider })?;

    let csrf = state.request_store.issue(provider);
    let state_param = match params.state.filter(|s| BindingStore::is_bind_token(s)) {
        Some(bind_token) => StateParam::bind(bind_token, csrf),
        None => StateParam::login(csrf),
    };

    let url = state
        .oidc_client
        .build_authorization_url(provider, &state_param.encode())?;
    Ok(Redirect::to(&url))
}

/// Provider callback. Completes login or binding and sends the browser back
/// to the frontend.
pub async fn callback(
    State(state): State<OAuthLoginState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    match run_callback(&state, &provider, &params).await {
        Ok((jar, redirect_url)) => (jar, Redirect::to(&redirect_url)).into_response(),
        Err(err) => callback_failure(&state, &headers, err),
    }
}

async fn run_callback(
    state: &OAuthLoginState,
    provider: &str,
    params: &CallbackParams,
) -> Result<(CookieJar, String)> {
    let provider = AuthProvider::from_key(provider)
        .filter(AuthProvider::is_social)
        .ok_or_else(|| PlatformError::UnsupportedSocialProvider {
            provider: provider.to_string(),
        })?;

    let state_param = StateParam::parse(&params.state)
        .ok_or_else(|| PlatformError::validation("Malformed state parameter"))?;

    // CSRF check: the callback must present the value we issued
    let pending = state
        .request_store
        .consume(&state_param.csrf)
        .ok_or_else(|| PlatformError::validation("Unknown or expired authorization request"))?;
    if pending.provider != provider {
        return Err(PlatformError::validation(
            "Authorization request was started for a different provider",
        ));
    }

    // The bind correlation is single-use no matter how the callback ends;
    // consume it before the provider round-trip so a failed exchange cannot
    // leave a live entry behind.
    let binding = take_binding_entry(&state.binding_store, &state_param)?;

    let access_token = state
        .oidc_client
        .exchange_code(provider, &params.code)
        .await
        .map_err(PlatformError::oauth_flow)?;
    let attributes = state
        .oidc_client
        .fetch_user_info(provider, &access_token)
        .await
        .map_err(PlatformError::oauth_flow)?;
    let info = OAuth2UserInfo::extract(provider, &attributes)?;

    let member = resolve_member(state, provider, binding, &info)
        .await
        .map_err(PlatformError::oauth_flow)?;

    let tokens = state.member_service.issue_session(&member).await?;

    info!(member_id = %member.id, provider = provider.key(), "social login completed");

    let jar = CookieJar::new().add(state.refresh_cookie(tokens.refresh_token.clone()));
    let redirect_url = format!(
        "{}/oauth/callback?accessToken={}",
        state.client_base_url,
        urlencoding::encode(&tokens.access_token),
    );
    Ok((jar, redirect_url))
}

/// Consume the bind correlation named by the state parameter, if any.
/// A bind token without a live entry fails the callback outright.
fn take_binding_entry(
    store: &BindingStore,
    state_param: &StateParam,
) -> Result<Option<BindingRequest>> {
    state_param
        .bind_token
        .as_deref()
        .map(|token| store.consume(token).ok_or(PlatformError::InvalidBindingRequest))
        .transpose()
}

/// Pick the login or binding branch based on the consumed correlation
async fn resolve_member(
    state: &OAuthLoginState,
    provider: AuthProvider,
    binding: Option<BindingRequest>,
    info: &OAuth2UserInfo,
) -> Result<Member> {
    match binding {
        Some(entry) => {
            state
                .member_service
                .bind_external(&entry.member_id, provider, info)
                .await
        }
        None => state.member_service.resolve_external(provider, info).await,
    }
}

/// Render a callback failure. API clients asking for JSON get the error
/// envelope; browsers are redirected to the frontend failure page.
fn callback_failure(state: &OAuthLoginState, headers: &HeaderMap, err: PlatformError) -> Response {
    let cause = err.into_root_cause();
    let (status, code) = cause.status_and_code();
    let message = cause.to_string();
    warn!(code = code, "social login failed: {}", message);

    let wants_json = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false);

    if wants_json {
        let body = BaseResponse::<()>::error(code, message, status.as_u16());
        (status, Json(body)).into_response()
    } else {
        let url = format!(
            "{}?error={}",
            state.failure_url,
            urlencoding::encode(&message)
        );
        Redirect::to(&url).into_response()
    }
}

/// Create the OAuth2 login router. These endpoints are browser redirect
/// targets, not documented API surface, so this is a plain router.
pub fn oauth_login_router(state: OAuthLoginState) -> Router {
    Router::new()
        .route(
            "/oauth2/authorization/{provider}",
            axum::routing::get(authorize),
        )
        .route(
            "/login/oauth2/code/{provider}",
            axum::routing::get(callback),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth_state::StateParam;

    #[test]
    fn test_binding_entry_consumed_once() {
        let store = BindingStore::new();
        let token = store.issue("m-7");
        let state = StateParam::bind(token, "csrf".to_string());

        let entry = take_binding_entry(&store, &state).unwrap().unwrap();
        assert_eq!(entry.member_id, "m-7");

        // the entry is gone even though no provider exchange happened
        assert!(matches!(
            take_binding_entry(&store, &state),
            Err(PlatformError::InvalidBindingRequest)
        ));
    }

    #[test]
    fn test_login_state_has_no_binding_entry() {
        let store = BindingStore::new();
        let state = StateParam::login("csrf".to_string());
        assert!(take_binding_entry(&store, &state).unwrap().is_none());
    }
}
