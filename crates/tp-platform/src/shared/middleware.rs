//! API Middleware
//!
//! Bearer token authentication middleware for Axum. A tower layer injects the
//! shared [`AppState`] into request extensions so the [`Authenticated`]
//! extractor can validate tokens without per-router state wiring.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::auth::token_service::{extract_bearer_token, TokenService};
use crate::shared::envelope::BaseResponse;
use crate::shared::error::PlatformError;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
}

/// Identity resolved from a validated access token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Member document id (the `userId` claim)
    pub member_id: String,
    /// Display subject (the `sub` claim)
    pub subject: String,
    /// Granted authorities, e.g. `ROLE_MEMBER`
    pub authorities: Vec<String>,
}

impl CurrentUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.iter().any(|a| a == role)
    }

    pub fn require_role(&self, role: &str) -> Result<(), PlatformError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(PlatformError::forbidden(format!(
                "Requires authority {}",
                role
            )))
        }
    }
}

/// Authenticated user extractor
/// Validates the bearer token and exposes the [`CurrentUser`] to handlers
pub struct Authenticated(pub CurrentUser);

impl std::ops::Deref for Authenticated {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error response for authentication failures
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = BaseResponse::<()>::error(
            "UNAUTHORIZED",
            self.message,
            self.status.as_u16(),
        );
        (self.status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // AppState is set by the AuthLayer wrapping the router
        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| AuthError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Token service not configured".to_string(),
        })?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(extract_bearer_token)
            .map(String::from)
            .ok_or_else(|| AuthError {
                status: StatusCode::UNAUTHORIZED,
                message: "Missing authentication token".to_string(),
            })?;

        let claims = app_state.token_service.decode(&token).map_err(|e| AuthError {
            status: StatusCode::UNAUTHORIZED,
            message: e.to_string(),
        })?;

        let member_id = claims.user_id.clone().ok_or_else(|| AuthError {
            status: StatusCode::UNAUTHORIZED,
            message: "Token carries no user id".to_string(),
        })?;

        let authorities = claims
            .auth
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.trim().to_string())
            .collect();

        Ok(Authenticated(CurrentUser {
            member_id,
            subject: claims.sub,
            authorities,
        }))
    }
}

/// Middleware layer that injects AppState into request extensions
/// This enables the Authenticated extractor to work
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Layer;
use tower::Service;

#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());

        let future = self.inner.call(req);
        Box::pin(async move { future.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(authorities: &[&str]) -> CurrentUser {
        CurrentUser {
            member_id: "m-1".to_string(),
            subject: "tester".to_string(),
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_require_role_ok() {
        let u = user(&["ROLE_MEMBER"]);
        assert!(u.require_role("ROLE_MEMBER").is_ok());
    }

    #[test]
    fn test_require_role_forbidden() {
        let u = user(&["ROLE_MEMBER"]);
        let err = u.require_role("ROLE_ADMIN").unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { .. }));
    }

    #[test]
    fn test_require_role_empty_authorities() {
        let u = user(&[]);
        assert!(u.require_role("ROLE_MEMBER").is_err());
    }
}
