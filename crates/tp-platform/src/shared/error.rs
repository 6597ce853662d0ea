//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};

use crate::shared::envelope::BaseResponse;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Login id already in use: {login_id}")]
    DuplicateLoginId { login_id: String },

    #[error("Member not found: {id}")]
    MemberNotFound { id: String },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Refresh token missing from request")]
    RefreshTokenMissing,

    #[error("Invalid or expired refresh token")]
    RefreshTokenInvalid,

    #[error("No refresh session exists for this member")]
    RefreshTokenNotFound,

    #[error("Refresh token does not match the stored session")]
    RefreshTokenMismatch,

    #[error("Token carries no member id")]
    UserIdMissingInToken,

    #[error("Token validation failed: {message}")]
    TokenValidation { message: String },

    #[error("Invalid or expired binding request")]
    InvalidBindingRequest,

    #[error("Social account is already linked to another member")]
    SocialAccountAlreadyLinked,

    #[error("Unsupported social provider: {provider}")]
    UnsupportedSocialProvider { provider: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Failures raised inside the OAuth2 callback flow. The original typed
    /// cause is preserved so the failure handler can map it to a user-facing
    /// message instead of a generic provider error.
    #[error("OAuth2 login failed: {cause}")]
    OAuthFlow {
        #[source]
        cause: Box<PlatformError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn token_validation(message: impl Into<String>) -> Self {
        Self::TokenValidation { message: message.into() }
    }

    /// Wrap a failure crossing the OAuth2 callback boundary.
    pub fn oauth_flow(cause: PlatformError) -> Self {
        match cause {
            already @ PlatformError::OAuthFlow { .. } => already,
            other => Self::OAuthFlow { cause: Box::new(other) },
        }
    }

    /// Unwrap to the original typed cause, if this error was wrapped
    /// at the OAuth2 boundary.
    pub fn into_root_cause(self) -> PlatformError {
        match self {
            PlatformError::OAuthFlow { cause } => cause.into_root_cause(),
            other => other,
        }
    }

    /// Stable error code + HTTP status for the response envelope.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PlatformError::DuplicateLoginId { .. } => (StatusCode::CONFLICT, "DUPLICATE_LOGIN_ID"),
            PlatformError::MemberNotFound { .. } => (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND"),
            PlatformError::ProjectNotFound { .. } => (StatusCode::NOT_FOUND, "PROJECT_NOT_FOUND"),
            PlatformError::TaskNotFound { .. } => (StatusCode::NOT_FOUND, "TASK_NOT_FOUND"),
            PlatformError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            PlatformError::RefreshTokenMissing => (StatusCode::BAD_REQUEST, "REFRESH_TOKEN_MISSING"),
            PlatformError::RefreshTokenInvalid => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID"),
            PlatformError::RefreshTokenNotFound => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_NOT_FOUND"),
            PlatformError::RefreshTokenMismatch => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_MISMATCH"),
            PlatformError::UserIdMissingInToken => (StatusCode::UNAUTHORIZED, "USER_ID_MISSING_IN_TOKEN"),
            PlatformError::TokenValidation { .. } => (StatusCode::UNAUTHORIZED, "TOKEN_VALIDATION"),
            PlatformError::InvalidBindingRequest => (StatusCode::BAD_REQUEST, "INVALID_BINDING_REQUEST"),
            PlatformError::SocialAccountAlreadyLinked => (StatusCode::CONFLICT, "SOCIAL_ACCOUNT_ALREADY_LINKED"),
            PlatformError::UnsupportedSocialProvider { .. } => (StatusCode::BAD_REQUEST, "UNSUPPORTED_SOCIAL_PROVIDER"),
            PlatformError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PlatformError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            PlatformError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            PlatformError::RateLimitExceeded => (StatusCode::FORBIDDEN, "RATE_LIMIT_EXCEEDED"),
            PlatformError::OAuthFlow { cause } => cause.status_and_code(),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = BaseResponse::error(code, self.to_string(), status.as_u16());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let (status, code) = PlatformError::DuplicateLoginId { login_id: "alice".into() }.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "DUPLICATE_LOGIN_ID");

        let (status, code) = PlatformError::SocialAccountAlreadyLinked.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "SOCIAL_ACCOUNT_ALREADY_LINKED");

        let (status, _) = PlatformError::InvalidBindingRequest.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_oauth_flow_unwraps_to_cause() {
        let wrapped = PlatformError::oauth_flow(PlatformError::SocialAccountAlreadyLinked);
        let (status, code) = wrapped.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "SOCIAL_ACCOUNT_ALREADY_LINKED");

        match wrapped.into_root_cause() {
            PlatformError::SocialAccountAlreadyLinked => {}
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn test_oauth_flow_does_not_double_wrap() {
        let wrapped = PlatformError::oauth_flow(PlatformError::oauth_flow(PlatformError::InvalidBindingRequest));
        match wrapped {
            PlatformError::OAuthFlow { cause } => {
                assert!(matches!(*cause, PlatformError::InvalidBindingRequest));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
