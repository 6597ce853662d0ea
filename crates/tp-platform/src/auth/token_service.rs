//! Token Service
//!
//! HS256 JWT issuing and validation. Access tokens carry the member id in a
//! `userId` claim and the comma-joined authorities in `auth`; refresh tokens
//! carry only `sub` and the standard time claims.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::error::{PlatformError, Result};

/// Claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Display subject (member name or login id)
    pub sub: String,

    /// Comma-joined authorities, absent on refresh tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Member document id
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Access + refresh token pair handed to clients
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub grant_type: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenInfo {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            grant_type: "Bearer".to_string(),
            access_token,
            refresh_token,
        }
    }
}

/// Token lifetimes and signing secret
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret_key: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    /// Refresh responses mint a new refresh token when the presented one has
    /// less than this many seconds of life left
    pub rotate_below_secs: i64,
}

impl TokenConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_token_expiry_secs: 3600,
            refresh_token_expiry_secs: 604_800,
            rotate_below_secs: 86_400,
        }
    }
}

/// Issues and validates HS256 JWTs
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            config,
        }
    }

    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }

    /// Issue an access token for a member
    pub fn issue_access_token(
        &self,
        subject: &str,
        member_id: &str,
        authorities: &[String],
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            auth: Some(authorities.join(",")),
            user_id: Some(member_id.to_string()),
            iat: now,
            exp: now + self.config.access_token_expiry_secs,
        };
        self.encode(&claims)
    }

    /// Issue a refresh token. It carries the member id so a new access token
    /// can be minted from it alone.
    pub fn issue_refresh_token(&self, subject: &str, member_id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            auth: None,
            user_id: Some(member_id.to_string()),
            iat: now,
            exp: now + self.config.refresh_token_expiry_secs,
        };
        self.encode(&claims)
    }

    /// Issue a fresh access + refresh pair
    pub fn issue_token_pair(
        &self,
        subject: &str,
        member_id: &str,
        authorities: &[String],
    ) -> Result<TokenInfo> {
        let access = self.issue_access_token(subject, member_id, authorities)?;
        let refresh = self.issue_refresh_token(subject, member_id)?;
        Ok(TokenInfo::bearer(access, refresh))
    }

    /// Issue a token with an explicit expiry offset, for expiry tests
    pub fn issue_with_expiry(
        &self,
        subject: &str,
        member_id: &str,
        expires_in_secs: i64,
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            auth: Some("ROLE_MEMBER".to_string()),
            user_id: Some(member_id.to_string()),
            iat: now,
            exp: now + expires_in_secs,
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| PlatformError::token_validation(format!("Failed to sign token: {}", e)))
    }

    /// HS256 validation with no expiry leeway. jsonwebtoken defaults to a
    /// 60 s grace window, which would let expired tokens pass for a minute.
    fn strict_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }

    /// Check signature and expiry without surfacing the failure reason
    pub fn validate(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match decode::<TokenClaims>(token, &self.decoding_key, &Self::strict_validation()) {
            Ok(_) => true,
            Err(e) => {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("token rejected: expired"),
                    ErrorKind::InvalidSignature => debug!("token rejected: bad signature"),
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        debug!("token rejected: wrong algorithm")
                    }
                    _ => debug!("token rejected: malformed"),
                }
                false
            }
        }
    }

    /// Decode an access token into its claims. The `userId` and `auth` claims
    /// must both be present.
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        let claims = self.decode_claims(token)?;
        if claims.user_id.is_none() {
            return Err(PlatformError::UserIdMissingInToken);
        }
        if claims.auth.is_none() {
            return Err(PlatformError::token_validation("Token carries no authorities"));
        }
        Ok(claims)
    }

    /// Decode any token into its claims, requiring only signature + expiry
    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &Self::strict_validation())
            .map_err(|e| PlatformError::token_validation(format!("Invalid token: {}", e)))?;
        Ok(data.claims)
    }

    /// Whether the token has passed its expiry. Signature failures also
    /// report as expired so callers treat bad tokens uniformly.
    pub fn is_expired(&self, token: &str) -> bool {
        let mut validation = Self::strict_validation();
        validation.validate_exp = false;
        match decode::<TokenClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims.exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// Member id from a token, if present
    pub fn user_id(&self, token: &str) -> Result<String> {
        let claims = self.decode_claims(token)?;
        claims.user_id.ok_or(PlatformError::UserIdMissingInToken)
    }

    /// Seconds until the token expires, zero if already past
    pub fn remaining_lifetime_secs(&self, token: &str) -> Result<i64> {
        let claims = self.decode_claims(token)?;
        Ok((claims.exp - Utc::now().timestamp()).max(0))
    }

    /// A refresh token is rotated once it drops below the configured window
    pub fn should_rotate(&self, remaining_secs: i64) -> bool {
        remaining_secs < self.config.rotate_below_secs
    }
}

/// Extract token from "Bearer <token>" header value
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret-key-for-unit-tests"))
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let token = svc
            .issue_access_token("alice", "01HZX0000000A", &["ROLE_MEMBER".to_string()])
            .unwrap();

        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user_id.as_deref(), Some("01HZX0000000A"));
        assert_eq!(claims.auth.as_deref(), Some("ROLE_MEMBER"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_has_no_authorities() {
        let svc = service();
        let token = svc.issue_refresh_token("alice", "01HZX0000000A").unwrap();

        let claims = svc.decode_claims(&token).unwrap();
        assert!(claims.auth.is_none());
        assert_eq!(claims.user_id.as_deref(), Some("01HZX0000000A"));

        // decode() requires the auth claim
        assert!(svc.decode(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_tampered_token() {
        let svc = service();
        let token = svc
            .issue_access_token("alice", "m1", &["ROLE_MEMBER".to_string()])
            .unwrap();
        assert!(svc.validate(&token));

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(!svc.validate(&tampered));
        assert!(!svc.validate(""));
    }

    #[test]
    fn test_validate_rejects_foreign_secret() {
        let svc = service();
        let other = TokenService::new(TokenConfig::new("a-different-secret"));
        let token = other
            .issue_access_token("alice", "m1", &["ROLE_MEMBER".to_string()])
            .unwrap();
        assert!(!svc.validate(&token));
    }

    #[test]
    fn test_no_grace_window_after_expiry() {
        let svc = service();
        // expired seconds ago, well inside jsonwebtoken's default 60 s leeway
        let dead = svc.issue_with_expiry("alice", "m1", -10).unwrap();
        assert!(!svc.validate(&dead));
        assert!(svc.decode_claims(&dead).is_err());
    }

    #[test]
    fn test_is_expired() {
        let svc = service();
        let live = svc.issue_with_expiry("alice", "m1", 3600).unwrap();
        assert!(!svc.is_expired(&live));

        let dead = svc.issue_with_expiry("alice", "m1", -10).unwrap();
        assert!(svc.is_expired(&dead));
        assert!(!svc.validate(&dead));
    }

    #[test]
    fn test_rotation_window() {
        let svc = service();
        assert!(svc.should_rotate(86_399));
        assert!(!svc.should_rotate(86_400));
        assert!(!svc.should_rotate(604_800));
    }

    #[test]
    fn test_remaining_lifetime() {
        let svc = service();
        let token = svc.issue_with_expiry("alice", "m1", 500).unwrap();
        let remaining = svc.remaining_lifetime_secs(&token).unwrap();
        assert!(remaining > 490 && remaining <= 500);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }
}
