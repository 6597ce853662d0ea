//! Member Entities
//!
//! Members and their linked authentication providers. A member created
//! through a social login has no local credentials until a login id and
//! password are set; a local member can additionally link social accounts.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::tsid::TsidGenerator;

pub const DEFAULT_ROLE: &str = "ROLE_MEMBER";

/// Authentication provider for a member credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthProvider {
    Local,
    Google,
    Kakao,
}

impl AuthProvider {
    /// URL path key, as used in `/oauth2/authorization/{provider}`
    pub fn key(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Google => "google",
            AuthProvider::Kakao => "kakao",
        }
    }

    /// Parse a URL path key, case-insensitively
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "local" => Some(AuthProvider::Local),
            "google" => Some(AuthProvider::Google),
            "kakao" => Some(AuthProvider::Kakao),
            _ => None,
        }
    }

    /// Providers a browser can be sent to for login
    pub fn is_social(&self) -> bool {
        !matches!(self, AuthProvider::Local)
    }
}

/// Member entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// TSID as primary key
    #[serde(rename = "_id")]
    pub id: String,

    /// Local login id, absent for social-only members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,

    /// Argon2id hash, absent for social-only members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Display name
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

    /// Granted authority, e.g. ROLE_MEMBER
    pub role: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a local member with credentials
    pub fn local(
        login_id: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            login_id: Some(login_id.into()),
            password_hash: Some(password_hash.into()),
            name: name.into(),
            email: None,
            phone_number: None,
            department: None,
            description: None,
            profile_image_url: None,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a member from a social identity, with no local credentials
    pub fn social(
        name: impl Into<String>,
        email: Option<String>,
        profile_image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            login_id: None,
            password_hash: None,
            name: name.into(),
            email,
            phone_number: None,
            department: None,
            description: None,
            profile_image_url,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the member has any way to sign in: local credentials, or at
    /// least one linked social account.
    pub fn is_loginable(&self, has_external_account: bool) -> bool {
        (self.login_id.is_some() && self.password_hash.is_some()) || has_external_account
    }

    /// Display subject used in token claims
    pub fn subject(&self) -> &str {
        &self.name
    }
}

/// Link between a member and a social provider identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAuthProvider {
    /// TSID as primary key
    #[serde(rename = "_id")]
    pub id: String,

    pub member_id: String,

    pub provider: AuthProvider,

    /// Provider-scoped stable user id
    pub provider_user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl MemberAuthProvider {
    pub fn new(
        member_id: impl Into<String>,
        provider: AuthProvider,
        provider_user_id: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            member_id: member_id.into(),
            provider,
            provider_user_id: provider_user_id.into(),
            email,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_keys() {
        assert_eq!(AuthProvider::Google.key(), "google");
        assert_eq!(AuthProvider::from_key("GOOGLE"), Some(AuthProvider::Google));
        assert_eq!(AuthProvider::from_key("kakao"), Some(AuthProvider::Kakao));
        assert_eq!(AuthProvider::from_key("github"), None);
    }

    #[test]
    fn test_provider_serializes_screaming_snake() {
        let json = serde_json::to_string(&AuthProvider::Kakao).unwrap();
        assert_eq!(json, "\"KAKAO\"");
    }

    #[test]
    fn test_local_member_is_loginable() {
        let member = Member::local("alice", "$argon2id$stub", "Alice");
        assert!(member.is_loginable(false));
    }

    #[test]
    fn test_social_member_needs_external_account() {
        let member = Member::social("Bob", None, None);
        assert!(!member.is_loginable(false));
        assert!(member.is_loginable(true));
    }

    #[test]
    fn test_default_role() {
        let member = Member::social("Bob", None, None);
        assert_eq!(member.role, "ROLE_MEMBER");
    }
}
