//! Provider User Info Normalization
//!
//! Maps the provider-specific userinfo payloads into a single shape the
//! member service can work with.

use serde_json::{Map, Value};

use crate::member::entity::AuthProvider;
use crate::shared::error::{PlatformError, Result};

/// Normalized identity returned by a social provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2UserInfo {
    /// Provider-scoped stable id
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl OAuth2UserInfo {
    /// Extract the normalized identity from a provider userinfo response
    pub fn extract(provider: AuthProvider, attributes: &Map<String, Value>) -> Result<Self> {
        match provider {
            AuthProvider::Google => Ok(Self {
                id: require_string(attributes, "sub", provider)?,
                name: string_at(attributes, "name"),
                email: string_at(attributes, "email"),
                image_url: string_at(attributes, "picture"),
            }),
            AuthProvider::Kakao => {
                // Kakao nests everything under kakao_account / profile and
                // returns the id as a number
                let id = attributes
                    .get("id")
                    .and_then(value_to_string)
                    .ok_or_else(|| PlatformError::UnsupportedSocialProvider {
                        provider: format!("{} (missing id)", provider.key()),
                    })?;

                let account = attributes.get("kakao_account").and_then(Value::as_object);
                let profile = account
                    .and_then(|a| a.get("profile"))
                    .and_then(Value::as_object);

                Ok(Self {
                    id,
                    name: profile.and_then(|p| string_at(p, "nickname")),
                    email: account.and_then(|a| string_at(a, "email")),
                    image_url: profile.and_then(|p| string_at(p, "profile_image_url")),
                })
            }
            AuthProvider::Local => Err(PlatformError::UnsupportedSocialProvider {
                provider: provider.key().to_string(),
            }),
        }
    }

    /// Fallback display name used when the provider omits one
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

fn string_at(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn require_string(map: &Map<String, Value>, key: &str, provider: AuthProvider) -> Result<String> {
    string_at(map, key).ok_or_else(|| PlatformError::UnsupportedSocialProvider {
        provider: format!("{} (missing {})", provider.key(), key),
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_google_extraction() {
        let attrs = as_map(serde_json::json!({
            "sub": "108256430123456789",
            "name": "Alice Kim",
            "email": "alice@example.com",
            "picture": "https://lh3.example.com/photo.jpg"
        }));

        let info = OAuth2UserInfo::extract(AuthProvider::Google, &attrs).unwrap();
        assert_eq!(info.id, "108256430123456789");
        assert_eq!(info.name.as_deref(), Some("Alice Kim"));
        assert_eq!(info.email.as_deref(), Some("alice@example.com"));
        assert_eq!(info.image_url.as_deref(), Some("https://lh3.example.com/photo.jpg"));
    }

    #[test]
    fn test_google_missing_sub_fails() {
        let attrs = as_map(serde_json::json!({ "name": "Alice" }));
        assert!(OAuth2UserInfo::extract(AuthProvider::Google, &attrs).is_err());
    }

    #[test]
    fn test_kakao_extraction() {
        let attrs = as_map(serde_json::json!({
            "id": 2651234567u64,
            "kakao_account": {
                "email": "bob@kakao.example",
                "profile": {
                    "nickname": "bob",
                    "profile_image_url": "https://k.example.com/img.png"
                }
            }
        }));

        let info = OAuth2UserInfo::extract(AuthProvider::Kakao, &attrs).unwrap();
        assert_eq!(info.id, "2651234567");
        assert_eq!(info.name.as_deref(), Some("bob"));
        assert_eq!(info.email.as_deref(), Some("bob@kakao.example"));
        assert_eq!(info.image_url.as_deref(), Some("https://k.example.com/img.png"));
    }

    #[test]
    fn test_kakao_minimal_payload() {
        let attrs = as_map(serde_json::json!({ "id": 99 }));
        let info = OAuth2UserInfo::extract(AuthProvider::Kakao, &attrs).unwrap();
        assert_eq!(info.id, "99");
        assert!(info.name.is_none());
        assert!(info.email.is_none());
        assert_eq!(info.display_name(), "99");
    }

    #[test]
    fn test_local_provider_rejected() {
        let attrs = as_map(serde_json::json!({}));
        let err = OAuth2UserInfo::extract(AuthProvider::Local, &attrs).unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedSocialProvider { .. }));
    }

    #[test]
    fn test_display_name_prefers_name_then_email() {
        let info = OAuth2UserInfo {
            id: "1".into(),
            name: None,
            email: Some("x@y.z".into()),
            image_url: None,
        };
        assert_eq!(info.display_name(), "x@y.z");
    }
}
