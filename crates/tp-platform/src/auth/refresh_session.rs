//! Refresh Session Entity
//!
//! One refresh session per member. The member id doubles as the document id,
//! so a fresh login always replaces the previous session and only one refresh
//! token is ever valid per member.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Refresh session entity, keyed by member id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSession {
    /// Member id as primary key (single session per member)
    #[serde(rename = "_id")]
    pub member_id: String,

    /// SHA-256 hash of the refresh token currently accepted for this member
    pub token_hash: String,

    /// When the session was last written
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Build a session from the raw refresh token. Only the hash is stored.
    pub fn new(member_id: impl Into<String>, refresh_token: &str) -> Self {
        Self {
            member_id: member_id.into(),
            token_hash: Self::hash_token(refresh_token),
            updated_at: Utc::now(),
        }
    }

    /// Hash a raw token for storage
    pub fn hash_token(raw_token: &str) -> String {
        use base64::Engine;
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(raw_token.as_bytes());
        let hash = hasher.finalize();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
    }

    /// Whether the presented raw token matches the stored hash
    pub fn matches(&self, presented: &str) -> bool {
        self.token_hash == Self::hash_token(presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let session = RefreshSession::new("m1", "token-a");
        assert!(session.matches("token-a"));
        assert!(!session.matches("token-b"));
    }

    #[test]
    fn test_token_not_stored_raw() {
        let session = RefreshSession::new("m1", "token-a");
        assert_ne!(session.token_hash, "token-a");
        assert_eq!(session.token_hash, RefreshSession::hash_token("token-a"));
    }
}
