//! OAuth2 Authorization State
//!
//! CSRF protection for the OAuth2 login flow. Each authorization redirect
//! issues a random CSRF value; the callback must present it back. Bind tokens
//! are folded into the same `state` parameter as `bind:<uuid>|<csrf>`.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;

use crate::auth::binding::TOKEN_PREFIX;
use crate::member::entity::AuthProvider;

/// Default entry lifetime: 10 minutes
const DEFAULT_TTL_SECS: i64 = 600;

/// A pending authorization redirect awaiting its callback
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

/// In-memory store of pending authorization requests, keyed by CSRF value
pub struct AuthorizationRequestStore {
    entries: DashMap<String, AuthorizationRequest>,
    ttl: Duration,
}

impl AuthorizationRequestStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Record a pending authorization and return its CSRF value
    pub fn issue(&self, provider: AuthProvider) -> String {
        let csrf = random_csrf();
        self.entries.insert(
            csrf.clone(),
            AuthorizationRequest {
                provider,
                created_at: Utc::now(),
            },
        );
        csrf
    }

    /// Consume a CSRF value. Single-use: removal precedes the age check.
    pub fn consume(&self, csrf: &str) -> Option<AuthorizationRequest> {
        let (_, entry) = self.entries.remove(csrf)?;
        if Utc::now() - entry.created_at > self.ttl {
            return None;
        }
        Some(entry)
    }

    pub fn sweep_expired(&self) {
        let cutoff = Utc::now() - self.ttl;
        self.entries.retain(|_, entry| entry.created_at >= cutoff);
    }
}

impl Default for AuthorizationRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

fn random_csrf() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// The OAuth2 `state` parameter, either a bare CSRF value or a bind token
/// glued to one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateParam {
    pub bind_token: Option<String>,
    pub csrf: String,
}

impl StateParam {
    pub fn login(csrf: impl Into<String>) -> Self {
        Self {
            bind_token: None,
            csrf: csrf.into(),
        }
    }

    pub fn bind(bind_token: impl Into<String>, csrf: impl Into<String>) -> Self {
        Self {
            bind_token: Some(bind_token.into()),
            csrf: csrf.into(),
        }
    }

    /// Render for the provider round trip: `bind:<uuid>|<csrf>` or bare csrf
    pub fn encode(&self) -> String {
        match &self.bind_token {
            Some(token) => format!("{}|{}", token, self.csrf),
            None => self.csrf.clone(),
        }
    }

    /// Parse a state value returned by the provider
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with(TOKEN_PREFIX) {
            let (token, csrf) = raw.split_once('|')?;
            if csrf.is_empty() {
                return None;
            }
            Some(Self::bind(token, csrf))
        } else {
            Some(Self::login(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_single_use() {
        let store = AuthorizationRequestStore::new();
        let csrf = store.issue(AuthProvider::Google);

        let entry = store.consume(&csrf).unwrap();
        assert_eq!(entry.provider, AuthProvider::Google);
        assert!(store.consume(&csrf).is_none());
    }

    #[test]
    fn test_store_rejects_expired() {
        let store = AuthorizationRequestStore::with_ttl(Duration::seconds(-1));
        let csrf = store.issue(AuthProvider::Kakao);
        assert!(store.consume(&csrf).is_none());
    }

    #[test]
    fn test_csrf_values_differ() {
        assert_ne!(random_csrf(), random_csrf());
    }

    #[test]
    fn test_state_round_trip_login() {
        let state = StateParam::login("abc123");
        assert_eq!(state.encode(), "abc123");
        assert_eq!(StateParam::parse("abc123"), Some(state));
    }

    #[test]
    fn test_state_round_trip_bind() {
        let state = StateParam::bind("bind:550e8400-e29b-41d4-a716-446655440000", "csrf-v");
        let encoded = state.encode();
        assert_eq!(encoded, "bind:550e8400-e29b-41d4-a716-446655440000|csrf-v");
        assert_eq!(StateParam::parse(&encoded), Some(state));
    }

    #[test]
    fn test_state_parse_rejects_malformed_bind() {
        // bind prefix without the csrf half
        assert!(StateParam::parse("bind:550e8400").is_none());
        assert!(StateParam::parse("bind:550e8400|").is_none());
        assert!(StateParam::parse("").is_none());
    }
}
