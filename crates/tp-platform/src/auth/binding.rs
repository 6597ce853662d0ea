//! Account Binding Correlation
//!
//! Short-lived single-use tokens that correlate an OAuth2 callback with the
//! logged-in member who started an account-binding flow. Entries live in
//! process memory; losing them on restart only forces the user to restart
//! the bind flow.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Prefix distinguishing bind tokens from plain CSRF state values
pub const TOKEN_PREFIX: &str = "bind:";

/// Default entry lifetime: 3 minutes
const DEFAULT_TTL_SECS: i64 = 180;

/// A pending bind started by an authenticated member
#[derive(Debug, Clone)]
pub struct BindingRequest {
    pub member_id: String,
    pub issued_at: DateTime<Utc>,
}

/// In-memory store of pending binds, keyed by the full bind token
pub struct BindingStore {
    entries: DashMap<String, BindingRequest>,
    ttl: Duration,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Issue a bind token for a member. The token is opaque to clients and
    /// rides through the provider unchanged in the OAuth2 `state` parameter.
    pub fn issue(&self, member_id: impl Into<String>) -> String {
        let token = format!("{}{}", TOKEN_PREFIX, Uuid::new_v4());
        self.entries.insert(
            token.clone(),
            BindingRequest {
                member_id: member_id.into(),
                issued_at: Utc::now(),
            },
        );
        token
    }

    /// Consume a bind token. Removal happens before the age check so a token
    /// is spent exactly once even under concurrent callbacks.
    pub fn consume(&self, token: &str) -> Option<BindingRequest> {
        let (_, entry) = self.entries.remove(token)?;
        if Utc::now() - entry.issued_at > self.ttl {
            return None;
        }
        Some(entry)
    }

    /// Whether a state value is a bind token rather than a bare CSRF value
    pub fn is_bind_token(state: &str) -> bool {
        state.starts_with(TOKEN_PREFIX)
    }

    /// Drop entries past their lifetime. Called opportunistically; consume
    /// already rejects stale entries, this just bounds memory.
    pub fn sweep_expired(&self) {
        let cutoff = Utc::now() - self.ttl;
        self.entries.retain(|_, entry| entry.issued_at >= cutoff);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_consume() {
        let store = BindingStore::new();
        let token = store.issue("m1");
        assert!(token.starts_with("bind:"));
        assert!(BindingStore::is_bind_token(&token));

        let entry = store.consume(&token).unwrap();
        assert_eq!(entry.member_id, "m1");
    }

    #[test]
    fn test_single_use() {
        let store = BindingStore::new();
        let token = store.issue("m1");
        assert!(store.consume(&token).is_some());
        assert!(store.consume(&token).is_none());
    }

    #[test]
    fn test_unknown_token() {
        let store = BindingStore::new();
        assert!(store.consume("bind:does-not-exist").is_none());
    }

    #[test]
    fn test_expired_entry_rejected() {
        let store = BindingStore::with_ttl(Duration::seconds(-1));
        let token = store.issue("m1");
        assert!(store.consume(&token).is_none());
        // consumed even though expired
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_sweep_expired() {
        let store = BindingStore::with_ttl(Duration::seconds(-1));
        store.issue("m1");
        store.issue("m2");
        store.sweep_expired();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = BindingStore::new();
        assert_ne!(store.issue("m1"), store.issue("m1"));
    }
}
