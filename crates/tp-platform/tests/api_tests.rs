//! Platform API Integration Tests
//!
//! Tests for domain models, token lifecycle, and the auth flow pieces that
//! run without a database.

use tp_platform::auth::binding::BindingStore;
use tp_platform::auth::oauth_state::{AuthorizationRequestStore, StateParam};
use tp_platform::auth::oauth_user_info::OAuth2UserInfo;
use tp_platform::auth::token_service::{TokenConfig, TokenService};
use tp_platform::member::service::{decide_bind_outcome, BindOutcome};
use tp_platform::{AuthProvider, Member, Task, TaskStatus, TsidGenerator};

mod domain_tests {
    use super::*;

    #[test]
    fn test_social_member_has_no_credentials() {
        let member = Member::social("Alice Kim", Some("alice@example.com".into()), None);
        assert!(member.login_id.is_none());
        assert!(member.password_hash.is_none());
        assert!(!member.is_loginable(false));
        assert!(member.is_loginable(true));
    }

    #[test]
    fn test_local_member_is_loginable_without_links() {
        let member = Member::local("alice", "$argon2id$stub", "Alice");
        assert!(member.is_loginable(false));
    }

    #[test]
    fn test_member_ids_are_tsids() {
        let member = Member::social("Bob", None, None);
        assert_eq!(member.id.len(), 13);
        assert_ne!(member.id, TsidGenerator::generate());
    }

    #[test]
    fn test_task_completion_cycle() {
        let mut task = Task::new("m1", "p1", None, "Ship it");
        task.change_status(TaskStatus::Doing);
        task.change_status(TaskStatus::Done);
        assert_eq!(task.previous_status, Some(TaskStatus::Doing));

        task.reopen();
        assert_eq!(task.status, TaskStatus::Doing);
        assert!(task.previous_status.is_none());
    }
}

mod token_tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("integration-test-secret"))
    }

    #[test]
    fn test_token_pair_round_trip() {
        let svc = service();
        let pair = svc
            .issue_token_pair("alice", "m-1", &["ROLE_MEMBER".to_string()])
            .unwrap();
        assert_eq!(pair.grant_type, "Bearer");

        let claims = svc.decode(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user_id.as_deref(), Some("m-1"));

        // refresh token validates but carries no authorities
        assert!(svc.validate(&pair.refresh_token));
        assert!(svc.decode(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_rotation_threshold() {
        let svc = service();
        // a freshly issued refresh token is nowhere near the rotation window
        let refresh = svc.issue_refresh_token("alice", "m-1").unwrap();
        let remaining = svc.remaining_lifetime_secs(&refresh).unwrap();
        assert!(!svc.should_rotate(remaining));

        // a token inside its last day is rotated
        let stale = svc.issue_with_expiry("alice", "m-1", 3600).unwrap();
        let remaining = svc.remaining_lifetime_secs(&stale).unwrap();
        assert!(svc.should_rotate(remaining));
    }

    #[test]
    fn test_expired_token_is_rejected_but_decodable() {
        let svc = service();
        let token = svc.issue_with_expiry("alice", "m-1", -60).unwrap();
        assert!(!svc.validate(&token));
        assert!(svc.is_expired(&token));
    }
}

mod oauth_flow_tests {
    use super::*;

    #[test]
    fn test_bind_token_rides_through_state_param() {
        let binding_store = BindingStore::new();
        let request_store = AuthorizationRequestStore::new();

        // bind endpoint issues a token for the member
        let bind_token = binding_store.issue("m-42");
        assert!(BindingStore::is_bind_token(&bind_token));

        // authorization redirect folds it into the state parameter
        let csrf = request_store.issue(AuthProvider::Google);
        let state = StateParam::bind(bind_token.clone(), csrf.clone());
        let wire = state.encode();

        // callback parses it back out
        let parsed = StateParam::parse(&wire).unwrap();
        assert_eq!(parsed.bind_token.as_deref(), Some(bind_token.as_str()));
        assert_eq!(parsed.csrf, csrf);

        // both stores consume exactly once
        assert!(request_store.consume(&parsed.csrf).is_some());
        assert!(request_store.consume(&parsed.csrf).is_none());
        let entry = binding_store.consume(&bind_token).unwrap();
        assert_eq!(entry.member_id, "m-42");
        assert!(binding_store.consume(&bind_token).is_none());
    }

    #[test]
    fn test_plain_login_state_has_no_bind_token() {
        let request_store = AuthorizationRequestStore::new();
        let csrf = request_store.issue(AuthProvider::Kakao);
        let state = StateParam::login(csrf.clone());
        let parsed = StateParam::parse(&state.encode()).unwrap();
        assert!(parsed.bind_token.is_none());
        assert_eq!(parsed.csrf, csrf);
    }

    #[test]
    fn test_bind_outcomes() {
        assert_eq!(decide_bind_outcome("m-1", None), BindOutcome::LinkNew);
        assert_eq!(
            decide_bind_outcome("m-1", Some("m-1")),
            BindOutcome::AlreadyLinkedToSelf
        );
        assert_eq!(decide_bind_outcome("m-1", Some("m-2")), BindOutcome::Conflict);
    }

    #[test]
    fn test_userinfo_extraction_for_both_providers() {
        let google = serde_json::json!({
            "sub": "g-123",
            "name": "Alice",
            "email": "alice@gmail.example"
        });
        let info =
            OAuth2UserInfo::extract(AuthProvider::Google, google.as_object().unwrap()).unwrap();
        assert_eq!(info.id, "g-123");

        let kakao = serde_json::json!({
            "id": 777,
            "kakao_account": { "profile": { "nickname": "bob" } }
        });
        let info =
            OAuth2UserInfo::extract(AuthProvider::Kakao, kakao.as_object().unwrap()).unwrap();
        assert_eq!(info.id, "777");
        assert_eq!(info.name.as_deref(), Some("bob"));
    }
}

mod envelope_tests {
    use tp_platform::shared::envelope::BaseResponse;
    use tp_platform::TokenInfo;

    #[test]
    fn test_token_info_envelope_shape() {
        let body = BaseResponse::ok(TokenInfo::bearer(
            "access.jwt".to_string(),
            "refresh.jwt".to_string(),
        ));
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"resultCode\":\"SUCCESS\""));
        assert!(json.contains("\"grantType\":\"Bearer\""));
        assert!(json.contains("\"accessToken\":\"access.jwt\""));
        assert!(json.contains("\"refreshToken\":\"refresh.jwt\""));
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = BaseResponse::error("REFRESH_TOKEN_MISMATCH", "mismatch", 401);
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"resultCode\":\"REFRESH_TOKEN_MISMATCH\""));
        assert!(json.contains("\"httpStatus\":401"));
    }
}
