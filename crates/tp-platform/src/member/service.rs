//! Member Service
//!
//! Account lifecycle: local signup and login, social login resolution, and
//! account binding. Successful logins mint a token pair and replace the
//! member's refresh session.

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::oauth_user_info::OAuth2UserInfo;
use crate::auth::password_service::PasswordService;
use crate::auth::refresh_session::RefreshSession;
use crate::auth::refresh_session_repository::RefreshSessionRepository;
use crate::auth::token_service::{TokenInfo, TokenService};
use crate::member::entity::{AuthProvider, Member, MemberAuthProvider};
use crate::member::repository::{MemberAuthProviderRepository, MemberRepository};
use crate::shared::error::{PlatformError, Result};

/// How an external identity relates to an existing member during binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// Already linked to the binding member; nothing to do
    AlreadyLinkedToSelf,
    /// Free to link
    LinkNew,
    /// Linked to a different member
    Conflict,
}

/// Decide what binding an external identity to `member_id` should do,
/// given the current owner of that identity (if any).
pub fn decide_bind_outcome(member_id: &str, existing_owner: Option<&str>) -> BindOutcome {
    match existing_owner {
        None => BindOutcome::LinkNew,
        Some(owner) if owner == member_id => BindOutcome::AlreadyLinkedToSelf,
        Some(_) => BindOutcome::Conflict,
    }
}

pub struct MemberService {
    members: Arc<MemberRepository>,
    auth_providers: Arc<MemberAuthProviderRepository>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
    refresh_sessions: Arc<RefreshSessionRepository>,
}

impl MemberService {
    pub fn new(
        members: Arc<MemberRepository>,
        auth_providers: Arc<MemberAuthProviderRepository>,
        passwords: Arc<PasswordService>,
        tokens: Arc<TokenService>,
        refresh_sessions: Arc<RefreshSessionRepository>,
    ) -> Self {
        Self {
            members,
            auth_providers,
            passwords,
            tokens,
            refresh_sessions,
        }
    }

    /// Register a local member. The login id must be unused.
    pub async fn signup(
        &self,
        login_id: &str,
        password: &str,
        name: &str,
        email: Option<String>,
    ) -> Result<Member> {
        if login_id.trim().is_empty() || name.trim().is_empty() {
            return Err(PlatformError::validation("loginId and name are required"));
        }

        if self.members.find_by_login_id(login_id).await?.is_some() {
            return Err(PlatformError::DuplicateLoginId {
                login_id: login_id.to_string(),
            });
        }

        let hash = self.passwords.hash_password(password)?;
        let mut member = Member::local(login_id, hash, name);
        member.email = email;
        self.members.insert(&member).await?;

        // record the local credential alongside any future social links
        let link = MemberAuthProvider::new(
            member.id.clone(),
            AuthProvider::Local,
            login_id,
            member.email.clone(),
        );
        self.auth_providers.insert(&link).await?;

        info!(member_id = %member.id, "member registered");
        Ok(member)
    }

    /// Local login. Lookup and verification failures both report as invalid
    /// credentials so login ids cannot be probed.
    pub async fn login(&self, login_id: &str, password: &str) -> Result<TokenInfo> {
        let member = self
            .members
            .find_by_login_id(login_id)
            .await?
            .ok_or(PlatformError::InvalidCredentials)?;

        let hash = member
            .password_hash
            .as_deref()
            .ok_or(PlatformError::InvalidCredentials)?;
        if !self.passwords.verify_password(password, hash)? {
            return Err(PlatformError::InvalidCredentials);
        }

        self.issue_session(&member).await
    }

    /// Drop the member's refresh session
    pub async fn logout(&self, member_id: &str) -> Result<()> {
        self.refresh_sessions.delete(member_id).await?;
        debug!(member_id = %member_id, "refresh session cleared");
        Ok(())
    }

    pub async fn my_info(&self, member_id: &str) -> Result<Member> {
        self.members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| PlatformError::MemberNotFound {
                id: member_id.to_string(),
            })
    }

    /// Update profile fields. Only provided fields change.
    pub async fn update_profile(
        &self,
        member_id: &str,
        name: Option<String>,
        email: Option<String>,
        phone_number: Option<String>,
        department: Option<String>,
        description: Option<String>,
    ) -> Result<Member> {
        let mut member = self.my_info(member_id).await?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(PlatformError::validation("name cannot be empty"));
            }
            member.name = name;
        }
        if let Some(email) = email {
            member.email = Some(email);
        }
        if let Some(phone_number) = phone_number {
            member.phone_number = Some(phone_number);
        }
        if let Some(department) = department {
            member.department = Some(department);
        }
        if let Some(description) = description {
            member.description = Some(description);
        }
        member.updated_at = chrono::Utc::now();

        self.members.update(&member).await?;
        Ok(member)
    }

    /// Resolve a social identity to a member, registering one on first login
    pub async fn resolve_external(
        &self,
        provider: AuthProvider,
        info: &OAuth2UserInfo,
    ) -> Result<Member> {
        if let Some(link) = self
            .auth_providers
            .find_by_provider_and_user_id(provider, &info.id)
            .await?
        {
            return self
                .members
                .find_by_id(&link.member_id)
                .await?
                .ok_or(PlatformError::MemberNotFound {
                    id: link.member_id,
                });
        }

        let member = Member::social(info.display_name(), info.email.clone(), info.image_url.clone());
        self.members.insert(&member).await?;

        let link =
            MemberAuthProvider::new(member.id.clone(), provider, &info.id, info.email.clone());
        self.auth_providers.insert(&link).await?;

        info!(member_id = %member.id, provider = provider.key(), "member registered via social login");
        Ok(member)
    }

    /// Link a social identity to an existing member, as correlated by a
    /// consumed bind token
    pub async fn bind_external(
        &self,
        member_id: &str,
        provider: AuthProvider,
        info: &OAuth2UserInfo,
    ) -> Result<Member> {
        let member = self.my_info(member_id).await?;

        let existing = self
            .auth_providers
            .find_by_provider_and_user_id(provider, &info.id)
            .await?;

        match decide_bind_outcome(member_id, existing.as_ref().map(|l| l.member_id.as_str())) {
            BindOutcome::AlreadyLinkedToSelf => Ok(member),
            BindOutcome::Conflict => Err(PlatformError::SocialAccountAlreadyLinked),
            BindOutcome::LinkNew => {
                let link =
                    MemberAuthProvider::new(member_id, provider, &info.id, info.email.clone());
                self.auth_providers.insert(&link).await?;
                info!(member_id = %member_id, provider = provider.key(), "social account linked");
                Ok(member)
            }
        }
    }

    /// Mint a token pair for a member and replace their refresh session
    pub async fn issue_session(&self, member: &Member) -> Result<TokenInfo> {
        let tokens = self.tokens.issue_token_pair(
            member.subject(),
            &member.id,
            &[member.role.clone()],
        )?;
        self.refresh_sessions
            .save(&RefreshSession::new(&member.id, &tokens.refresh_token))
            .await?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_outcome_unlinked() {
        assert_eq!(decide_bind_outcome("m1", None), BindOutcome::LinkNew);
    }

    #[test]
    fn test_bind_outcome_self() {
        assert_eq!(
            decide_bind_outcome("m1", Some("m1")),
            BindOutcome::AlreadyLinkedToSelf
        );
    }

    #[test]
    fn test_bind_outcome_conflict() {
        assert_eq!(decide_bind_outcome("m1", Some("m2")), BindOutcome::Conflict);
    }
}
