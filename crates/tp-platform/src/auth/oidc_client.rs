//! OAuth2 Provider Client
//!
//! Builds authorization URLs and performs the code exchange and userinfo
//! calls against Google and Kakao.

use serde::Deserialize;
use std::time::Duration;

use crate::member::entity::AuthProvider;
use crate::shared::error::{PlatformError, Result};

const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPE: &str = "openid profile email";

const KAKAO_AUTHORIZATION_ENDPOINT: &str = "https://kauth.kakao.com/oauth/authorize";
const KAKAO_TOKEN_ENDPOINT: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_USERINFO_ENDPOINT: &str = "https://kapi.kakao.com/v2/user/me";
const KAKAO_SCOPE: &str = "profile_nickname profile_image account_email";

/// Endpoints and credentials for one provider
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl ProviderEndpoints {
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            authorization_endpoint: GOOGLE_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: GOOGLE_SCOPE.to_string(),
        }
    }

    pub fn kakao(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            authorization_endpoint: KAKAO_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: KAKAO_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: KAKAO_USERINFO_ENDPOINT.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: KAKAO_SCOPE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
}

/// OAuth2 client over the configured providers
pub struct OidcClient {
    http: reqwest::Client,
    /// Public base URL this service is reachable on, used to build redirect URIs
    redirect_base_url: String,
    google: Option<ProviderEndpoints>,
    kakao: Option<ProviderEndpoints>,
}

impl OidcClient {
    pub fn new(redirect_base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            redirect_base_url: redirect_base_url.into(),
            google: None,
            kakao: None,
        }
    }

    pub fn with_google(mut self, endpoints: ProviderEndpoints) -> Self {
        self.google = Some(endpoints);
        self
    }

    pub fn with_kakao(mut self, endpoints: ProviderEndpoints) -> Self {
        self.kakao = Some(endpoints);
        self
    }

    fn endpoints(&self, provider: AuthProvider) -> Result<&ProviderEndpoints> {
        let endpoints = match provider {
            AuthProvider::Google => self.google.as_ref(),
            AuthProvider::Kakao => self.kakao.as_ref(),
            AuthProvider::Local => None,
        };
        endpoints.ok_or_else(|| PlatformError::UnsupportedSocialProvider {
            provider: provider.key().to_string(),
        })
    }

    /// Redirect URI registered with the provider
    pub fn redirect_uri(&self, provider: AuthProvider) -> String {
        format!(
            "{}/login/oauth2/code/{}",
            self.redirect_base_url.trim_end_matches('/'),
            provider.key()
        )
    }

    /// Build the authorization URL the browser is redirected to
    pub fn build_authorization_url(&self, provider: AuthProvider, state: &str) -> Result<String> {
        let endpoints = self.endpoints(provider)?;
        Ok(format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            endpoints.authorization_endpoint,
            urlencoding::encode(&endpoints.client_id),
            urlencoding::encode(&self.redirect_uri(provider)),
            urlencoding::encode(&endpoints.scope),
            urlencoding::encode(state),
        ))
    }

    /// Exchange the authorization code for a provider access token
    pub async fn exchange_code(&self, provider: AuthProvider, code: &str) -> Result<String> {
        let endpoints = self.endpoints(provider)?;
        let redirect_uri = self.redirect_uri(provider);

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", endpoints.client_id.as_str()),
            ("client_secret", endpoints.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&endpoints.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                PlatformError::internal(format!("Token endpoint request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::unauthorized(format!(
                "Token exchange rejected ({}): {}",
                status, body
            )));
        }

        let token: TokenEndpointResponse = response.json().await.map_err(|e| {
            PlatformError::internal(format!("Malformed token endpoint response: {}", e))
        })?;
        Ok(token.access_token)
    }

    /// Fetch the raw userinfo attributes with a provider access token
    pub async fn fetch_user_info(
        &self,
        provider: AuthProvider,
        access_token: &str,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let endpoints = self.endpoints(provider)?;

        let response = self
            .http
            .get(&endpoints.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                PlatformError::internal(format!("Userinfo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(PlatformError::unauthorized(format!(
                "Userinfo endpoint rejected the token ({})",
                response.status()
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            PlatformError::internal(format!("Malformed userinfo response: {}", e))
        })?;
        value
            .as_object()
            .cloned()
            .ok_or_else(|| PlatformError::internal("Userinfo response is not a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OidcClient {
        OidcClient::new("https://api.example.com")
            .with_google(ProviderEndpoints::google("google-client", "google-secret"))
            .with_kakao(ProviderEndpoints::kakao("kakao-client", "kakao-secret"))
    }

    #[test]
    fn test_redirect_uri_per_provider() {
        let c = client();
        assert_eq!(
            c.redirect_uri(AuthProvider::Google),
            "https://api.example.com/login/oauth2/code/google"
        );
        assert_eq!(
            c.redirect_uri(AuthProvider::Kakao),
            "https://api.example.com/login/oauth2/code/kakao"
        );
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let c = client();
        let url = c
            .build_authorization_url(AuthProvider::Google, "bind:abc|csrf")
            .unwrap();
        assert!(url.starts_with(GOOGLE_AUTHORIZATION_ENDPOINT));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=google-client"));
        assert!(url.contains("state=bind%3Aabc%7Ccsrf"));
    }

    #[test]
    fn test_unconfigured_provider_rejected() {
        let c = OidcClient::new("https://api.example.com");
        assert!(c.build_authorization_url(AuthProvider::Google, "s").is_err());
        assert!(c.build_authorization_url(AuthProvider::Kakao, "s").is_err());
    }

    #[test]
    fn test_local_provider_has_no_endpoints() {
        let c = client();
        assert!(c.build_authorization_url(AuthProvider::Local, "s").is_err());
    }
}
