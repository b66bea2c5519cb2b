//! Google OAuth client.
//!
//! Implements the Google variant of the provider capability interface:
//! authorization-code exchange against Google's token endpoint followed by a
//! userinfo fetch, normalized into the gateway's canonical `UserMetadata`.

use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};

use crate::error::{unauthenticated, upstream_error, DomainErrorKind, Error, ExternalErrorKind};
use crate::gateway::oauth::{OAuthProvider, ProviderSession, UserMetadata};
use crate::provider::Provider;

/// OAuth token response from Google
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

/// User info from Google's OIDC userinfo endpoint
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest {
    access_type: String,
    code: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    grant_type: String,
}

/// Request to refresh access token
#[derive(Debug, Serialize)]
struct TokenRefreshRequest {
    access_type: String,
    refresh_token: String,
    client_id: String,
    client_secret: String,
    grant_type: String,
}

/// Configuration for Google OAuth URLs
#[derive(Debug, Clone)]
pub struct GoogleOAuthUrls {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleOAuthUrls {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
        }
    }
}

/// Google OAuth client for the authorization-code flow
pub struct GoogleOAuthClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    urls: GoogleOAuthUrls,
}

impl GoogleOAuthClient {
    /// Create a new Google OAuth client against the real Google endpoints
    pub fn new(client_id: String, client_secret: String) -> Result<Self, Error> {
        Self::with_urls(client_id, client_secret, GoogleOAuthUrls::default())
    }

    /// Create a new Google OAuth client with configurable URLs
    pub fn with_urls(
        client_id: String,
        client_secret: String,
        urls: GoogleOAuthUrls,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            urls,
        })
    }

    /// Exchange an authorization code for access and refresh tokens
    async fn exchange_code_for_tokens(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, Error> {
        let request = TokenExchangeRequest {
            access_type: "offline".to_string(),
            code: code.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: redirect_uri.to_string(),
            grant_type: "authorization_code".to_string(),
        };

        debug!("Exchanging Google OAuth code for tokens");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange Google OAuth code: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Google token response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Google OAuth".to_string(),
                    )),
                }
            })?;
            info!("Successfully exchanged Google OAuth code for tokens");
            Ok(tokens)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google OAuth error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }

    /// Get user info using the access token
    async fn get_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, Error> {
        let response = self
            .client
            .get(&self.urls.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Google user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let user_info: GoogleUserInfo = response.json().await.map_err(|e| {
                warn!("Failed to parse Google user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Google".to_string(),
                    )),
                }
            })?;
            Ok(user_info)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google user info error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self, scopes: &[&str], redirect_uri: &str, state: &str) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            access_type=offline&\
            prompt=consent&\
            state={}",
            self.urls.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<UserMetadata, Error> {
        if code.is_empty() {
            return Err(unauthenticated(
                "Authorization code is missing. Please provide a valid code.",
            ));
        }

        let tokens = self.exchange_code_for_tokens(code, redirect_uri).await?;
        let user_info = self.get_user_info(&tokens.access_token).await?;

        let identifier = user_info.email.clone().ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "Google userinfo response is missing an email address".to_string(),
            )),
        })?;

        Ok(UserMetadata {
            provider: Provider::Google,
            provider_id: user_info.sub,
            name: user_info.name,
            email: user_info.email,
            identifier,
            picture_url: user_info.picture,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error> {
        let request = TokenRefreshRequest {
            access_type: "offline".to_string(),
            refresh_token: refresh_token.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            grant_type: "refresh_token".to_string(),
        };

        debug!("Refreshing Google access token");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to refresh Google token: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Google token refresh response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Google OAuth".to_string(),
                    )),
                }
            })?;
            info!("Successfully refreshed Google access token");
            Ok(ProviderSession {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_in: tokens.expires_in,
                token_type: tokens.token_type,
                scope: tokens.scope,
            })
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token refresh error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorKind;

    fn client_for(server: &mockito::ServerGuard) -> GoogleOAuthClient {
        GoogleOAuthClient::with_urls(
            "client-id".to_string(),
            "client-secret".to_string(),
            GoogleOAuthUrls {
                auth_url: format!("{}/o/oauth2/v2/auth", server.url()),
                token_url: format!("{}/token", server.url()),
                userinfo_url: format!("{}/oauth2/v3/userinfo", server.url()),
            },
        )
        .unwrap()
    }

    #[test]
    fn authorization_url_carries_the_oauth_parameters() {
        let client = GoogleOAuthClient::new("client-id".to_string(), "client-secret".to_string())
            .unwrap();

        let url = client.authorization_url(
            &["openid", "email"],
            "https://app.example.com/auth/google/callback",
            "https://app.example.com/done",
        );

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=https%3A%2F%2Fapp.example.com%2Fdone"));
    }

    #[tokio::test]
    async fn exchange_code_maps_the_provider_user_to_metadata() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"t1","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;
        let userinfo_mock = server
            .mock("GET", "/oauth2/v3/userinfo")
            .match_header("authorization", "Bearer t1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sub":"u1","email":"a@b.com"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let metadata = client
            .exchange_code("validcode", "https://app/cb")
            .await
            .unwrap();

        assert_eq!(metadata.provider, Provider::Google);
        assert_eq!(metadata.provider_id, "u1");
        assert_eq!(metadata.identifier, "a@b.com");
        token_mock.assert_async().await;
        userinfo_mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_code_rejects_an_empty_code_before_any_network_call() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server.mock("POST", "/token").expect(0).create_async().await;

        let client = client_for(&server);
        let err = client.exchange_code("", "https://app/cb").await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::Unauthenticated(_))
        ));
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_code_propagates_the_provider_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body("invalid_grant")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .exchange_code("stale", "https://app/cb")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream {
                status: 400,
                body: "invalid_grant".to_string()
            })
        );
    }

    #[tokio::test]
    async fn exchange_code_fails_when_userinfo_has_no_email() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"t1","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/oauth2/v3/userinfo")
            .with_status(200)
            .with_body(r#"{"sub":"u1"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .exchange_code("validcode", "https://app/cb")
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(_))
        ));
    }

    #[tokio::test]
    async fn refresh_session_uses_the_refresh_token_grant() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "r1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"t2","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let session = client.refresh_session("r1").await.unwrap();

        assert_eq!(session.access_token, "t2");
        token_mock.assert_async().await;
    }
}
