//! Supabase (GoTrue) auth client.
//!
//! Same three-step shape as the Google adapter (authorize, token exchange,
//! user fetch) with GoTrue's endpoints and field names. The project anon key
//! accompanies every request as the `apikey` header.

use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};

use crate::error::{unauthenticated, upstream_error, DomainErrorKind, Error, ExternalErrorKind};
use crate::gateway::oauth::{OAuthProvider, ProviderSession, UserMetadata};
use crate::provider::Provider;

/// Session response from the GoTrue token endpoint
#[derive(Debug, Deserialize)]
pub struct SupabaseSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
}

/// User record from `GET /auth/v1/user`
#[derive(Debug, Deserialize)]
pub struct SupabaseUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: SupabaseUserMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct SupabaseUserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CodeExchangeRequest {
    auth_code: String,
    redirect_uri: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// Supabase auth client scoped to one project.
pub struct SupabaseAuthClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuthClient {
    /// Create a new client for `base_url` (e.g. https://xyzcompany.supabase.co).
    pub fn new(base_url: String, anon_key: String) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<SupabaseSession, Error> {
        let request = CodeExchangeRequest {
            auth_code: code.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };

        debug!("Exchanging Supabase auth code for a session");

        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "authorization_code")])
            .header("apikey", &self.anon_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange Supabase auth code: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            Ok(response.json().await.map_err(|e| {
                warn!("Failed to parse Supabase session response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Supabase auth".to_string(),
                    )),
                }
            })?)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Supabase auth error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<SupabaseUser, Error> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Supabase user: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            Ok(response.json().await.map_err(|e| {
                warn!("Failed to parse Supabase user response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Supabase auth".to_string(),
                    )),
                }
            })?)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Supabase user error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }
}

#[async_trait]
impl OAuthProvider for SupabaseAuthClient {
    fn provider(&self) -> Provider {
        Provider::Supabase
    }

    fn authorization_url(&self, scopes: &[&str], redirect_uri: &str, state: &str) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?\
            redirect_to={}&\
            scopes={}&\
            state={}",
            self.endpoint("authorize"),
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

        let session = self.exchange_code_for_session(code, redirect_uri).await?;
        let user = self.get_user(&session.access_token).await?;

        let identifier = user.email.clone().ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "Supabase user response is missing an email address".to_string(),
            )),
        })?;

        Ok(UserMetadata {
            provider: Provider::Supabase,
            provider_id: user.id,
            name: user.user_metadata.full_name,
            email: user.email,
            identifier,
            picture_url: user.user_metadata.avatar_url,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };

        debug!("Refreshing Supabase session");

        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to refresh Supabase session: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let session: SupabaseSession = response.json().await.map_err(|e| {
                warn!("Failed to parse Supabase refresh response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Supabase auth".to_string(),
                    )),
                }
            })?;
            Ok(ProviderSession {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_in: session.expires_in,
                token_type: session.token_type,
                scope: String::new(),
            })
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Supabase refresh error ({}): {}", status, error_text);
            Err(upstream_error(status, error_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> SupabaseAuthClient {
        SupabaseAuthClient::new(server.url(), "anon-key".to_string()).unwrap()
    }

    #[test]
    fn authorization_url_points_at_the_project_authorize_endpoint() {
        let client =
            SupabaseAuthClient::new("https://xyz.supabase.co/".to_string(), "k".to_string())
                .unwrap();

        let url = client.authorization_url(&["openid"], "https://app/cb", "https://app/done");

        assert!(url.starts_with("https://xyz.supabase.co/auth/v1/authorize?"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fapp%2Fcb"));
        assert!(url.contains("state=https%3A%2F%2Fapp%2Fdone"));
    }

    #[tokio::test]
    async fn exchange_code_maps_the_supabase_user_to_metadata() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token?grant_type=authorization_code")
            .match_header("apikey", "anon-key")
            .with_status(200)
            .with_body(
                r#"{"access_token":"t1","refresh_token":"r1","expires_in":3600,"token_type":"bearer"}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer t1")
            .with_status(200)
            .with_body(
                r#"{"id":"s-1","email":"a@b.com","user_metadata":{"full_name":"Ada L","avatar_url":"https://pic"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let metadata = client
            .exchange_code("supacode", "https://app/cb")
            .await
            .unwrap();

        assert_eq!(metadata.provider, Provider::Supabase);
        assert_eq!(metadata.provider_id, "s-1");
        assert_eq!(metadata.identifier, "a@b.com");
        assert_eq!(metadata.name, Some("Ada L".to_string()));
    }

    #[tokio::test]
    async fn exchange_code_propagates_the_gotrue_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token?grant_type=authorization_code")
            .with_status(401)
            .with_body("bad api key")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .exchange_code("supacode", "https://app/cb")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream {
                status: 401,
                body: "bad api key".to_string()
            })
        );
    }
}
