//! OAuth2 client-credentials bearer tokens for outbound requests.
//!
//! Some participants front their endpoint with an OAuth2-protected
//! gateway. The [`TokenManager`] obtains a token through the
//! client-credentials grant, caches it until shortly before expiry and
//! refreshes it on demand; only one refresh is ever in flight.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{ClientError, Result};

/// Configuration of one OAuth2 token endpoint.
#[derive(Clone, Debug)]
pub struct OAuthConfig {
    /// URL of the token endpoint.
    pub token_url: String,
    /// Client identifier for the client-credentials grant.
    pub client_id: String,
    /// Client secret for the client-credentials grant.
    pub client_secret: String,
    /// A token is refreshed when it expires within this buffer.
    pub refresh_buffer: Duration,
    /// HTTP timeout for the token request.
    pub request_timeout: Duration,
}

impl OAuthConfig {
    /// Configuration with the default 30-second refresh buffer and
    /// request timeout.
    pub fn new(token_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_buffer: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

struct TokenState {
    header_value: String,
    expires_at: Instant,
}

/// Obtains and refreshes bearer tokens for one token endpoint.
pub struct TokenManager {
    config: OAuthConfig,
    http: reqwest::Client,
    state: Mutex<Option<TokenState>>,
}

impl TokenManager {
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http,
            state: Mutex::new(None),
        })
    }

    /// The value for the `Authorization` header, refreshing the token
    /// first when it is absent or expires within the refresh buffer.
    pub async fn authorization_header(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.as_ref() {
            if Instant::now() + self.config.refresh_buffer < token.expires_at {
                return Ok(token.header_value.clone());
            }
        }

        // Refresh while holding the lock, so concurrent sends wait for
        // this one token request instead of issuing their own.
        let token = self.obtain_token().await?;
        let header_value = token.header_value.clone();
        *state = Some(token);
        Ok(header_value)
    }

    async fn obtain_token(&self) -> Result<TokenState> {
        debug!(token_url = %self.config.token_url, "requesting bearer token");
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                ClientError::Authorization(format!(
                    "could not reach the OAuth server at {}: {e}",
                    self.config.token_url
                ))
            })?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authorization(format!(
                "could not obtain an access token from the OAuth server at {}: HTTP {status}: {body}",
                self.config.token_url
            )));
        }

        let token: TokenEndpointResponse = response.json().await.map_err(|e| {
            ClientError::Authorization(format!(
                "the OAuth server at {} did not return a valid token response: {e}",
                self.config.token_url
            ))
        })?;

        Ok(TokenState {
            header_value: format!("{} {}", token.token_type, token.access_token),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(token: &str, expires_in: u64) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": expires_in,
        })
    }

    #[tokio::test]
    async fn test_token_is_cached_until_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("T", 300)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = TokenManager::new(OAuthConfig::new(
            &format!("{}/token", server.uri()),
            "client-id",
            "client-secret",
        ))
        .expect("manager");

        let first = manager.authorization_header().await.expect("token");
        let second = manager.authorization_header().await.expect("token");
        assert_eq!(first, "Bearer T");
        assert_eq!(second, "Bearer T");
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed() {
        let server = MockServer::start().await;
        // expires_in below the refresh buffer, so every call refreshes.
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("T", 10)))
            .expect(2)
            .mount(&server)
            .await;

        let manager = TokenManager::new(OAuthConfig::new(
            &format!("{}/token", server.uri()),
            "client-id",
            "client-secret",
        ))
        .expect("manager");

        manager.authorization_header().await.expect("token");
        manager.authorization_header().await.expect("token");
    }

    #[tokio::test]
    async fn test_error_response_is_authorization_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let manager =
            TokenManager::new(OAuthConfig::new(&server.uri(), "client-id", "client-secret"))
                .expect("manager");
        assert!(matches!(
            manager.authorization_header().await,
            Err(ClientError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "T"})),
            )
            .mount(&server)
            .await;

        let manager =
            TokenManager::new(OAuthConfig::new(&server.uri(), "client-id", "client-secret"))
                .expect("manager");
        assert!(matches!(
            manager.authorization_header().await,
            Err(ClientError::Authorization(_))
        ));
    }
}
