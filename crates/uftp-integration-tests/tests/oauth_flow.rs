//! Bearer-token injection on the outbound path.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uftp_client::{AgrCroClient, ClientConfig, ClientParams, OAuthConfig, TokenManager};
use uftp_discovery::StaticDirectory;
use uftp_integration_tests::{sample_portfolio_update, AGR_DOMAIN, CRO_DOMAIN};
use uftp_transport::keys::KeyPair;

#[tokio::test]
async fn test_outbound_requests_carry_the_bearer_token() -> anyhow::Result<()> {
    // Token endpoint: hands out "T" for 300 seconds, and must be asked
    // exactly once even though two messages are sent.
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=agr-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "T",
            "token_type": "Bearer",
            "expires_in": 300,
        })))
        .expect(1)
        .mount(&token_server)
        .await;

    // Recipient endpoint: only accepts requests carrying the token.
    let recipient = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/shapeshifter/api/v3/message"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&recipient)
        .await;

    let keys = KeyPair::generate();
    let directory = Arc::new(StaticDirectory::new());
    let manager = TokenManager::new(OAuthConfig::new(
        &format!("{}/token", token_server.uri()),
        "agr-client",
        "agr-secret",
    ))?;
    let client = AgrCroClient::new(ClientParams {
        sender_domain: AGR_DOMAIN.to_string(),
        signing_key: Arc::new(keys.signing_key.clone()),
        recipient_domain: CRO_DOMAIN.to_string(),
        recipient_endpoint: Some(format!(
            "{}/shapeshifter/api/v3/message",
            recipient.uri()
        )),
        recipient_signing_key: None,
        key_lookup: directory.clone(),
        endpoint_lookup: directory,
        oauth: Some(Arc::new(manager)),
        config: ClientConfig::default(),
    })?;

    // Two sends within the token lifetime: one token request, two
    // authorized deliveries.
    client
        .send_agr_portfolio_update(sample_portfolio_update())
        .await?;
    client
        .send_agr_portfolio_update(sample_portfolio_update())
        .await?;

    // Mock expectations (one token request, two deliveries) are
    // verified when the servers drop.
    Ok(())
}
