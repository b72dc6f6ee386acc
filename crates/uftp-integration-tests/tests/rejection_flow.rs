//! Functional rejections: the request is acknowledged with an empty 200,
//! and a `Result=Rejected` response envelope travels back asynchronously.

use std::time::{Duration, Instant};

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use uftp_integration_tests::{
    sample_portfolio_update, TestNetwork, AGR_DOMAIN, CRO_DOMAIN,
};
use uftp_messages::messages::FlexRequestResponse;
use uftp_messages::{codec, AcceptedRejected, MessageFill, Payload, Role, SignedMessage, UftpMessage};
use uftp_transport::seal::{seal, unseal};

async fn post_envelope(endpoint: &str, xml: String) -> anyhow::Result<u16> {
    let response = reqwest::Client::new()
        .post(endpoint)
        .header("Content-Type", "text/xml; charset=utf-8")
        .body(xml)
        .send()
        .await?;
    Ok(response.status().as_u16())
}

#[tokio::test]
async fn test_mismatching_sender_domain_is_rejected() -> anyhow::Result<()> {
    let network = TestNetwork::start().await?;

    // The inner message claims fake.domain while the envelope says
    // agr.dev; both are signed with the AGR's real key.
    let mut message = UftpMessage::AgrPortfolioUpdate(sample_portfolio_update());
    message.fill(&MessageFill::now("fake.domain", CRO_DOMAIN));
    let conversation_id = message.conversation_id().expect("conversation id");

    let sealed = seal(&message, &network.agr_keys.signing_key)?;
    let envelope = SignedMessage {
        sender_domain: AGR_DOMAIN.to_string(),
        sender_role: Role::Agr,
        body: sealed,
    };

    let endpoint = network.endpoint_of(CRO_DOMAIN, Role::Cro).await?;
    let status = post_envelope(&endpoint, codec::envelope_to_xml(&envelope)?).await?;
    assert_eq!(status, 200);

    // The CRO never processes the update; the AGR receives the
    // rejection instead.
    let processed = network.agr_inbox.expect(Duration::from_secs(10)).await?;
    match processed {
        UftpMessage::AgrPortfolioUpdateResponse(response) => {
            assert_eq!(response.result, AcceptedRejected::Rejected);
            assert_eq!(response.rejection_reason.as_deref(), Some("Invalid Sender"));
            assert_eq!(response.conversation_id, Some(conversation_id));
        }
        other => anyhow::bail!("AGR processed a {} instead", other.kind().name()),
    }
    network
        .cro_inbox
        .expect_nothing(Duration::from_millis(500))
        .await?;

    network.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_misdirected_kind_is_rejected() -> anyhow::Result<()> {
    let network = TestNetwork::start().await?;

    // The rejection echoes a kind the AGR service itself does not
    // accept, so observe it at the wire with a capture server standing
    // in for the AGR endpoint.
    let capture = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&capture)
        .await;
    network.directory.register(
        AGR_DOMAIN,
        Role::Agr,
        &network.agr_keys.verifying_key.to_base64(),
        &format!("{}/shapeshifter/api/v3/message", capture.uri()),
    );

    // A FlexRequestResponse belongs in the AGR→DSO conversation; the
    // CRO must not accept it.
    let mut message = UftpMessage::FlexRequestResponse(FlexRequestResponse {
        flex_request_message_id: uuid::Uuid::new_v4(),
        ..Default::default()
    });
    message.fill(&MessageFill::now(AGR_DOMAIN, CRO_DOMAIN));
    let conversation_id = message.conversation_id().expect("conversation id");

    let sealed = seal(&message, &network.agr_keys.signing_key)?;
    let envelope = SignedMessage {
        sender_domain: AGR_DOMAIN.to_string(),
        sender_role: Role::Agr,
        body: sealed,
    };
    let endpoint = network.endpoint_of(CRO_DOMAIN, Role::Cro).await?;
    let status = post_envelope(&endpoint, codec::envelope_to_xml(&envelope)?).await?;
    assert_eq!(status, 200);

    // Wait for the rejection to arrive at the capture server.
    let deadline = Instant::now() + Duration::from_secs(10);
    let request = loop {
        let requests = capture.received_requests().await.unwrap_or_default();
        if let Some(request) = requests.into_iter().next() {
            break request;
        }
        anyhow::ensure!(Instant::now() < deadline, "no rejection was delivered");
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    let body = String::from_utf8(request.body.clone())?;
    let rejection_envelope = codec::envelope_from_xml(&body)?;
    assert_eq!(rejection_envelope.sender_domain, CRO_DOMAIN);
    assert_eq!(rejection_envelope.sender_role, Role::Cro);

    let rejection = unseal(&rejection_envelope.body, &network.cro_keys.verifying_key)?;
    match rejection {
        UftpMessage::FlexRequestResponse(response) => {
            assert_eq!(response.result, AcceptedRejected::Rejected);
            assert_eq!(
                response.rejection_reason.as_deref(),
                Some("Invalid Message: 'FlexRequestResponse'")
            );
            assert_eq!(response.conversation_id, Some(conversation_id));
        }
        other => anyhow::bail!("rejection was a {} instead", other.kind().name()),
    }

    network.shutdown().await;
    Ok(())
}
