//! Happy-path flows between the three participants.

use std::time::Duration;

use uftp_integration_tests::{sample_portfolio_update, TestNetwork, AGR_DOMAIN, CRO_DOMAIN};
use uftp_messages::messages::AgrPortfolioUpdateResponse;
use uftp_messages::{AcceptedRejected, Payload, UftpMessage};

#[tokio::test]
async fn test_agr_portfolio_update_reaches_the_cro() -> anyhow::Result<()> {
    let network = TestNetwork::start().await?;

    let client = network.agr.cro_client(CRO_DOMAIN)?;
    let update = sample_portfolio_update();
    let response = client.send_agr_portfolio_update(update.clone()).await?;
    // Asynchronous model: the HTTP exchange carries no response payload.
    assert!(response.is_none());

    let processed = network.cro_inbox.expect(Duration::from_secs(10)).await?;
    match processed {
        UftpMessage::AgrPortfolioUpdate(message) => {
            assert_eq!(message.connections, update.connections);
            assert_eq!(message.time_zone, update.time_zone);
            assert_eq!(message.sender_domain.as_deref(), Some(AGR_DOMAIN));
            assert_eq!(message.recipient_domain.as_deref(), Some(CRO_DOMAIN));
            assert!(message.message_id.is_some());
            assert!(message.time_stamp.is_some());
        }
        other => anyhow::bail!("CRO processed a {} instead", other.kind().name()),
    }

    network.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_cro_response_travels_back_to_the_agr() -> anyhow::Result<()> {
    let network = TestNetwork::start().await?;

    let client = network.agr.cro_client(CRO_DOMAIN)?;
    client
        .send_agr_portfolio_update(sample_portfolio_update())
        .await?;

    let received = network.cro_inbox.expect(Duration::from_secs(10)).await?;
    let (original_id, conversation_id) = (
        received.message_id().expect("message id"),
        received.conversation_id().expect("conversation id"),
    );

    // The CRO application answers through its AGR client, copying the
    // conversation identifier as the protocol requires.
    let cro_client = network.cro.agr_client(AGR_DOMAIN)?;
    let mut response = AgrPortfolioUpdateResponse {
        agr_portfolio_update_message_id: original_id,
        ..Default::default()
    };
    response.conversation_id = Some(conversation_id);
    cro_client
        .send_agr_portfolio_update_response(response)
        .await?;

    let processed = network.agr_inbox.expect(Duration::from_secs(10)).await?;
    match processed {
        UftpMessage::AgrPortfolioUpdateResponse(message) => {
            assert_eq!(message.result, AcceptedRejected::Accepted);
            assert_eq!(message.agr_portfolio_update_message_id, original_id);
            assert_eq!(message.conversation_id, Some(conversation_id));
        }
        other => anyhow::bail!("AGR processed a {} instead", other.kind().name()),
    }

    network.shutdown().await;
    Ok(())
}
