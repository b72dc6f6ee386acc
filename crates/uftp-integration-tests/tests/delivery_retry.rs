//! The queued delivery path: retries with exponential backoff, callback
//! on success, silence after the attempt budget is spent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uftp_client::{AgrCroClient, ClientConfig, ClientParams};
use uftp_discovery::StaticDirectory;
use uftp_integration_tests::{sample_portfolio_update, TestNetwork, AGR_DOMAIN, CRO_DOMAIN};
use uftp_messages::UftpMessage;
use uftp_transport::keys::KeyPair;

fn refused_endpoint_client(attempts: u32) -> anyhow::Result<AgrCroClient> {
    let keys = KeyPair::generate();
    let directory = Arc::new(StaticDirectory::new());
    Ok(AgrCroClient::new(ClientParams {
        sender_domain: AGR_DOMAIN.to_string(),
        signing_key: Arc::new(keys.signing_key.clone()),
        recipient_domain: CRO_DOMAIN.to_string(),
        // Port 1 refuses connections, so every attempt fails fast.
        recipient_endpoint: Some("http://127.0.0.1:1/shapeshifter/api/v3/message".to_string()),
        recipient_signing_key: None,
        key_lookup: directory.clone(),
        endpoint_lookup: directory,
        oauth: None,
        config: ClientConfig {
            request_timeout: Duration::from_secs(5),
            num_outgoing_workers: 2,
            num_delivery_attempts: attempts,
            exponential_retry_factor: 0.1,
            exponential_retry_base: 1.1,
        },
    })?)
}

#[tokio::test]
async fn test_retry_exhaustion_drops_the_message() -> anyhow::Result<()> {
    let client = refused_endpoint_client(2)?;

    let callback_invoked = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&callback_invoked);
    client.client().enqueue(
        UftpMessage::AgrPortfolioUpdate(sample_portfolio_update()),
        move |_| flag.store(true, Ordering::SeqCst),
    );

    // Two retries at 0.1 * 1.1^n seconds are long since over after two
    // seconds; the message must have been dropped without a callback.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!callback_invoked.load(Ordering::SeqCst));
    Ok(())
}

#[tokio::test]
async fn test_queued_delivery_invokes_the_callback() -> anyhow::Result<()> {
    let network = TestNetwork::start().await?;
    let client = network.agr.cro_client(CRO_DOMAIN)?;

    let (tx, rx) = tokio::sync::oneshot::channel::<Option<UftpMessage>>();
    client.client().enqueue(
        UftpMessage::AgrPortfolioUpdate(sample_portfolio_update()),
        move |response| {
            let _ = tx.send(response);
        },
    );

    let response = tokio::time::timeout(Duration::from_secs(10), rx).await??;
    // Empty 200 response in the asynchronous model.
    assert!(response.is_none());

    let processed = network.cro_inbox.expect(Duration::from_secs(10)).await?;
    assert_eq!(
        processed.kind(),
        uftp_messages::MessageKind::AgrPortfolioUpdate
    );

    network.shutdown().await;
    Ok(())
}
