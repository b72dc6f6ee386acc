//! A two-participant demo market on loopback.
//!
//! Starts an Aggregator at `aggregator.demo` and a DSO at `dso.demo`,
//! wired up through a static directory instead of DNS, then has the AGR
//! send an unsolicited FlexOffer. The DSO answers with a
//! FlexOfferResponse through its own AGR client, which the AGR's handler
//! logs. Press Ctrl-C to stop both services.
//!
//! Run with `cargo run --bin market-demo` and set `RUST_LOG=debug` to
//! watch the envelopes travel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use uftp_client::DsoAgrClient;
use uftp_discovery::StaticDirectory;
use uftp_messages::messages::{
    AgrPortfolioQueryResponse, AgrPortfolioUpdateResponse, DPrognosis, DPrognosisResponse,
    DsoPortfolioQueryResponse, DsoPortfolioUpdateResponse, FlexOffer, FlexOfferOption,
    FlexOfferOptionIsp, FlexOfferResponse, FlexOfferRevocation, FlexOfferRevocationResponse,
    FlexOrder, FlexOrderResponse, FlexRequest, FlexRequestResponse, FlexReservationUpdate,
    FlexReservationUpdateResponse, FlexSettlement, FlexSettlementResponse, Metering,
    MeteringResponse,
};
use uftp_messages::{IspDuration, Payload, Role};
use uftp_service::{AgrHandler, AgrService, DsoHandler, DsoService, Resolvers, ServiceConfig};
use uftp_transport::keys::KeyPair;

const AGR_DOMAIN: &str = "aggregator.demo";
const DSO_DOMAIN: &str = "dso.demo";
const AGR_PORT: u16 = 8080;
const DSO_PORT: u16 = 8081;

/// Aggregator side: log everything the DSO sends back.
struct DemoAggregator;

#[async_trait]
impl AgrHandler for DemoAggregator {
    async fn process_agr_portfolio_query_response(
        &self,
        message: AgrPortfolioQueryResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a portfolio query response");
        Ok(())
    }

    async fn process_agr_portfolio_update_response(
        &self,
        message: AgrPortfolioUpdateResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a portfolio update response");
        Ok(())
    }

    async fn process_d_prognosis_response(
        &self,
        message: DPrognosisResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a prognosis response");
        Ok(())
    }

    async fn process_flex_offer_response(
        &self,
        message: FlexOfferResponse,
    ) -> anyhow::Result<()> {
        info!(
            result = ?message.result,
            offer = %message.flex_offer_message_id,
            "the DSO answered our FlexOffer"
        );
        Ok(())
    }

    async fn process_flex_offer_revocation_response(
        &self,
        message: FlexOfferRevocationResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a revocation response");
        Ok(())
    }

    async fn process_flex_order(&self, message: FlexOrder) -> anyhow::Result<()> {
        info!(?message, "received a flex order");
        Ok(())
    }

    async fn process_flex_request(&self, message: FlexRequest) -> anyhow::Result<()> {
        info!(?message, "received a flex request");
        Ok(())
    }

    async fn process_flex_reservation_update(
        &self,
        message: FlexReservationUpdate,
    ) -> anyhow::Result<()> {
        info!(?message, "received a reservation update");
        Ok(())
    }

    async fn process_flex_settlement(&self, message: FlexSettlement) -> anyhow::Result<()> {
        info!(?message, "received a settlement");
        Ok(())
    }

    async fn process_metering_response(&self, message: MeteringResponse) -> anyhow::Result<()> {
        info!(?message, "received a metering response");
        Ok(())
    }
}

/// DSO side: log everything, and confirm FlexOffers through its own AGR
/// client.
struct DemoDso {
    agr_client: DsoAgrClient,
}

#[async_trait]
impl DsoHandler for DemoDso {
    async fn process_d_prognosis(&self, message: DPrognosis) -> anyhow::Result<()> {
        info!(?message, "received a prognosis");
        Ok(())
    }

    async fn process_dso_portfolio_query_response(
        &self,
        message: DsoPortfolioQueryResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a portfolio query response");
        Ok(())
    }

    async fn process_dso_portfolio_update_response(
        &self,
        message: DsoPortfolioUpdateResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a portfolio update response");
        Ok(())
    }

    async fn process_flex_offer(&self, message: FlexOffer) -> anyhow::Result<()> {
        info!(
            options = message.offer_options.len(),
            congestion_point = %message.congestion_point,
            "received a FlexOffer, accepting it"
        );
        let mut response = FlexOfferResponse {
            flex_offer_message_id: message.message_id().unwrap_or_default(),
            ..Default::default()
        };
        if let Some(conversation_id) = message.conversation_id() {
            response.conversation_id = Some(conversation_id);
        }
        self.agr_client.send_flex_offer_response(response).await?;
        Ok(())
    }

    async fn process_flex_offer_revocation(
        &self,
        message: FlexOfferRevocation,
    ) -> anyhow::Result<()> {
        info!(?message, "received an offer revocation");
        Ok(())
    }

    async fn process_flex_order_response(
        &self,
        message: FlexOrderResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received an order response");
        Ok(())
    }

    async fn process_flex_request_response(
        &self,
        message: FlexRequestResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a request response");
        Ok(())
    }

    async fn process_flex_reservation_update_response(
        &self,
        message: FlexReservationUpdateResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a reservation update response");
        Ok(())
    }

    async fn process_flex_settlement_response(
        &self,
        message: FlexSettlementResponse,
    ) -> anyhow::Result<()> {
        info!(?message, "received a settlement response");
        Ok(())
    }

    async fn process_metering(&self, message: Metering) -> anyhow::Result<()> {
        info!(?message, "received metering data");
        Ok(())
    }
}

fn demo_offer() -> anyhow::Result<FlexOffer> {
    Ok(FlexOffer {
        version: "3.0.0".to_string(),
        sender_domain: None,
        recipient_domain: None,
        time_stamp: None,
        message_id: None,
        conversation_id: None,
        isp_duration: IspDuration::FIFTEEN_MINUTES,
        time_zone: "Europe/Amsterdam".to_string(),
        period: chrono::Utc::now().date_naive(),
        congestion_point: "ean.123456789012".to_string(),
        expiration_date_time: (chrono::Utc::now() + chrono::Duration::hours(4)).fixed_offset(),
        flex_request_message_id: None,
        contract_id: None,
        d_prognosis_message_id: None,
        baseline_reference: None,
        currency: "EUR".to_string(),
        offer_options: vec![FlexOfferOption {
            option_reference: "demo-option".to_string(),
            price: "2.3000".parse()?,
            min_activation_factor: "0.50".parse()?,
            isps: vec![FlexOfferOptionIsp {
                power: -100_000,
                start: 1,
                duration: 4,
            }],
        }],
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uftp=info".parse()?)
                .add_directive("market_demo=info".parse()?),
        )
        .init();

    info!("demo market starting");

    let agr_keys = KeyPair::generate();
    let dso_keys = KeyPair::generate();

    // Both participants share one static directory; in a real deployment
    // these records live in DNS under the well-known names.
    let directory = StaticDirectory::new()
        .register(
            AGR_DOMAIN,
            Role::Agr,
            &agr_keys.verifying_key.to_base64(),
            &format!("http://127.0.0.1:{AGR_PORT}/shapeshifter/api/v3/message"),
        )
        .register(
            DSO_DOMAIN,
            Role::Dso,
            &dso_keys.verifying_key.to_base64(),
            &format!("http://127.0.0.1:{DSO_PORT}/shapeshifter/api/v3/message"),
        );
    let resolvers = Resolvers::from_directory(directory);

    let mut agr_config = ServiceConfig::new(AGR_DOMAIN, &agr_keys.signing_key.to_base64());
    agr_config.bind_host = "127.0.0.1".to_string();
    agr_config.bind_port = AGR_PORT;
    let aggregator = AgrService::new(agr_config, resolvers.clone(), Arc::new(DemoAggregator))?;

    let mut dso_config = ServiceConfig::new(DSO_DOMAIN, &dso_keys.signing_key.to_base64());
    dso_config.bind_host = "127.0.0.1".to_string();
    dso_config.bind_port = DSO_PORT;
    let dso_service = DsoService::new(
        dso_config,
        resolvers.clone(),
        Arc::new(DemoDso {
            agr_client: DsoAgrClient::new(uftp_client::ClientParams {
                sender_domain: DSO_DOMAIN.to_string(),
                signing_key: Arc::new(dso_keys.signing_key.clone()),
                recipient_domain: AGR_DOMAIN.to_string(),
                recipient_endpoint: None,
                recipient_signing_key: None,
                key_lookup: Arc::clone(&resolvers.key_lookup),
                endpoint_lookup: Arc::clone(&resolvers.endpoint_lookup),
                oauth: None,
                config: uftp_client::ClientConfig::default(),
            })?,
        }),
    )?;

    let agr_addr = aggregator.start().await?;
    let dso_addr = dso_service.start().await?;
    info!(%agr_addr, %dso_addr, "both participants are listening");

    // Kick off one conversation: AGR offers flexibility, DSO confirms.
    let dso_client = aggregator.dso_client(DSO_DOMAIN)?;
    dso_client.send_flex_offer(demo_offer()?).await?;
    info!("FlexOffer sent, waiting for the asynchronous response");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    aggregator.stop().await;
    dso_service.stop().await;
    Ok(())
}
