//! The Aggregator service facade.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use uftp_client::{AgrCroClient, AgrDsoClient};
use uftp_messages::messages::{
    AgrPortfolioQueryResponse, AgrPortfolioUpdateResponse, DPrognosisResponse, FlexOfferResponse,
    FlexOfferRevocationResponse, FlexOrder, FlexRequest, FlexReservationUpdate, FlexSettlement,
    MeteringResponse,
};
use uftp_messages::{Role, UftpMessage};

use crate::config::ServiceConfig;
use crate::lookup::Resolvers;
use crate::server::{InboundDispatch, ServiceCore, ServiceState};
use crate::Result;

/// Business logic of an Aggregator, one method per acceptable message
/// kind. A missing method is a compile error, so a service can never
/// start with an unhandled kind.
///
/// Handlers run on the inbound worker pool after the request was already
/// acknowledged; errors are logged and do not produce a rejection.
/// Replying to a peer happens explicitly through the
/// [`dso_client`](AgrService::dso_client) /
/// [`cro_client`](AgrService::cro_client) factories.
#[async_trait]
pub trait AgrHandler: Send + Sync + 'static {
    /// The CRO's answer to our portfolio query, listing our connections.
    async fn process_agr_portfolio_query_response(
        &self,
        message: AgrPortfolioQueryResponse,
    ) -> anyhow::Result<()>;

    /// The CRO's status reply to our portfolio update.
    async fn process_agr_portfolio_update_response(
        &self,
        message: AgrPortfolioUpdateResponse,
    ) -> anyhow::Result<()>;

    /// The DSO's confirmation of a D-Prognosis we sent.
    async fn process_d_prognosis_response(
        &self,
        message: DPrognosisResponse,
    ) -> anyhow::Result<()>;

    /// The DSO's confirmation of a FlexOffer we sent.
    async fn process_flex_offer_response(&self, message: FlexOfferResponse)
        -> anyhow::Result<()>;

    /// The DSO's confirmation of a FlexOfferRevocation we sent.
    async fn process_flex_offer_revocation_response(
        &self,
        message: FlexOfferRevocationResponse,
    ) -> anyhow::Result<()>;

    /// A purchase of flexibility based on one of our offers. Usually
    /// answered with a FlexOrderResponse via the DSO client.
    async fn process_flex_order(&self, message: FlexOrder) -> anyhow::Result<()>;

    /// A request for flexibility. Usually answered with a
    /// FlexRequestResponse and, later, one or more FlexOffers.
    async fn process_flex_request(&self, message: FlexRequest) -> anyhow::Result<()>;

    /// A reservation update on a bilateral contract.
    async fn process_flex_reservation_update(
        &self,
        message: FlexReservationUpdate,
    ) -> anyhow::Result<()>;

    /// The periodic settlement. Usually answered with a
    /// FlexSettlementResponse carrying one status per order settlement.
    async fn process_flex_settlement(&self, message: FlexSettlement) -> anyhow::Result<()>;

    /// The DSO's confirmation of metering data we sent.
    async fn process_metering_response(&self, message: MeteringResponse) -> anyhow::Result<()>;
}

struct AgrDispatcher {
    handler: Arc<dyn AgrHandler>,
}

#[async_trait]
impl InboundDispatch for AgrDispatcher {
    async fn dispatch(&self, message: UftpMessage) -> anyhow::Result<()> {
        match message {
            UftpMessage::AgrPortfolioQueryResponse(m) => {
                self.handler.process_agr_portfolio_query_response(m).await
            }
            UftpMessage::AgrPortfolioUpdateResponse(m) => {
                self.handler.process_agr_portfolio_update_response(m).await
            }
            UftpMessage::DPrognosisResponse(m) => {
                self.handler.process_d_prognosis_response(m).await
            }
            UftpMessage::FlexOfferResponse(m) => {
                self.handler.process_flex_offer_response(m).await
            }
            UftpMessage::FlexOfferRevocationResponse(m) => {
                self.handler
                    .process_flex_offer_revocation_response(m)
                    .await
            }
            UftpMessage::FlexOrder(m) => self.handler.process_flex_order(m).await,
            UftpMessage::FlexRequest(m) => self.handler.process_flex_request(m).await,
            UftpMessage::FlexReservationUpdate(m) => {
                self.handler.process_flex_reservation_update(m).await
            }
            UftpMessage::FlexSettlement(m) => self.handler.process_flex_settlement(m).await,
            UftpMessage::MeteringResponse(m) => self.handler.process_metering_response(m).await,
            other => anyhow::bail!(
                "kind {} is not acceptable for an AGR service",
                other.kind().name()
            ),
        }
    }
}

/// Service representing the Aggregator. Receives requests from the DSO
/// and responses from both the DSO and the CRO.
pub struct AgrService {
    core: Arc<ServiceCore>,
}

impl AgrService {
    pub fn new(
        config: ServiceConfig,
        resolvers: Resolvers,
        handler: Arc<dyn AgrHandler>,
    ) -> Result<Self> {
        let core = ServiceCore::new(
            Role::Agr,
            config,
            Arc::new(AgrDispatcher { handler }),
            resolvers,
        )?;
        Ok(Self { core })
    }

    /// Serve until [`stop`](Self::stop) is called.
    pub async fn serve(&self) -> Result<()> {
        Arc::clone(&self.core).serve().await
    }

    /// Serve in the background; returns once the listener is bound.
    pub async fn start(&self) -> Result<SocketAddr> {
        Arc::clone(&self.core).start().await
    }

    /// Signal shutdown and wait for the server to finish.
    pub async fn stop(&self) {
        self.core.stop().await
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.core.state()
    }

    /// A client for sending messages to a CRO.
    pub fn cro_client(&self, recipient_domain: &str) -> Result<AgrCroClient> {
        Ok(AgrCroClient::new(
            self.core.peer_params(recipient_domain, Role::Cro)?,
        )?)
    }

    /// A client for sending messages to a DSO.
    pub fn dso_client(&self, recipient_domain: &str) -> Result<AgrDsoClient> {
        Ok(AgrDsoClient::new(
            self.core.peer_params(recipient_domain, Role::Dso)?,
        )?)
    }
}
