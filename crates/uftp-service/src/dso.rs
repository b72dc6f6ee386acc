//! The Distribution System Operator service facade.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use uftp_client::{DsoAgrClient, DsoCroClient};
use uftp_messages::messages::{
    DPrognosis, DsoPortfolioQueryResponse, DsoPortfolioUpdateResponse, FlexOffer,
    FlexOfferRevocation, FlexOrderResponse, FlexRequestResponse, FlexReservationUpdateResponse,
    FlexSettlementResponse, Metering,
};
use uftp_messages::{Role, UftpMessage};

use crate::config::ServiceConfig;
use crate::lookup::Resolvers;
use crate::server::{InboundDispatch, ServiceCore, ServiceState};
use crate::Result;

/// Business logic of a Distribution System Operator, one method per
/// acceptable message kind. A missing method is a compile error.
#[async_trait]
pub trait DsoHandler: Send + Sync + 'static {
    /// An AGR communicates its demand prognosis. Usually answered with a
    /// D-PrognosisResponse via the AGR client.
    async fn process_d_prognosis(&self, message: DPrognosis) -> anyhow::Result<()>;

    /// The CRO's answer to our portfolio query.
    async fn process_dso_portfolio_query_response(
        &self,
        message: DsoPortfolioQueryResponse,
    ) -> anyhow::Result<()>;

    /// The CRO's status reply to our portfolio update.
    async fn process_dso_portfolio_update_response(
        &self,
        message: DsoPortfolioUpdateResponse,
    ) -> anyhow::Result<()>;

    /// An AGR offers flexibility, solicited or unsolicited.
    async fn process_flex_offer(&self, message: FlexOffer) -> anyhow::Result<()>;

    /// An AGR revokes a previously accepted offer.
    async fn process_flex_offer_revocation(
        &self,
        message: FlexOfferRevocation,
    ) -> anyhow::Result<()>;

    /// The AGR's confirmation of a FlexOrder we sent.
    async fn process_flex_order_response(&self, message: FlexOrderResponse)
        -> anyhow::Result<()>;

    /// The AGR's confirmation of a FlexRequest we sent.
    async fn process_flex_request_response(
        &self,
        message: FlexRequestResponse,
    ) -> anyhow::Result<()>;

    /// The AGR's confirmation of a FlexReservationUpdate we sent.
    async fn process_flex_reservation_update_response(
        &self,
        message: FlexReservationUpdateResponse,
    ) -> anyhow::Result<()>;

    /// The AGR's verdict on the settlement we sent.
    async fn process_flex_settlement_response(
        &self,
        message: FlexSettlementResponse,
    ) -> anyhow::Result<()>;

    /// An AGR submits metering data. Usually answered with a
    /// MeteringResponse via the AGR client.
    async fn process_metering(&self, message: Metering) -> anyhow::Result<()>;
}

struct DsoDispatcher {
    handler: Arc<dyn DsoHandler>,
}

#[async_trait]
impl InboundDispatch for DsoDispatcher {
    async fn dispatch(&self, message: UftpMessage) -> anyhow::Result<()> {
        match message {
            UftpMessage::DPrognosis(m) => self.handler.process_d_prognosis(m).await,
            UftpMessage::DsoPortfolioQueryResponse(m) => {
                self.handler.process_dso_portfolio_query_response(m).await
            }
            UftpMessage::DsoPortfolioUpdateResponse(m) => {
                self.handler
                    .process_dso_portfolio_update_response(m)
                    .await
            }
            UftpMessage::FlexOffer(m) => self.handler.process_flex_offer(m).await,
            UftpMessage::FlexOfferRevocation(m) => {
                self.handler.process_flex_offer_revocation(m).await
            }
            UftpMessage::FlexOrderResponse(m) => {
                self.handler.process_flex_order_response(m).await
            }
            UftpMessage::FlexRequestResponse(m) => {
                self.handler.process_flex_request_response(m).await
            }
            UftpMessage::FlexReservationUpdateResponse(m) => {
                self.handler
                    .process_flex_reservation_update_response(m)
                    .await
            }
            UftpMessage::FlexSettlementResponse(m) => {
                self.handler.process_flex_settlement_response(m).await
            }
            UftpMessage::Metering(m) => self.handler.process_metering(m).await,
            other => anyhow::bail!(
                "kind {} is not acceptable for a DSO service",
                other.kind().name()
            ),
        }
    }
}

/// Service representing the Distribution System Operator. Receives
/// requests from the AGR and responses from both the AGR and the CRO.
pub struct DsoService {
    core: Arc<ServiceCore>,
}

impl DsoService {
    pub fn new(
        config: ServiceConfig,
        resolvers: Resolvers,
        handler: Arc<dyn DsoHandler>,
    ) -> Result<Self> {
        let core = ServiceCore::new(
            Role::Dso,
            config,
            Arc::new(DsoDispatcher { handler }),
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

    /// A client for sending messages to an AGR.
    pub fn agr_client(&self, recipient_domain: &str) -> Result<DsoAgrClient> {
        Ok(DsoAgrClient::new(
            self.core.peer_params(recipient_domain, Role::Agr)?,
        )?)
    }

    /// A client for sending messages to a CRO.
    pub fn cro_client(&self, recipient_domain: &str) -> Result<DsoCroClient> {
        Ok(DsoCroClient::new(
            self.core.peer_params(recipient_domain, Role::Cro)?,
        )?)
    }
}
