//! The Common Reference Operator service facade.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use uftp_client::{CroAgrClient, CroDsoClient};
use uftp_messages::messages::{
    AgrPortfolioQuery, AgrPortfolioUpdate, DsoPortfolioQuery, DsoPortfolioUpdate,
};
use uftp_messages::{Role, UftpMessage};

use crate::config::ServiceConfig;
use crate::lookup::Resolvers;
use crate::server::{InboundDispatch, ServiceCore, ServiceState};
use crate::Result;

/// Business logic of a Common Reference Operator, one method per
/// acceptable message kind. A missing method is a compile error.
#[async_trait]
pub trait CroHandler: Send + Sync + 'static {
    /// An AGR asks for the registered state of its portfolio. Usually
    /// answered with an AGRPortfolioQueryResponse via the AGR client.
    async fn process_agr_portfolio_query(&self, message: AgrPortfolioQuery)
        -> anyhow::Result<()>;

    /// An AGR updates the connections it represents.
    async fn process_agr_portfolio_update(
        &self,
        message: AgrPortfolioUpdate,
    ) -> anyhow::Result<()>;

    /// A DSO asks which AGRs represent connections on a congestion point.
    async fn process_dso_portfolio_query(&self, message: DsoPortfolioQuery)
        -> anyhow::Result<()>;

    /// A DSO updates its registered congestion points.
    async fn process_dso_portfolio_update(
        &self,
        message: DsoPortfolioUpdate,
    ) -> anyhow::Result<()>;
}

struct CroDispatcher {
    handler: Arc<dyn CroHandler>,
}

#[async_trait]
impl InboundDispatch for CroDispatcher {
    async fn dispatch(&self, message: UftpMessage) -> anyhow::Result<()> {
        match message {
            UftpMessage::AgrPortfolioQuery(m) => {
                self.handler.process_agr_portfolio_query(m).await
            }
            UftpMessage::AgrPortfolioUpdate(m) => {
                self.handler.process_agr_portfolio_update(m).await
            }
            UftpMessage::DsoPortfolioQuery(m) => {
                self.handler.process_dso_portfolio_query(m).await
            }
            UftpMessage::DsoPortfolioUpdate(m) => {
                self.handler.process_dso_portfolio_update(m).await
            }
            other => anyhow::bail!(
                "kind {} is not acceptable for a CRO service",
                other.kind().name()
            ),
        }
    }
}

/// Service representing the Common Reference Operator. Receives requests
/// from both the AGR and the DSO.
pub struct CroService {
    core: Arc<ServiceCore>,
}

impl CroService {
    pub fn new(
        config: ServiceConfig,
        resolvers: Resolvers,
        handler: Arc<dyn CroHandler>,
    ) -> Result<Self> {
        let core = ServiceCore::new(
            Role::Cro,
            config,
            Arc::new(CroDispatcher { handler }),
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
    pub fn agr_client(&self, recipient_domain: &str) -> Result<CroAgrClient> {
        Ok(CroAgrClient::new(
            self.core.peer_params(recipient_domain, Role::Agr)?,
        )?)
    }

    /// A client for sending messages to a DSO.
    pub fn dso_client(&self, recipient_domain: &str) -> Result<CroDsoClient> {
        Ok(CroDsoClient::new(
            self.core.peer_params(recipient_domain, Role::Dso)?,
        )?)
    }
}
