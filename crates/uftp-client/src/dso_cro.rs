//! Client that allows the DSO to send messages to the CRO.

use uftp_messages::messages::{DsoPortfolioQuery, DsoPortfolioUpdate};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// DSO → CRO client.
#[derive(Clone)]
pub struct DsoCroClient {
    inner: UftpClient,
}

impl DsoCroClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Dso, Role::Cro, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// The DSOPortfolioUpdate is used by the DSO to indicate on which
    /// congestion points it wants to engage in flexibility trading.
    pub async fn send_dso_portfolio_update(
        &self,
        message: DsoPortfolioUpdate,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::DsoPortfolioUpdate(message))
            .await
    }

    /// DSOPortfolioQuery discovers which AGRs represent connections on a
    /// registered congestion point.
    pub async fn send_dso_portfolio_query(
        &self,
        message: DsoPortfolioQuery,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::DsoPortfolioQuery(message))
            .await
    }
}
