//! Client that allows the Aggregator to send messages to the CRO.

use uftp_messages::messages::{AgrPortfolioQuery, AgrPortfolioUpdate};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// AGR → CRO client.
#[derive(Clone)]
pub struct AgrCroClient {
    inner: UftpClient,
}

impl AgrCroClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Agr, Role::Cro, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// The AGRPortfolioUpdate is used by the AGR to indicate on which
    /// connections it represents prosumers.
    pub async fn send_agr_portfolio_update(
        &self,
        message: AgrPortfolioUpdate,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::AgrPortfolioUpdate(message))
            .await
    }

    /// The AGRPortfolioQuery is used by the AGR to retrieve additional
    /// information on its connections.
    pub async fn send_agr_portfolio_query(
        &self,
        message: AgrPortfolioQuery,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::AgrPortfolioQuery(message))
            .await
    }
}
