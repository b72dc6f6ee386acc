//! Client that allows the CRO to send messages to the Aggregator.

use uftp_messages::messages::{AgrPortfolioQueryResponse, AgrPortfolioUpdateResponse};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// CRO → AGR client.
#[derive(Clone)]
pub struct CroAgrClient {
    inner: UftpClient,
}

impl CroAgrClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Cro, Role::Agr, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// Status reply to an AGRPortfolioUpdate.
    pub async fn send_agr_portfolio_update_response(
        &self,
        message: AgrPortfolioUpdateResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::AgrPortfolioUpdateResponse(message))
            .await
    }

    /// Answer to an AGRPortfolioQuery, listing the AGR's connections.
    pub async fn send_agr_portfolio_query_response(
        &self,
        message: AgrPortfolioQueryResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::AgrPortfolioQueryResponse(message))
            .await
    }
}
