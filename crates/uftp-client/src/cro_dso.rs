//! Client that allows the CRO to send messages to the DSO.
//!
//! Only the two portfolio responses travel in this direction; each comes
//! after the DSO sent a DSOPortfolioUpdate or DSOPortfolioQuery.

use uftp_messages::messages::{DsoPortfolioQueryResponse, DsoPortfolioUpdateResponse};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// CRO → DSO client.
#[derive(Clone)]
pub struct CroDsoClient {
    inner: UftpClient,
}

impl CroDsoClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Cro, Role::Dso, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// Status reply to a DSOPortfolioUpdate.
    pub async fn send_dso_portfolio_update_response(
        &self,
        message: DsoPortfolioUpdateResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::DsoPortfolioUpdateResponse(message))
            .await
    }

    /// Answer to a DSOPortfolioQuery.
    pub async fn send_dso_portfolio_query_response(
        &self,
        message: DsoPortfolioQueryResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::DsoPortfolioQueryResponse(message))
            .await
    }
}
