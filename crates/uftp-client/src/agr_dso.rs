//! Client that allows the Aggregator to send messages to the DSO.

use uftp_messages::messages::{
    DPrognosis, FlexOffer, FlexOfferRevocation, FlexOrderResponse, FlexRequestResponse,
    FlexReservationUpdateResponse, FlexSettlementResponse, Metering,
};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// AGR → DSO client.
#[derive(Clone)]
pub struct AgrDsoClient {
    inner: UftpClient,
}

impl AgrDsoClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Agr, Role::Dso, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// D-Prognosis messages communicate demand prognoses between AGRs and
    /// DSOs. A prognosis always contains data for all ISPs of the period
    /// it applies to, even when sent after the period has started.
    pub async fn send_d_prognosis(&self, message: DPrognosis) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::DPrognosis(message)).await
    }

    /// Reply to a FlexRequest, indicating whether it was processed
    /// successfully.
    pub async fn send_flex_request_response(
        &self,
        message: FlexRequestResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexRequestResponse(message))
            .await
    }

    /// FlexOffer messages offer flexibility to a DSO, solicited or
    /// unsolicited. Multiple offers may answer a single FlexRequest; the
    /// AGR must be able to deliver the flexibility offered across all of
    /// its open offers.
    pub async fn send_flex_offer(&self, message: FlexOffer) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::FlexOffer(message)).await
    }

    /// Revoke a previously sent FlexOffer, even if its validity time has
    /// not yet expired. Not allowed for offers with accepted orders.
    pub async fn send_flex_offer_revocation(
        &self,
        message: FlexOfferRevocation,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexOfferRevocation(message))
            .await
    }

    /// Confirm a FlexOrder.
    pub async fn send_flex_order_response(
        &self,
        message: FlexOrderResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexOrderResponse(message))
            .await
    }

    /// Reply to a FlexSettlement. When rejected, the DSO should consider
    /// all its order settlements potentially disputed.
    pub async fn send_flex_settlement_response(
        &self,
        message: FlexSettlementResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexSettlementResponse(message))
            .await
    }

    /// Confirm a FlexReservationUpdate.
    pub async fn send_flex_reservation_update_response(
        &self,
        message: FlexReservationUpdateResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexReservationUpdateResponse(message))
            .await
    }

    /// Submit metering data to the DSO.
    pub async fn send_metering(&self, message: Metering) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::Metering(message)).await
    }
}
