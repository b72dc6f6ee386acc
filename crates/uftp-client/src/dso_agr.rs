//! Client that allows the DSO to send messages to the Aggregator.

use uftp_messages::messages::{
    DPrognosisResponse, FlexOfferResponse, FlexOfferRevocationResponse, FlexOrder, FlexRequest,
    FlexReservationUpdate, FlexSettlement, MeteringResponse,
};
use uftp_messages::{Role, UftpMessage};

use crate::client::{ClientParams, UftpClient};
use crate::Result;

/// DSO → AGR client.
#[derive(Clone)]
pub struct DsoAgrClient {
    inner: UftpClient,
}

impl DsoAgrClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        Ok(Self {
            inner: UftpClient::new(Role::Dso, Role::Agr, params)?,
        })
    }

    /// The underlying generic client, for queued delivery.
    pub fn client(&self) -> &UftpClient {
        &self.inner
    }

    /// Confirm reception of a D-Prognosis.
    pub async fn send_d_prognosis_response(
        &self,
        message: DPrognosisResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::DPrognosisResponse(message))
            .await
    }

    /// FlexRequest messages request flexibility from an AGR. Besides the
    /// rows with `Disposition=Requested`, the message should include the
    /// remaining ISPs of the period with `Disposition=Available`.
    pub async fn send_flex_request(&self, message: FlexRequest) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::FlexRequest(message)).await
    }

    /// Confirm reception of a FlexOffer.
    pub async fn send_flex_offer_response(
        &self,
        message: FlexOfferResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexOfferResponse(message))
            .await
    }

    /// FlexOrder messages purchase flexibility based on a previous
    /// FlexOffer. The ISP list must be copied from the chosen offer
    /// option without modification; AGR implementations must reject
    /// orders whose ISP list differs from the offer.
    pub async fn send_flex_order(&self, message: FlexOrder) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::FlexOrder(message)).await
    }

    /// For bilateral contracts, signal which part of the contracted
    /// volume is still reserved per ISP.
    pub async fn send_flex_reservation_update(
        &self,
        message: FlexReservationUpdate,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexReservationUpdate(message))
            .await
    }

    /// Initiate settlement for all FlexOrders of a settlement period,
    /// typically monthly.
    pub async fn send_flex_settlement(
        &self,
        message: FlexSettlement,
    ) -> Result<Option<UftpMessage>> {
        self.inner.send(UftpMessage::FlexSettlement(message)).await
    }

    /// Reply to a FlexOfferRevocation, indicating whether the revocation
    /// was handled successfully.
    pub async fn send_flex_offer_revocation_response(
        &self,
        message: FlexOfferRevocationResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::FlexOfferRevocationResponse(message))
            .await
    }

    /// Confirm reception of metering data.
    pub async fn send_metering_response(
        &self,
        message: MeteringResponse,
    ) -> Result<Option<UftpMessage>> {
        self.inner
            .send(UftpMessage::MeteringResponse(message))
            .await
    }
}
