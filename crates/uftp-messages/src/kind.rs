//! The [`UftpMessage`] union over every business message kind, the
//! [`MessageKind`] tag, and the static routing matrix.
//!
//! The routing matrix is authoritative: it says which role sends which kind
//! to which role, which kinds a service of a given role accepts inbound,
//! and which response kind answers which request kind. The
//! [`build_rejection`] helper uses it to construct the `Result=Rejected`
//! response for a functionally invalid request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::enums::{AcceptedDisputed, AcceptedRejected, Role};
use crate::messages::*;
use crate::payload::{MessageFill, Payload, Response};

/// Any UFTP business message. The serde variant names are the XML root
/// element names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UftpMessage {
    #[serde(rename = "AGRPortfolioQuery")]
    AgrPortfolioQuery(AgrPortfolioQuery),
    #[serde(rename = "AGRPortfolioQueryResponse")]
    AgrPortfolioQueryResponse(AgrPortfolioQueryResponse),
    #[serde(rename = "AGRPortfolioUpdate")]
    AgrPortfolioUpdate(AgrPortfolioUpdate),
    #[serde(rename = "AGRPortfolioUpdateResponse")]
    AgrPortfolioUpdateResponse(AgrPortfolioUpdateResponse),
    #[serde(rename = "DSOPortfolioQuery")]
    DsoPortfolioQuery(DsoPortfolioQuery),
    #[serde(rename = "DSOPortfolioQueryResponse")]
    DsoPortfolioQueryResponse(DsoPortfolioQueryResponse),
    #[serde(rename = "DSOPortfolioUpdate")]
    DsoPortfolioUpdate(DsoPortfolioUpdate),
    #[serde(rename = "DSOPortfolioUpdateResponse")]
    DsoPortfolioUpdateResponse(DsoPortfolioUpdateResponse),
    #[serde(rename = "D-Prognosis")]
    DPrognosis(DPrognosis),
    #[serde(rename = "D-PrognosisResponse")]
    DPrognosisResponse(DPrognosisResponse),
    #[serde(rename = "FlexRequest")]
    FlexRequest(FlexRequest),
    #[serde(rename = "FlexRequestResponse")]
    FlexRequestResponse(FlexRequestResponse),
    #[serde(rename = "FlexOffer")]
    FlexOffer(FlexOffer),
    #[serde(rename = "FlexOfferResponse")]
    FlexOfferResponse(FlexOfferResponse),
    #[serde(rename = "FlexOfferRevocation")]
    FlexOfferRevocation(FlexOfferRevocation),
    #[serde(rename = "FlexOfferRevocationResponse")]
    FlexOfferRevocationResponse(FlexOfferRevocationResponse),
    #[serde(rename = "FlexOrder")]
    FlexOrder(FlexOrder),
    #[serde(rename = "FlexOrderResponse")]
    FlexOrderResponse(FlexOrderResponse),
    #[serde(rename = "FlexReservationUpdate")]
    FlexReservationUpdate(FlexReservationUpdate),
    #[serde(rename = "FlexReservationUpdateResponse")]
    FlexReservationUpdateResponse(FlexReservationUpdateResponse),
    #[serde(rename = "FlexSettlement")]
    FlexSettlement(FlexSettlement),
    #[serde(rename = "FlexSettlementResponse")]
    FlexSettlementResponse(FlexSettlementResponse),
    #[serde(rename = "Metering")]
    Metering(Metering),
    #[serde(rename = "MeteringResponse")]
    MeteringResponse(MeteringResponse),
}

/// Run an expression against the payload inside any [`UftpMessage`].
macro_rules! with_payload {
    ($value:expr, $msg:ident => $body:expr) => {
        match $value {
            UftpMessage::AgrPortfolioQuery($msg) => $body,
            UftpMessage::AgrPortfolioQueryResponse($msg) => $body,
            UftpMessage::AgrPortfolioUpdate($msg) => $body,
            UftpMessage::AgrPortfolioUpdateResponse($msg) => $body,
            UftpMessage::DsoPortfolioQuery($msg) => $body,
            UftpMessage::DsoPortfolioQueryResponse($msg) => $body,
            UftpMessage::DsoPortfolioUpdate($msg) => $body,
            UftpMessage::DsoPortfolioUpdateResponse($msg) => $body,
            UftpMessage::DPrognosis($msg) => $body,
            UftpMessage::DPrognosisResponse($msg) => $body,
            UftpMessage::FlexRequest($msg) => $body,
            UftpMessage::FlexRequestResponse($msg) => $body,
            UftpMessage::FlexOffer($msg) => $body,
            UftpMessage::FlexOfferResponse($msg) => $body,
            UftpMessage::FlexOfferRevocation($msg) => $body,
            UftpMessage::FlexOfferRevocationResponse($msg) => $body,
            UftpMessage::FlexOrder($msg) => $body,
            UftpMessage::FlexOrderResponse($msg) => $body,
            UftpMessage::FlexReservationUpdate($msg) => $body,
            UftpMessage::FlexReservationUpdateResponse($msg) => $body,
            UftpMessage::FlexSettlement($msg) => $body,
            UftpMessage::FlexSettlementResponse($msg) => $body,
            UftpMessage::Metering($msg) => $body,
            UftpMessage::MeteringResponse($msg) => $body,
        }
    };
}

impl UftpMessage {
    /// The tag of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            UftpMessage::AgrPortfolioQuery(_) => MessageKind::AgrPortfolioQuery,
            UftpMessage::AgrPortfolioQueryResponse(_) => MessageKind::AgrPortfolioQueryResponse,
            UftpMessage::AgrPortfolioUpdate(_) => MessageKind::AgrPortfolioUpdate,
            UftpMessage::AgrPortfolioUpdateResponse(_) => MessageKind::AgrPortfolioUpdateResponse,
            UftpMessage::DsoPortfolioQuery(_) => MessageKind::DsoPortfolioQuery,
            UftpMessage::DsoPortfolioQueryResponse(_) => MessageKind::DsoPortfolioQueryResponse,
            UftpMessage::DsoPortfolioUpdate(_) => MessageKind::DsoPortfolioUpdate,
            UftpMessage::DsoPortfolioUpdateResponse(_) => MessageKind::DsoPortfolioUpdateResponse,
            UftpMessage::DPrognosis(_) => MessageKind::DPrognosis,
            UftpMessage::DPrognosisResponse(_) => MessageKind::DPrognosisResponse,
            UftpMessage::FlexRequest(_) => MessageKind::FlexRequest,
            UftpMessage::FlexRequestResponse(_) => MessageKind::FlexRequestResponse,
            UftpMessage::FlexOffer(_) => MessageKind::FlexOffer,
            UftpMessage::FlexOfferResponse(_) => MessageKind::FlexOfferResponse,
            UftpMessage::FlexOfferRevocation(_) => MessageKind::FlexOfferRevocation,
            UftpMessage::FlexOfferRevocationResponse(_) => {
                MessageKind::FlexOfferRevocationResponse
            }
            UftpMessage::FlexOrder(_) => MessageKind::FlexOrder,
            UftpMessage::FlexOrderResponse(_) => MessageKind::FlexOrderResponse,
            UftpMessage::FlexReservationUpdate(_) => MessageKind::FlexReservationUpdate,
            UftpMessage::FlexReservationUpdateResponse(_) => {
                MessageKind::FlexReservationUpdateResponse
            }
            UftpMessage::FlexSettlement(_) => MessageKind::FlexSettlement,
            UftpMessage::FlexSettlementResponse(_) => MessageKind::FlexSettlementResponse,
            UftpMessage::Metering(_) => MessageKind::Metering,
            UftpMessage::MeteringResponse(_) => MessageKind::MeteringResponse,
        }
    }

    /// Validate the payload, including its common attributes.
    pub fn validate(&self) -> crate::Result<()> {
        with_payload!(self, msg => msg.validate())
    }

    /// A view of the common response attributes, when this is a response
    /// kind.
    pub fn as_response(&self) -> Option<&dyn Response> {
        match self {
            UftpMessage::AgrPortfolioQueryResponse(msg) => Some(msg),
            UftpMessage::AgrPortfolioUpdateResponse(msg) => Some(msg),
            UftpMessage::DsoPortfolioQueryResponse(msg) => Some(msg),
            UftpMessage::DsoPortfolioUpdateResponse(msg) => Some(msg),
            UftpMessage::DPrognosisResponse(msg) => Some(msg),
            UftpMessage::FlexRequestResponse(msg) => Some(msg),
            UftpMessage::FlexOfferResponse(msg) => Some(msg),
            UftpMessage::FlexOfferRevocationResponse(msg) => Some(msg),
            UftpMessage::FlexOrderResponse(msg) => Some(msg),
            UftpMessage::FlexReservationUpdateResponse(msg) => Some(msg),
            UftpMessage::FlexSettlementResponse(msg) => Some(msg),
            UftpMessage::MeteringResponse(msg) => Some(msg),
            _ => None,
        }
    }
}

impl Payload for UftpMessage {
    fn version(&self) -> &str {
        with_payload!(self, msg => msg.version())
    }

    fn sender_domain(&self) -> Option<&str> {
        with_payload!(self, msg => msg.sender_domain())
    }

    fn recipient_domain(&self) -> Option<&str> {
        with_payload!(self, msg => msg.recipient_domain())
    }

    fn time_stamp(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        with_payload!(self, msg => msg.time_stamp())
    }

    fn message_id(&self) -> Option<uuid::Uuid> {
        with_payload!(self, msg => msg.message_id())
    }

    fn conversation_id(&self) -> Option<uuid::Uuid> {
        with_payload!(self, msg => msg.conversation_id())
    }

    fn set_conversation_id(&mut self, id: uuid::Uuid) {
        with_payload!(self, msg => msg.set_conversation_id(id))
    }

    fn set_message_id(&mut self, id: Option<uuid::Uuid>) {
        with_payload!(self, msg => msg.set_message_id(id))
    }

    fn set_time_stamp(&mut self, time_stamp: Option<chrono::DateTime<chrono::FixedOffset>>) {
        with_payload!(self, msg => msg.set_time_stamp(time_stamp))
    }

    fn fill(&mut self, fill: &MessageFill) {
        with_payload!(self, msg => msg.fill(fill))
    }

    fn validate_common(&self) -> crate::Result<()> {
        with_payload!(self, msg => msg.validate_common())
    }
}

/// A sender/recipient role pair from the routing matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub sender: Role,
    pub recipient: Role,
}

/// Tag identifying one of the 24 message kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    AgrPortfolioQuery,
    AgrPortfolioQueryResponse,
    AgrPortfolioUpdate,
    AgrPortfolioUpdateResponse,
    DsoPortfolioQuery,
    DsoPortfolioQueryResponse,
    DsoPortfolioUpdate,
    DsoPortfolioUpdateResponse,
    DPrognosis,
    DPrognosisResponse,
    FlexRequest,
    FlexRequestResponse,
    FlexOffer,
    FlexOfferResponse,
    FlexOfferRevocation,
    FlexOfferRevocationResponse,
    FlexOrder,
    FlexOrderResponse,
    FlexReservationUpdate,
    FlexReservationUpdateResponse,
    FlexSettlement,
    FlexSettlementResponse,
    Metering,
    MeteringResponse,
}

impl MessageKind {
    /// Every message kind, in schema order.
    pub const ALL: [MessageKind; 24] = [
        MessageKind::AgrPortfolioQuery,
        MessageKind::AgrPortfolioQueryResponse,
        MessageKind::AgrPortfolioUpdate,
        MessageKind::AgrPortfolioUpdateResponse,
        MessageKind::DsoPortfolioQuery,
        MessageKind::DsoPortfolioQueryResponse,
        MessageKind::DsoPortfolioUpdate,
        MessageKind::DsoPortfolioUpdateResponse,
        MessageKind::DPrognosis,
        MessageKind::DPrognosisResponse,
        MessageKind::FlexRequest,
        MessageKind::FlexRequestResponse,
        MessageKind::FlexOffer,
        MessageKind::FlexOfferResponse,
        MessageKind::FlexOfferRevocation,
        MessageKind::FlexOfferRevocationResponse,
        MessageKind::FlexOrder,
        MessageKind::FlexOrderResponse,
        MessageKind::FlexReservationUpdate,
        MessageKind::FlexReservationUpdateResponse,
        MessageKind::FlexSettlement,
        MessageKind::FlexSettlementResponse,
        MessageKind::Metering,
        MessageKind::MeteringResponse,
    ];

    /// The CamelCase kind name, as used in rejection reasons and handler
    /// naming.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::AgrPortfolioQuery => "AgrPortfolioQuery",
            MessageKind::AgrPortfolioQueryResponse => "AgrPortfolioQueryResponse",
            MessageKind::AgrPortfolioUpdate => "AgrPortfolioUpdate",
            MessageKind::AgrPortfolioUpdateResponse => "AgrPortfolioUpdateResponse",
            MessageKind::DsoPortfolioQuery => "DsoPortfolioQuery",
            MessageKind::DsoPortfolioQueryResponse => "DsoPortfolioQueryResponse",
            MessageKind::DsoPortfolioUpdate => "DsoPortfolioUpdate",
            MessageKind::DsoPortfolioUpdateResponse => "DsoPortfolioUpdateResponse",
            MessageKind::DPrognosis => "DPrognosis",
            MessageKind::DPrognosisResponse => "DPrognosisResponse",
            MessageKind::FlexRequest => "FlexRequest",
            MessageKind::FlexRequestResponse => "FlexRequestResponse",
            MessageKind::FlexOffer => "FlexOffer",
            MessageKind::FlexOfferResponse => "FlexOfferResponse",
            MessageKind::FlexOfferRevocation => "FlexOfferRevocation",
            MessageKind::FlexOfferRevocationResponse => "FlexOfferRevocationResponse",
            MessageKind::FlexOrder => "FlexOrder",
            MessageKind::FlexOrderResponse => "FlexOrderResponse",
            MessageKind::FlexReservationUpdate => "FlexReservationUpdate",
            MessageKind::FlexReservationUpdateResponse => "FlexReservationUpdateResponse",
            MessageKind::FlexSettlement => "FlexSettlement",
            MessageKind::FlexSettlementResponse => "FlexSettlementResponse",
            MessageKind::Metering => "Metering",
            MessageKind::MeteringResponse => "MeteringResponse",
        }
    }

    /// The XML root element name of this kind.
    pub fn xml_name(self) -> &'static str {
        match self {
            MessageKind::AgrPortfolioQuery => "AGRPortfolioQuery",
            MessageKind::AgrPortfolioQueryResponse => "AGRPortfolioQueryResponse",
            MessageKind::AgrPortfolioUpdate => "AGRPortfolioUpdate",
            MessageKind::AgrPortfolioUpdateResponse => "AGRPortfolioUpdateResponse",
            MessageKind::DsoPortfolioQuery => "DSOPortfolioQuery",
            MessageKind::DsoPortfolioQueryResponse => "DSOPortfolioQueryResponse",
            MessageKind::DsoPortfolioUpdate => "DSOPortfolioUpdate",
            MessageKind::DsoPortfolioUpdateResponse => "DSOPortfolioUpdateResponse",
            MessageKind::DPrognosis => "D-Prognosis",
            MessageKind::DPrognosisResponse => "D-PrognosisResponse",
            other => other.name(),
        }
    }

    /// The snake_case kind name, used for handler and log labels.
    pub fn snake_name(self) -> String {
        snake_case(self.name())
    }

    /// Whether this kind carries the common response attributes.
    pub fn is_response(self) -> bool {
        self.response_kind().is_none()
    }

    /// The response kind answering this request kind, if this is a request.
    pub fn response_kind(self) -> Option<MessageKind> {
        match self {
            MessageKind::AgrPortfolioQuery => Some(MessageKind::AgrPortfolioQueryResponse),
            MessageKind::AgrPortfolioUpdate => Some(MessageKind::AgrPortfolioUpdateResponse),
            MessageKind::DsoPortfolioQuery => Some(MessageKind::DsoPortfolioQueryResponse),
            MessageKind::DsoPortfolioUpdate => Some(MessageKind::DsoPortfolioUpdateResponse),
            MessageKind::DPrognosis => Some(MessageKind::DPrognosisResponse),
            MessageKind::FlexRequest => Some(MessageKind::FlexRequestResponse),
            MessageKind::FlexOffer => Some(MessageKind::FlexOfferResponse),
            MessageKind::FlexOfferRevocation => Some(MessageKind::FlexOfferRevocationResponse),
            MessageKind::FlexOrder => Some(MessageKind::FlexOrderResponse),
            MessageKind::FlexReservationUpdate => {
                Some(MessageKind::FlexReservationUpdateResponse)
            }
            MessageKind::FlexSettlement => Some(MessageKind::FlexSettlementResponse),
            MessageKind::Metering => Some(MessageKind::MeteringResponse),
            _ => None,
        }
    }

    /// The sender and recipient roles for this kind.
    pub fn routing(self) -> Route {
        use MessageKind::*;
        use Role::{Agr, Cro, Dso};
        let (sender, recipient) = match self {
            AgrPortfolioQuery | AgrPortfolioUpdate => (Agr, Cro),
            AgrPortfolioQueryResponse | AgrPortfolioUpdateResponse => (Cro, Agr),
            DsoPortfolioQuery | DsoPortfolioUpdate => (Dso, Cro),
            DsoPortfolioQueryResponse | DsoPortfolioUpdateResponse => (Cro, Dso),
            DPrognosis | FlexOffer | FlexOfferRevocation | Metering | FlexRequestResponse
            | FlexOrderResponse | FlexReservationUpdateResponse | FlexSettlementResponse => {
                (Agr, Dso)
            }
            FlexRequest | FlexOrder | FlexReservationUpdate | FlexSettlement
            | DPrognosisResponse | FlexOfferResponse | FlexOfferRevocationResponse
            | MeteringResponse => (Dso, Agr),
        };
        Route { sender, recipient }
    }

    /// The kinds a service of the given role accepts inbound. The
    /// invariant `routing(k).recipient == role` holds for every entry.
    pub fn acceptable_messages(role: Role) -> &'static [MessageKind] {
        match role {
            Role::Agr => &[
                MessageKind::AgrPortfolioQueryResponse,
                MessageKind::AgrPortfolioUpdateResponse,
                MessageKind::DPrognosisResponse,
                MessageKind::FlexOfferResponse,
                MessageKind::FlexOfferRevocationResponse,
                MessageKind::FlexOrder,
                MessageKind::FlexRequest,
                MessageKind::FlexReservationUpdate,
                MessageKind::FlexSettlement,
                MessageKind::MeteringResponse,
            ],
            Role::Cro => &[
                MessageKind::AgrPortfolioQuery,
                MessageKind::AgrPortfolioUpdate,
                MessageKind::DsoPortfolioQuery,
                MessageKind::DsoPortfolioUpdate,
            ],
            Role::Dso => &[
                MessageKind::DPrognosis,
                MessageKind::DsoPortfolioQueryResponse,
                MessageKind::DsoPortfolioUpdateResponse,
                MessageKind::FlexOffer,
                MessageKind::FlexOfferRevocation,
                MessageKind::FlexOrderResponse,
                MessageKind::FlexRequestResponse,
                MessageKind::FlexReservationUpdateResponse,
                MessageKind::FlexSettlementResponse,
                MessageKind::Metering,
            ],
        }
    }
}

/// Convert CamelCase to snake_case: `FlexOffer` becomes `flex_offer`,
/// `HTTPRequest` becomes `http_request`.
pub fn snake_case(text: &str) -> String {
    static CAMEL_BOUNDARY: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(.)([A-Z][a-z])").expect("valid camel boundary pattern"));
    CAMEL_BOUNDARY
        .replace_all(text, "${1}_${2}")
        .to_lowercase()
}

/// Build the `Result=Rejected` response for a functionally invalid
/// message.
///
/// For a request kind the paired response kind is constructed, with the
/// typed `<Kind>MessageID` attribute referencing the offending message.
/// For a response kind the same kind is echoed back with fresh
/// identifiers. In both cases the rejection copies the conversation
/// identifier, references the offending message in `ReferenceMessageID`
/// and carries the human-readable reason.
///
/// Returns `None` when the offending message lacks its identifiers, or
/// when it is itself a rejection (answering a rejection with another
/// rejection would bounce between two conforming endpoints forever).
pub fn build_rejection(original: &UftpMessage, reason: &str) -> Option<UftpMessage> {
    let message_id = original.message_id()?;
    let conversation_id = original.conversation_id()?;
    if let Some(response) = original.as_response() {
        if response.result() == AcceptedRejected::Rejected {
            return None;
        }
    }
    let reason = reason.to_string();

    let mut rejection = match original {
        UftpMessage::AgrPortfolioQuery(query) => {
            UftpMessage::AgrPortfolioQueryResponse(AgrPortfolioQueryResponse {
                agr_portfolio_query_message_id: message_id,
                time_zone: query.time_zone.clone(),
                period: query.period,
                ..Default::default()
            })
        }
        UftpMessage::AgrPortfolioUpdate(_) => {
            UftpMessage::AgrPortfolioUpdateResponse(AgrPortfolioUpdateResponse {
                agr_portfolio_update_message_id: message_id,
                ..Default::default()
            })
        }
        UftpMessage::DsoPortfolioQuery(query) => {
            UftpMessage::DsoPortfolioQueryResponse(DsoPortfolioQueryResponse {
                dso_portfolio_query_message_id: message_id,
                time_zone: query.time_zone.clone(),
                period: query.period,
                ..Default::default()
            })
        }
        UftpMessage::DsoPortfolioUpdate(_) => {
            UftpMessage::DsoPortfolioUpdateResponse(DsoPortfolioUpdateResponse {
                dso_portfolio_update_message_id: message_id,
                ..Default::default()
            })
        }
        UftpMessage::DPrognosis(_) => UftpMessage::DPrognosisResponse(DPrognosisResponse {
            d_prognosis_message_id: message_id,
            ..Default::default()
        }),
        UftpMessage::FlexRequest(_) => UftpMessage::FlexRequestResponse(FlexRequestResponse {
            flex_request_message_id: message_id,
            ..Default::default()
        }),
        UftpMessage::FlexOffer(_) => UftpMessage::FlexOfferResponse(FlexOfferResponse {
            flex_offer_message_id: message_id,
            ..Default::default()
        }),
        UftpMessage::FlexOfferRevocation(_) => {
            UftpMessage::FlexOfferRevocationResponse(FlexOfferRevocationResponse {
                flex_offer_revocation_message_id: message_id,
                ..Default::default()
            })
        }
        UftpMessage::FlexOrder(_) => UftpMessage::FlexOrderResponse(FlexOrderResponse {
            flex_order_message_id: message_id,
            ..Default::default()
        }),
        UftpMessage::FlexReservationUpdate(_) => {
            UftpMessage::FlexReservationUpdateResponse(FlexReservationUpdateResponse {
                flex_reservation_update_message_id: message_id,
                ..Default::default()
            })
        }
        UftpMessage::FlexSettlement(settlement) => {
            // A rejected settlement marks every order settlement as under
            // dispute, so the DSO can follow up per order.
            let statuses = settlement
                .flex_order_settlements
                .iter()
                .map(|order| FlexOrderSettlementStatus {
                    order_reference: order.order_reference.clone(),
                    disposition: AcceptedDisputed::Disputed,
                    dispute_reason: Some(reason.clone()),
                })
                .collect();
            UftpMessage::FlexSettlementResponse(FlexSettlementResponse {
                flex_settlement_message_id: message_id,
                flex_order_settlement_statuses: statuses,
                ..Default::default()
            })
        }
        UftpMessage::Metering(_) => UftpMessage::MeteringResponse(MeteringResponse {
            metering_message_id: message_id,
            ..Default::default()
        }),
        // Response kinds are echoed back as the same kind.
        other => other.clone(),
    };

    match &mut rejection {
        UftpMessage::AgrPortfolioQueryResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::AgrPortfolioUpdateResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::DsoPortfolioQueryResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::DsoPortfolioUpdateResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::DPrognosisResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexRequestResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexOfferResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexOfferRevocationResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexOrderResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexReservationUpdateResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::FlexSettlementResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        UftpMessage::MeteringResponse(r) => {
            r.result = AcceptedRejected::Rejected;
            r.rejection_reason = Some(reason.clone());
            r.reference_message_id = Some(message_id);
        }
        _ => {}
    }

    rejection.set_message_id(None);
    rejection.set_time_stamp(None);
    rejection.set_conversation_id(conversation_id);
    Some(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("FlexOffer"), "flex_offer");
        assert_eq!(snake_case("AgrPortfolioUpdate"), "agr_portfolio_update");
        assert_eq!(snake_case("HTTPRequest"), "http_request");
        assert_eq!(snake_case("DPrognosis"), "d_prognosis");
    }

    #[test]
    fn test_every_kind_is_routed_to_an_accepting_role() {
        for kind in MessageKind::ALL {
            let route = kind.routing();
            assert_ne!(route.sender, route.recipient, "{kind:?} routes to itself");
            assert!(
                MessageKind::acceptable_messages(route.recipient).contains(&kind),
                "{kind:?} is not acceptable to its recipient {:?}",
                route.recipient
            );
        }
    }

    #[test]
    fn test_acceptable_kinds_route_back_to_their_role() {
        for role in [Role::Agr, Role::Cro, Role::Dso] {
            for kind in MessageKind::acceptable_messages(role) {
                assert_eq!(kind.routing().recipient, role);
            }
        }
    }

    #[test]
    fn test_request_response_pairs() {
        let requests: Vec<MessageKind> = MessageKind::ALL
            .into_iter()
            .filter(|kind| kind.response_kind().is_some())
            .collect();
        assert_eq!(requests.len(), 12);
        for request in requests {
            let response = request.response_kind().expect("request kind");
            // A response is routed in the opposite direction.
            assert_eq!(request.routing().sender, response.routing().recipient);
            assert_eq!(request.routing().recipient, response.routing().sender);
            assert!(response.response_kind().is_none());
        }
    }

    #[test]
    fn test_build_rejection_for_portfolio_update() {
        let message_id = Uuid::new_v4();
        let conversation_id = Uuid::new_v4();
        let original = UftpMessage::AgrPortfolioUpdate(AgrPortfolioUpdate {
            version: "3.0.0".to_string(),
            sender_domain: Some("agr.dev".to_string()),
            recipient_domain: Some("cro.dev".to_string()),
            time_stamp: Some("2023-01-01T12:00:00Z".parse().expect("timestamp")),
            message_id: Some(message_id),
            conversation_id: Some(conversation_id),
            time_zone: "Europe/Amsterdam".to_string(),
            connections: Vec::new(),
        });

        let rejection =
            build_rejection(&original, "Invalid Sender").expect("rejection for request kind");
        assert_eq!(rejection.kind(), MessageKind::AgrPortfolioUpdateResponse);
        assert_eq!(rejection.conversation_id(), Some(conversation_id));
        let response = rejection.as_response().expect("response view");
        assert_eq!(response.result(), AcceptedRejected::Rejected);
        assert_eq!(response.rejection_reason(), Some("Invalid Sender"));
        if let UftpMessage::AgrPortfolioUpdateResponse(r) = &rejection {
            assert_eq!(r.agr_portfolio_update_message_id, message_id);
        }
    }

    #[test]
    fn test_response_kinds_are_echoed_back() {
        let message_id = Uuid::new_v4();
        let response = UftpMessage::FlexRequestResponse(FlexRequestResponse {
            flex_request_message_id: Uuid::new_v4(),
            message_id: Some(message_id),
            conversation_id: Some(Uuid::new_v4()),
            ..Default::default()
        });
        let rejection = build_rejection(&response, "Invalid Message: 'FlexRequestResponse'")
            .expect("misdirected responses are answered");
        assert_eq!(rejection.kind(), MessageKind::FlexRequestResponse);
        // Fresh identifiers are generated at send time.
        assert_eq!(rejection.message_id(), None);
        let view = rejection.as_response().expect("response view");
        assert_eq!(view.result(), AcceptedRejected::Rejected);
        assert_eq!(view.reference_message_id(), Some(message_id));
    }

    #[test]
    fn test_rejections_are_never_rejected_again() {
        let rejected = UftpMessage::FlexRequestResponse(FlexRequestResponse {
            flex_request_message_id: Uuid::new_v4(),
            message_id: Some(Uuid::new_v4()),
            conversation_id: Some(Uuid::new_v4()),
            result: AcceptedRejected::Rejected,
            rejection_reason: Some("Invalid Sender".to_string()),
            ..Default::default()
        });
        assert!(build_rejection(&rejected, "Invalid Message").is_none());
    }
}
