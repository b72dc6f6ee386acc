//! FlexOfferRevocation: the AGR voids a previously accepted FlexOffer,
//! even if its validity time has not yet expired. Revocation is not allowed
//! for offers that already have accepted FlexOrders.

use uuid::Uuid;

use crate::payload::{uftp_payload, uftp_response, Payload};

uftp_payload! {
    /// Revokes a previously sent FlexOffer.
    pub struct FlexOfferRevocation {
        /// MessageID of the FlexOffer being revoked; this offer must have
        /// been accepted previously.
        #[serde(rename = "@FlexOfferMessageID")]
        pub flex_offer_message_id: Uuid,
    }
}

impl FlexOfferRevocation {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

uftp_response! {
    /// Reply to a [`FlexOfferRevocation`].
    pub struct FlexOfferRevocationResponse {
        /// MessageID of the FlexOfferRevocation being answered.
        #[serde(rename = "@FlexOfferRevocationMessageID")]
        pub flex_offer_revocation_message_id: Uuid,
    }
}

impl FlexOfferRevocationResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}
