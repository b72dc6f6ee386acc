//! FlexReservationUpdate: for bilateral contracts, the DSO signals which
//! part of the contracted volume is still reserved per ISP. Zero power
//! means nothing is reserved for that ISP.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_flex_payload, uftp_response, Flex, Payload};
use crate::validations as v;

/// One reservation row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexReservationUpdateIsp {
    /// Remaining reserved power for this ISP in Watts.
    #[serde(rename = "@Power")]
    pub power: i64,
    /// Number of the first ISP this row refers to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// How many consecutive ISPs this row represents.
    #[serde(rename = "@Duration", default = "crate::payload::default_duration")]
    pub duration: u32,
}

uftp_flex_payload! {
    /// Update of the reserved part of a bilateral contract.
    pub struct FlexReservationUpdate {
        /// Reference to the bilateral contract in question.
        #[serde(rename = "@ContractID")]
        pub contract_id: String,
        /// Message reference assigned by the DSO.
        #[serde(rename = "@Reference")]
        pub reference: String,
        #[serde(rename = "ISP", default)]
        pub isps: Vec<FlexReservationUpdateIsp>,
    }
}

impl FlexReservationUpdate {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        self.validate_flex()?;
        v::validate_isp_series("isps", self.isps.iter().map(|isp| (isp.start, isp.duration)))
    }
}

uftp_response! {
    /// Reply to a [`FlexReservationUpdate`].
    pub struct FlexReservationUpdateResponse {
        /// MessageID of the FlexReservationUpdate being answered.
        #[serde(rename = "@FlexReservationUpdateMessageID")]
        pub flex_reservation_update_message_id: Uuid,
    }
}

impl FlexReservationUpdateResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}
