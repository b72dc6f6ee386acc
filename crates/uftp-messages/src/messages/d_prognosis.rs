//! D-Prognosis: the AGR communicates its demand prognosis per ISP to the
//! DSO. A prognosis always contains data for all ISPs of its period.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_flex_payload, uftp_response, Flex, Payload};
use crate::validations as v;

/// One prognosis row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DPrognosisIsp {
    /// Prognosed power for this ISP in Watts.
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
    /// Day-ahead or intraday demand prognosis, revised by resending with an
    /// incremented revision number.
    pub struct DPrognosis {
        /// Sequence number, incremented for each new revision of this
        /// prognosis.
        #[serde(rename = "@Revision")]
        pub revision: u32,
        #[serde(rename = "ISP", default)]
        pub isps: Vec<DPrognosisIsp>,
    }
}

impl DPrognosis {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        self.validate_flex()?;
        v::validate_isp_series("isps", self.isps.iter().map(|isp| (isp.start, isp.duration)))
    }
}

/// Validation status of a FlexOrder affected by a reduced prognosis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOrderStatus {
    /// MessageID of the FlexOrder in question.
    #[serde(rename = "@FlexOrderMessageID")]
    pub flex_order_message_id: Uuid,
    /// Whether the order is still considered valid by the DSO.
    #[serde(rename = "@IsValidated")]
    pub is_validated: bool,
}

uftp_response! {
    /// Reply to a [`DPrognosis`], optionally flagging FlexOrders whose
    /// validity is affected.
    pub struct DPrognosisResponse {
        /// MessageID of the D-Prognosis being answered.
        #[serde(rename = "@D-PrognosisMessageID")]
        pub d_prognosis_message_id: Uuid,
        #[serde(rename = "FlexOrderStatus", default)]
        pub flex_order_statuses: Vec<FlexOrderStatus>,
    }
}

impl DPrognosisResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}
