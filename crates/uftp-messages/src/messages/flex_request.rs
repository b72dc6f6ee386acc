//! FlexRequest: the DSO asks AGRs for flexibility. Rows with
//! `Disposition=Requested` carry the actual need; the remaining ISPs of the
//! period are included with `Disposition=Available`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::AvailableRequested;
use crate::payload::{uftp_flex_payload, uftp_response, Flex, Payload};
use crate::validations as v;

/// One requested or available ISP row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexRequestIsp {
    /// Whether flexibility is actually requested for this row.
    #[serde(rename = "@Disposition", default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<AvailableRequested>,
    /// Lower bound of the requested power change in Watts.
    #[serde(rename = "@MinPower")]
    pub min_power: i64,
    /// Upper bound of the requested power change in Watts.
    #[serde(rename = "@MaxPower")]
    pub max_power: i64,
    /// Number of the first ISP this row refers to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// How many consecutive ISPs this row represents.
    #[serde(rename = "@Duration", default = "crate::payload::default_duration")]
    pub duration: u32,
}

uftp_flex_payload! {
    /// Request for flexibility on a congestion point, revised by resending
    /// with an incremented revision number.
    pub struct FlexRequest {
        /// Sequence number, incremented for each new revision.
        #[serde(rename = "@Revision")]
        pub revision: u32,
        /// Moment until which this request is valid.
        #[serde(rename = "@ExpirationDateTime")]
        pub expiration_date_time: DateTime<FixedOffset>,
        /// Reference to the concerning contract, if applicable.
        #[serde(rename = "@ContractID", default, skip_serializing_if = "Option::is_none")]
        pub contract_id: Option<String>,
        /// Service type for this request, if the contract distinguishes
        /// several.
        #[serde(rename = "@ServiceType", default, skip_serializing_if = "Option::is_none")]
        pub service_type: Option<String>,
        #[serde(rename = "ISP", default)]
        pub isps: Vec<FlexRequestIsp>,
    }
}

impl FlexRequest {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        self.validate_flex()?;
        v::validate_isp_series("isps", self.isps.iter().map(|isp| (isp.start, isp.duration)))
    }
}

uftp_response! {
    /// Reply to a [`FlexRequest`].
    pub struct FlexRequestResponse {
        /// MessageID of the FlexRequest being answered.
        #[serde(rename = "@FlexRequestMessageID")]
        pub flex_request_message_id: Uuid,
    }
}

impl FlexRequestResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_flex_request_validation() {
        let mut request = FlexRequest {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: crate::IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-06-01".parse().expect("date"),
            congestion_point: "ea1.2023-01.example.com:point-1".to_string(),
            revision: 1,
            expiration_date_time: "2023-06-01T12:00:00+02:00".parse().expect("timestamp"),
            contract_id: None,
            service_type: None,
            isps: vec![FlexRequestIsp {
                disposition: Some(AvailableRequested::Requested),
                min_power: -500_000,
                max_power: 0,
                start: 1,
                duration: 96,
            }],
        };
        request.fill(&MessageFill::now("dso.dev", "agr.dev"));
        assert!(request.validate().is_ok());

        request.congestion_point = "not-an-address".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_isp_list_rejected() {
        let mut request = FlexRequest {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: crate::IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-06-01".parse().expect("date"),
            congestion_point: "ean.123456789012".to_string(),
            revision: 1,
            expiration_date_time: "2023-06-01T12:00:00+02:00".parse().expect("timestamp"),
            contract_id: None,
            service_type: None,
            isps: Vec::new(),
        };
        request.fill(&MessageFill::now("dso.dev", "agr.dev"));
        assert!(request.validate().is_err());
    }
}
