//! AGRPortfolioUpdate: the AGR tells the CRO on which connections it
//! represents prosumers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

/// A connection that the AGR wants the CRO to update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgrPortfolioUpdateConnection {
    /// EntityAddress of the connection being updated.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    /// First period the AGR represents the prosumer at this connection.
    #[serde(rename = "@StartPeriod")]
    pub start_period: NaiveDate,
    /// Last period the AGR represents the prosumer at this connection,
    /// if applicable.
    #[serde(rename = "@EndPeriod", default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<NaiveDate>,
}

uftp_payload! {
    /// Used by the AGR to indicate on which connections it represents
    /// prosumers.
    pub struct AgrPortfolioUpdate {
        /// IANA time zone that applies to the periods in this message.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        #[serde(rename = "Connection", default)]
        pub connections: Vec<AgrPortfolioUpdateConnection>,
    }
}

impl AgrPortfolioUpdate {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        v::validate_list("connections", &self.connections, 1)?;
        for connection in &self.connections {
            v::check_pattern(
                "EntityAddress",
                &connection.entity_address,
                &v::ENTITY_ADDRESS,
            )?;
        }
        Ok(())
    }
}

uftp_response! {
    /// Status reply to an [`AgrPortfolioUpdate`].
    pub struct AgrPortfolioUpdateResponse {
        /// MessageID of the AGRPortfolioUpdate being answered.
        #[serde(rename = "@AGRPortfolioUpdateMessageID")]
        pub agr_portfolio_update_message_id: Uuid,
    }
}

impl AgrPortfolioUpdateResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> AgrPortfolioUpdate {
        AgrPortfolioUpdate {
            version: "3.0.0".to_string(),
            sender_domain: Some("agr.dev".to_string()),
            recipient_domain: Some("cro.dev".to_string()),
            time_stamp: Some("2023-01-01T12:00:00+00:00".parse().expect("timestamp")),
            message_id: Some(Uuid::new_v4()),
            conversation_id: Some(Uuid::new_v4()),
            time_zone: "Europe/Amsterdam".to_string(),
            connections: vec![AgrPortfolioUpdateConnection {
                entity_address: "ean.123456789012".to_string(),
                start_period: "2023-01-01".parse().expect("date"),
                end_period: None,
            }],
        }
    }

    #[test]
    fn test_valid_update() {
        assert!(update().validate().is_ok());
    }

    #[test]
    fn test_empty_connection_list_rejected() {
        let mut msg = update();
        msg.connections.clear();
        assert!(msg.validate().is_err());
    }

    #[test]
    fn test_bad_entity_address_rejected() {
        let mut msg = update();
        msg.connections[0].entity_address = "ean.123".to_string();
        assert!(msg.validate().is_err());
    }

    #[test]
    fn test_missing_message_id_rejected() {
        let mut msg = update();
        msg.message_id = None;
        assert!(msg.validate().is_err());
    }
}
