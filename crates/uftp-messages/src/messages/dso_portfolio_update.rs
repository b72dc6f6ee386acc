//! DSOPortfolioUpdate: the DSO tells the CRO on which congestion points it
//! wants to engage in flexibility trading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::RedispatchBy;
use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

/// A connection that is part of an updated congestion point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DsoPortfolioUpdateConnection {
    /// EntityAddress of the connection.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    /// First period the connection is part of this congestion point.
    #[serde(rename = "@StartPeriod")]
    pub start_period: NaiveDate,
    /// Last period the connection is part of this congestion point.
    #[serde(rename = "@EndPeriod", default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<NaiveDate>,
}

/// A congestion point the DSO wants the CRO to register or update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DsoPortfolioUpdateCongestionPoint {
    /// EntityAddress of the congestion point.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    /// First period this congestion point is active.
    #[serde(rename = "@StartPeriod")]
    pub start_period: NaiveDate,
    /// Last period this congestion point is active, if applicable.
    #[serde(rename = "@EndPeriod", default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<NaiveDate>,
    /// Whether the DSO accepts mutually exclusive FlexOffers here.
    #[serde(rename = "@MutexOffersSupported")]
    pub mutex_offers_supported: bool,
    /// Which party is responsible for day-ahead redispatch.
    #[serde(rename = "@DayAheadRedispatchBy")]
    pub day_ahead_redispatch_by: RedispatchBy,
    /// Which party is responsible for intraday redispatch. Absent means no
    /// intraday trading on this congestion point.
    #[serde(rename = "@IntradayRedispatchBy", default, skip_serializing_if = "Option::is_none")]
    pub intraday_redispatch_by: Option<RedispatchBy>,
    #[serde(rename = "Connection", default)]
    pub connections: Vec<DsoPortfolioUpdateConnection>,
}

uftp_payload! {
    /// Registers the congestion points the DSO trades on.
    pub struct DsoPortfolioUpdate {
        /// IANA time zone that applies to the periods in this message.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        #[serde(rename = "CongestionPoint", default)]
        pub congestion_points: Vec<DsoPortfolioUpdateCongestionPoint>,
    }
}

impl DsoPortfolioUpdate {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        v::validate_list("congestion_points", &self.congestion_points, 1)?;
        for point in &self.congestion_points {
            v::check_pattern("EntityAddress", &point.entity_address, &v::ENTITY_ADDRESS)?;
            v::validate_list("connections", &point.connections, 1)?;
            for connection in &point.connections {
                v::check_pattern(
                    "EntityAddress",
                    &connection.entity_address,
                    &v::ENTITY_ADDRESS,
                )?;
            }
        }
        Ok(())
    }
}

uftp_response! {
    /// Status reply to a [`DsoPortfolioUpdate`].
    pub struct DsoPortfolioUpdateResponse {
        /// MessageID of the DSOPortfolioUpdate being answered.
        #[serde(rename = "@DSOPortfolioUpdateResponseMessageID")]
        pub dso_portfolio_update_message_id: Uuid,
    }
}

impl DsoPortfolioUpdateResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_update_requires_connections() {
        let mut update = DsoPortfolioUpdate {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            congestion_points: vec![DsoPortfolioUpdateCongestionPoint {
                entity_address: "ean.871685900012636543".to_string(),
                start_period: "2023-01-01".parse().expect("date"),
                end_period: None,
                mutex_offers_supported: false,
                day_ahead_redispatch_by: RedispatchBy::Dso,
                intraday_redispatch_by: None,
                connections: Vec::new(),
            }],
        };
        update.fill(&MessageFill::now("dso.dev", "cro.dev"));
        assert!(update.validate().is_err());

        update.congestion_points[0]
            .connections
            .push(DsoPortfolioUpdateConnection {
                entity_address: "ean.123456789012".to_string(),
                start_period: "2023-01-01".parse().expect("date"),
                end_period: None,
            });
        assert!(update.validate().is_ok());
    }
}
