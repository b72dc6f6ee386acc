//! DSOPortfolioQuery: the DSO discovers which AGRs represent connections
//! on one of its registered congestion points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

uftp_payload! {
    /// Query for the AGR registrations on one congestion point.
    pub struct DsoPortfolioQuery {
        /// IANA time zone that applies to `Period`.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        /// The period the DSO requests portfolio information for.
        #[serde(rename = "@Period")]
        pub period: NaiveDate,
        /// EntityAddress of the congestion point.
        #[serde(rename = "@EntityAddress")]
        pub entity_address: String,
    }
}

impl DsoPortfolioQuery {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        v::check_pattern("EntityAddress", &self.entity_address, &v::ENTITY_ADDRESS)
    }
}

/// A connection on the queried congestion point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DsoPortfolioQueryConnection {
    /// EntityAddress of the connection.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    /// Internet domain of the AGR representing the prosumer on this
    /// connection, if any.
    #[serde(rename = "@AGR-Domain", default, skip_serializing_if = "Option::is_none")]
    pub agr_domain: Option<String>,
}

/// The queried congestion point and its connections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DsoPortfolioQueryCongestionPoint {
    /// EntityAddress of the congestion point.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    #[serde(rename = "Connection", default)]
    pub connections: Vec<DsoPortfolioQueryConnection>,
}

uftp_response! {
    /// The CRO's answer to a [`DsoPortfolioQuery`].
    pub struct DsoPortfolioQueryResponse {
        /// MessageID of the DSOPortfolioQuery being answered.
        #[serde(rename = "@DSOPortfolioQueryMessageID")]
        pub dso_portfolio_query_message_id: Uuid,
        /// IANA time zone that applies to `Period`.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        /// The period this answer is valid for.
        #[serde(rename = "@Period")]
        pub period: NaiveDate,
        /// The queried congestion point, when it is known to the CRO.
        #[serde(rename = "CongestionPoint", default, skip_serializing_if = "Option::is_none")]
        pub congestion_point: Option<DsoPortfolioQueryCongestionPoint>,
    }
}

impl DsoPortfolioQueryResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        if let Some(point) = &self.congestion_point {
            v::check_pattern("EntityAddress", &point.entity_address, &v::ENTITY_ADDRESS)?;
            v::validate_list("connections", &point.connections, 1)?;
            for connection in &point.connections {
                v::check_pattern(
                    "EntityAddress",
                    &connection.entity_address,
                    &v::ENTITY_ADDRESS,
                )?;
                if let Some(domain) = &connection.agr_domain {
                    v::check_pattern("AGR-Domain", domain, &v::DOMAIN)?;
                }
            }
        }
        Ok(())
    }
}
