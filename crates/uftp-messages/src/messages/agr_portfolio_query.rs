//! AGRPortfolioQuery: the AGR retrieves additional information on its
//! connections from the CRO.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::RedispatchBy;
use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

uftp_payload! {
    /// Used by the AGR to retrieve the registered state of its portfolio
    /// for one period.
    pub struct AgrPortfolioQuery {
        /// IANA time zone that applies to `Period`.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        /// The period the AGR requests portfolio information for.
        #[serde(rename = "@Period")]
        pub period: NaiveDate,
    }
}

impl AgrPortfolioQuery {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)
    }
}

/// A connection as seen by the CRO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgrPortfolioQueryResponseConnection {
    /// EntityAddress of the connection.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
}

/// A congestion point and the connections it groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgrPortfolioQueryResponseCongestionPoint {
    /// EntityAddress of the congestion point.
    #[serde(rename = "@EntityAddress")]
    pub entity_address: String,
    /// Whether the DSO accepts mutually exclusive FlexOffers here.
    #[serde(rename = "@MutexOffersSupported")]
    pub mutex_offers_supported: bool,
    /// Which party is responsible for day-ahead redispatch.
    #[serde(rename = "@DayAheadRedispatchBy")]
    pub day_ahead_redispatch_by: RedispatchBy,
    /// Which party is responsible for intraday redispatch. Absent means
    /// no intraday trading on this congestion point.
    #[serde(
        rename = "@IntradayRedispatchBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub intraday_redispatch_by: Option<RedispatchBy>,
    #[serde(rename = "Connection", default)]
    pub connections: Vec<AgrPortfolioQueryResponseConnection>,
}

/// The portfolio one DSO holds for this AGR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgrPortfolioQueryResponseDsoPortfolio {
    /// Internet domain of the DSO.
    #[serde(rename = "@DSO-Domain")]
    pub dso_domain: String,
    #[serde(rename = "CongestionPoint", default)]
    pub congestion_points: Vec<AgrPortfolioQueryResponseCongestionPoint>,
}

/// Per-DSO view plus the connections not managed by any DSO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgrPortfolioQueryResponseDsoView {
    #[serde(rename = "DSO-Portfolio", default)]
    pub dso_portfolios: Vec<AgrPortfolioQueryResponseDsoPortfolio>,
    #[serde(rename = "Connection", default)]
    pub connections: Vec<AgrPortfolioQueryResponseConnection>,
}

uftp_response! {
    /// The CRO's answer to an [`AgrPortfolioQuery`], listing the AGR's
    /// connections per DSO congestion point.
    pub struct AgrPortfolioQueryResponse {
        /// MessageID of the AGRPortfolioQuery being answered.
        #[serde(rename = "@AGRPortfolioQueryMessageID")]
        pub agr_portfolio_query_message_id: Uuid,
        /// IANA time zone that applies to `Period`.
        #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
        pub time_zone: String,
        /// The period this portfolio is valid for.
        #[serde(rename = "@Period")]
        pub period: NaiveDate,
        #[serde(rename = "DSO-View", default)]
        pub dso_views: Vec<AgrPortfolioQueryResponseDsoView>,
    }
}

impl AgrPortfolioQueryResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        v::validate_list("dso_views", &self.dso_views, 1)?;
        for view in &self.dso_views {
            v::validate_list("dso_portfolios", &view.dso_portfolios, 1)?;
            for portfolio in &view.dso_portfolios {
                v::check_pattern("DSO-Domain", &portfolio.dso_domain, &v::DOMAIN)?;
                v::validate_list("congestion_points", &portfolio.congestion_points, 1)?;
                for point in &portfolio.congestion_points {
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
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_query_validates_after_fill() {
        let mut query = AgrPortfolioQuery {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-01-01".parse().expect("date"),
        };
        assert!(query.validate().is_err());
        query.fill(&MessageFill::now("agr.dev", "cro.dev"));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_response_requires_dso_view() {
        let mut response = AgrPortfolioQueryResponse {
            time_zone: "Europe/Amsterdam".to_string(),
            ..Default::default()
        };
        response.fill(&MessageFill::now("cro.dev", "agr.dev"));
        assert!(response.validate().is_err());

        response.dso_views.push(AgrPortfolioQueryResponseDsoView {
            dso_portfolios: vec![AgrPortfolioQueryResponseDsoPortfolio {
                dso_domain: "dso.dev".to_string(),
                congestion_points: vec![AgrPortfolioQueryResponseCongestionPoint {
                    entity_address: "ean.871685900012636543".to_string(),
                    mutex_offers_supported: true,
                    day_ahead_redispatch_by: RedispatchBy::Agr,
                    intraday_redispatch_by: None,
                    connections: vec![AgrPortfolioQueryResponseConnection {
                        entity_address: "ean.123456789012".to_string(),
                    }],
                }],
            }],
            connections: Vec::new(),
        });
        assert!(response.validate().is_ok());
    }
}
