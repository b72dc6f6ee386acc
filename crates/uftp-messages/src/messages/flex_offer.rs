//! FlexOffer: the AGR offers flexibility to the DSO, solicited by a
//! FlexRequest or unsolicited. An offer carries one or more options, each
//! priced as a whole.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_flex_payload, uftp_response, Flex, Payload};
use crate::validations as v;

/// One ISP row of an offer option.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOfferOptionIsp {
    /// Offered change in power for this ISP in Watts.
    #[serde(rename = "@Power")]
    pub power: i64,
    /// Number of the first ISP this row refers to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// How many consecutive ISPs this row represents.
    #[serde(rename = "@Duration", default = "crate::payload::default_duration")]
    pub duration: u32,
}

/// One independently orderable option of a FlexOffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOfferOption {
    /// Identification of this option within the offer.
    #[serde(rename = "@OptionReference")]
    pub option_reference: String,
    /// Asking price for the flexibility offered in this option.
    #[serde(rename = "@Price", with = "crate::validations::decimal4")]
    pub price: Decimal,
    /// Minimal activation factor for this option; the DSO may order any
    /// fraction between this and 1.00.
    #[serde(
        rename = "@MinActivationFactor",
        with = "crate::validations::decimal2",
        default = "crate::payload::default_activation_factor"
    )]
    pub min_activation_factor: Decimal,
    #[serde(rename = "ISP", default)]
    pub isps: Vec<FlexOfferOptionIsp>,
}

uftp_flex_payload! {
    /// Offer for provision of flexibility on a congestion point.
    pub struct FlexOffer {
        /// Moment until which this offer is valid.
        #[serde(rename = "@ExpirationDateTime")]
        pub expiration_date_time: DateTime<FixedOffset>,
        /// MessageID of the FlexRequest this offer answers. Mandatory if
        /// and only if the offer is solicited.
        #[serde(rename = "@FlexRequestMessageID", default, skip_serializing_if = "Option::is_none")]
        pub flex_request_message_id: Option<Uuid>,
        /// Reference to the concerning contract, if applicable.
        #[serde(rename = "@ContractID", default, skip_serializing_if = "Option::is_none")]
        pub contract_id: Option<String>,
        /// MessageID of the D-Prognosis this offer is based on, when the
        /// baseline is prognosis-based.
        #[serde(rename = "@D-PrognosisMessageID", default, skip_serializing_if = "Option::is_none")]
        pub d_prognosis_message_id: Option<Uuid>,
        /// Identification of the baseline prognosis when another baseline
        /// methodology is used.
        #[serde(rename = "@BaselineReference", default, skip_serializing_if = "Option::is_none")]
        pub baseline_reference: Option<String>,
        /// ISO 4217 currency for the option prices.
        #[serde(rename = "@Currency", default = "crate::payload::default_currency")]
        pub currency: String,
        #[serde(rename = "OfferOption", default)]
        pub offer_options: Vec<FlexOfferOption>,
    }
}

impl FlexOffer {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        self.validate_flex()?;
        v::check_pattern("Currency", &self.currency, &v::CURRENCY)?;
        v::validate_list("offer_options", &self.offer_options, 1)?;
        for option in &self.offer_options {
            v::check_range(
                "MinActivationFactor",
                option.min_activation_factor,
                Decimal::new(1, 2),
                Decimal::new(100, 2),
            )?;
            v::validate_isp_series(
                "isps",
                option.isps.iter().map(|isp| (isp.start, isp.duration)),
            )?;
        }
        Ok(())
    }
}

uftp_response! {
    /// Reply to a [`FlexOffer`].
    pub struct FlexOfferResponse {
        /// MessageID of the FlexOffer being answered.
        #[serde(rename = "@FlexOfferMessageID")]
        pub flex_offer_message_id: Uuid,
    }
}

impl FlexOfferResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    fn offer() -> FlexOffer {
        let mut offer = FlexOffer {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: crate::IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-06-01".parse().expect("date"),
            congestion_point: "ean.871685900012636543".to_string(),
            expiration_date_time: "2023-06-01T10:00:00+02:00".parse().expect("timestamp"),
            flex_request_message_id: None,
            contract_id: None,
            d_prognosis_message_id: None,
            baseline_reference: None,
            currency: "EUR".to_string(),
            offer_options: vec![FlexOfferOption {
                option_reference: "option-1".to_string(),
                price: "99.5000".parse().expect("decimal"),
                min_activation_factor: "0.50".parse().expect("decimal"),
                isps: vec![FlexOfferOptionIsp {
                    power: -250_000,
                    start: 33,
                    duration: 8,
                }],
            }],
        };
        offer.fill(&MessageFill::now("agr.dev", "dso.dev"));
        offer
    }

    #[test]
    fn test_valid_offer() {
        assert!(offer().validate().is_ok());
    }

    #[test]
    fn test_activation_factor_bounds() {
        let mut bad = offer();
        bad.offer_options[0].min_activation_factor = "0.00".parse().expect("decimal");
        assert!(bad.validate().is_err());

        let mut too_big = offer();
        too_big.offer_options[0].min_activation_factor = "1.01".parse().expect("decimal");
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn test_currency_pattern() {
        let mut bad = offer();
        bad.currency = "euro".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_offer_requires_an_option() {
        let mut bad = offer();
        bad.offer_options.clear();
        assert!(bad.validate().is_err());
    }
}
