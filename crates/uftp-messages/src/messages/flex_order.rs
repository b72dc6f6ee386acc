//! FlexOrder: the DSO purchases flexibility from an AGR based on a
//! previous FlexOffer. The ISP list must be copied from the chosen offer
//! option without modification.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{uftp_flex_payload, uftp_response, Flex, Payload};
use crate::validations as v;

/// One ordered ISP row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOrderIsp {
    /// Ordered change in power for this ISP in Watts.
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
    /// Order for flexibility, referencing an accepted FlexOffer.
    pub struct FlexOrder {
        /// MessageID of the FlexOffer this order is based on.
        #[serde(rename = "@FlexOfferMessageID")]
        pub flex_offer_message_id: Uuid,
        /// Reference to the concerning bilateral contract, if applicable.
        #[serde(rename = "@ContractID", default, skip_serializing_if = "Option::is_none")]
        pub contract_id: Option<String>,
        /// MessageID of the D-Prognosis this order is based on, when the
        /// baseline is prognosis-based.
        #[serde(rename = "@D-PrognosisMessageID", default, skip_serializing_if = "Option::is_none")]
        pub d_prognosis_message_id: Option<Uuid>,
        /// Identification of the baseline prognosis when another baseline
        /// methodology is used.
        #[serde(rename = "@BaselineReference", default, skip_serializing_if = "Option::is_none")]
        pub baseline_reference: Option<String>,
        /// Price accepted for the ordered flexibility; normally equal to
        /// the price of the referenced offer option.
        #[serde(rename = "@Price", with = "crate::validations::decimal4")]
        pub price: Decimal,
        /// ISO 4217 currency for the price.
        #[serde(rename = "@Currency")]
        pub currency: String,
        /// Order number assigned by the DSO, stored by the AGR and used in
        /// the settlement phase.
        #[serde(rename = "@OrderReference")]
        pub order_reference: String,
        /// OptionReference of the chosen offer option.
        #[serde(rename = "@OptionReference", default, skip_serializing_if = "Option::is_none")]
        pub option_reference: Option<String>,
        /// Activation factor, at least the MinActivationFactor of the
        /// chosen option.
        #[serde(
            rename = "@ActivationFactor",
            with = "crate::validations::decimal2",
            default = "crate::payload::default_activation_factor"
        )]
        pub activation_factor: Decimal,
        #[serde(rename = "ISP", default)]
        pub isps: Vec<FlexOrderIsp>,
    }
}

impl FlexOrder {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        self.validate_flex()?;
        v::check_pattern("Currency", &self.currency, &v::CURRENCY)?;
        v::check_range(
            "ActivationFactor",
            self.activation_factor,
            Decimal::new(1, 2),
            Decimal::new(100, 2),
        )?;
        v::validate_isp_series("isps", self.isps.iter().map(|isp| (isp.start, isp.duration)))
    }
}

uftp_response! {
    /// Reply to a [`FlexOrder`].
    pub struct FlexOrderResponse {
        /// MessageID of the FlexOrder being answered.
        #[serde(rename = "@FlexOrderMessageID")]
        pub flex_order_message_id: Uuid,
    }
}

impl FlexOrderResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_order_validation() {
        let mut order = FlexOrder {
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
            flex_offer_message_id: Uuid::new_v4(),
            contract_id: None,
            d_prognosis_message_id: None,
            baseline_reference: None,
            price: "99.5000".parse().expect("decimal"),
            currency: "EUR".to_string(),
            order_reference: "order-2023-06-01-1".to_string(),
            option_reference: Some("option-1".to_string()),
            activation_factor: "1.00".parse().expect("decimal"),
            isps: vec![FlexOrderIsp {
                power: -250_000,
                start: 33,
                duration: 8,
            }],
        };
        order.fill(&MessageFill::now("dso.dev", "agr.dev"));
        assert!(order.validate().is_ok());

        order.activation_factor = "0.00".parse().expect("decimal");
        assert!(order.validate().is_err());
    }
}
