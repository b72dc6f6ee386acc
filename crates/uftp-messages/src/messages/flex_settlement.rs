//! FlexSettlement: sent by the DSO on a regular basis (typically monthly)
//! to initiate settlement of all FlexOrders placed during the settlement
//! period, plus the settlement of bilateral contracts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::AcceptedDisputed;
use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

/// Settlement details for one ISP of an ordered flexibility delivery.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOrderSettlementIsp {
    /// Number of the first ISP this row refers to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// How many consecutive ISPs this row represents.
    #[serde(rename = "@Duration", default = "crate::payload::default_duration")]
    pub duration: u32,
    /// Power originally forecast per the referenced baseline, in Watts.
    #[serde(rename = "@BaselinePower")]
    pub baseline_power: i64,
    /// Flex power ordered per the referenced FlexOrder, in Watts.
    #[serde(rename = "@OrderedFlexPower")]
    pub ordered_flex_power: i64,
    /// Actual power measured by the DSO and allocated to the AGR, in Watts.
    #[serde(rename = "@ActualPower")]
    pub actual_power: i64,
    /// Actual flex power delivered, as determined by the DSO, in Watts.
    #[serde(rename = "@DeliveredFlexPower")]
    pub delivered_flex_power: i64,
    /// Flex power sold but not delivered, in Watts.
    #[serde(rename = "@PowerDeficiency", default)]
    pub power_deficiency: i64,
}

/// Settlement of one FlexOrder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOrderSettlement {
    /// Order reference assigned by the DSO when originating the FlexOrder.
    #[serde(rename = "@OrderReference", default, skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    /// The period being settled.
    #[serde(rename = "@Period")]
    pub period: NaiveDate,
    /// Reference to the concerning bilateral contract, if linked to one.
    #[serde(rename = "@ContractID", default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    /// MessageID of the D-Prognosis the FlexOrder was based on, when the
    /// baseline is prognosis-based.
    #[serde(rename = "@D-PrognosisMessageID", default, skip_serializing_if = "Option::is_none")]
    pub d_prognosis_message_id: Option<Uuid>,
    /// Identification of the baseline prognosis when another baseline
    /// methodology is used.
    #[serde(rename = "@BaselineReference", default, skip_serializing_if = "Option::is_none")]
    pub baseline_reference: Option<String>,
    /// Entity address of the congestion point the FlexOrder applies to.
    #[serde(rename = "@CongestionPoint")]
    pub congestion_point: String,
    /// Price accepted for supplying the ordered flexibility.
    #[serde(rename = "@Price", with = "crate::validations::decimal4")]
    pub price: Decimal,
    /// Penalty due to a non-zero power deficiency.
    #[serde(
        rename = "@Penalty",
        with = "crate::validations::decimal4",
        default = "crate::payload::default_penalty"
    )]
    pub penalty: Decimal,
    /// Net settlement amount for this period: price minus penalty.
    #[serde(rename = "@NetSettlement", with = "crate::validations::decimal4")]
    pub net_settlement: Decimal,
    #[serde(rename = "ISP", default)]
    pub isps: Vec<FlexOrderSettlementIsp>,
}

/// Settlement details for one ISP of a bilateral contract.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSettlementIsp {
    /// Number of the first ISP this row refers to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// How many consecutive ISPs this row represents.
    #[serde(rename = "@Duration", default = "crate::payload::default_duration")]
    pub duration: u32,
    /// Flex power reserved and not released, in Watts.
    #[serde(rename = "@ReservedPower")]
    pub reserved_power: i64,
    /// Flex power both reserved and requested, in Watts.
    #[serde(rename = "@RequestedPower", default, skip_serializing_if = "Option::is_none")]
    pub requested_power: Option<i64>,
    /// Flex power considered available based on the FlexRequest, in Watts.
    #[serde(rename = "@AvailablePower", default, skip_serializing_if = "Option::is_none")]
    pub available_power: Option<i64>,
    /// Flex power reserved, requested and covered by an offer, in Watts.
    #[serde(rename = "@OfferedPower", default, skip_serializing_if = "Option::is_none")]
    pub offered_power: Option<i64>,
    /// Flex power ordered against this contract, in Watts.
    #[serde(rename = "@OrderedPower", default, skip_serializing_if = "Option::is_none")]
    pub ordered_power: Option<i64>,
}

/// One settled period of a bilateral contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSettlementPeriod {
    /// The period being settled.
    #[serde(rename = "@Period")]
    pub period: NaiveDate,
    #[serde(rename = "ISP", default)]
    pub isps: Vec<ContractSettlementIsp>,
}

/// Settlement of one bilateral contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSettlement {
    /// Reference to the concerning bilateral contract.
    #[serde(rename = "@ContractID", default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(rename = "Period", default)]
    pub periods: Vec<ContractSettlementPeriod>,
}

uftp_payload! {
    /// Monthly settlement message covering all orders and contracts of a
    /// settlement period.
    pub struct FlexSettlement {
        /// First period of the settlement period.
        #[serde(rename = "@PeriodStart")]
        pub period_start: NaiveDate,
        /// Last period of the settlement period.
        #[serde(rename = "@PeriodEnd")]
        pub period_end: NaiveDate,
        /// ISO 4217 currency for all amounts in this message.
        #[serde(rename = "@Currency")]
        pub currency: String,
        #[serde(rename = "FlexOrderSettlement", default)]
        pub flex_order_settlements: Vec<FlexOrderSettlement>,
        #[serde(rename = "ContractSettlement", default)]
        pub contract_settlements: Vec<ContractSettlement>,
    }
}

impl FlexSettlement {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("Currency", &self.currency, &v::CURRENCY)?;
        v::validate_list("flex_order_settlements", &self.flex_order_settlements, 1)?;
        for settlement in &self.flex_order_settlements {
            v::check_pattern(
                "CongestionPoint",
                &settlement.congestion_point,
                &v::ENTITY_ADDRESS,
            )?;
            v::validate_isp_series(
                "isps",
                settlement.isps.iter().map(|isp| (isp.start, isp.duration)),
            )?;
        }
        v::validate_list("contract_settlements", &self.contract_settlements, 1)?;
        for contract in &self.contract_settlements {
            v::validate_list("periods", &contract.periods, 1)?;
            for period in &contract.periods {
                v::validate_isp_series(
                    "isps",
                    period.isps.iter().map(|isp| (isp.start, isp.duration)),
                )?;
            }
        }
        Ok(())
    }
}

/// The AGR's verdict on one order settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexOrderSettlementStatus {
    /// Order reference assigned by the DSO when originating the FlexOrder.
    #[serde(rename = "@OrderReference", default, skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    /// Whether the AGR accepts the settlement details and will invoice
    /// accordingly, or disputes them.
    #[serde(rename = "@Disposition")]
    pub disposition: AcceptedDisputed,
    /// Human-readable reason when disputed.
    #[serde(rename = "@DisputeReason", default, skip_serializing_if = "Option::is_none")]
    pub dispute_reason: Option<String>,
}

uftp_response! {
    /// Reply to a [`FlexSettlement`], carrying one status per order
    /// settlement.
    pub struct FlexSettlementResponse {
        /// MessageID of the FlexSettlement being answered.
        #[serde(rename = "@FlexSettlementMessageID")]
        pub flex_settlement_message_id: Uuid,
        #[serde(rename = "FlexOrderSettlementStatus", default)]
        pub flex_order_settlement_statuses: Vec<FlexOrderSettlementStatus>,
    }
}

impl FlexSettlementResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::validate_list(
            "flex_order_settlement_statuses",
            &self.flex_order_settlement_statuses,
            1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_settlement_validation() {
        let mut settlement = FlexSettlement {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            period_start: "2023-05-01".parse().expect("date"),
            period_end: "2023-05-31".parse().expect("date"),
            currency: "EUR".to_string(),
            flex_order_settlements: vec![FlexOrderSettlement {
                order_reference: Some("order-1".to_string()),
                period: "2023-05-12".parse().expect("date"),
                contract_id: None,
                d_prognosis_message_id: None,
                baseline_reference: None,
                congestion_point: "ean.871685900012636543".to_string(),
                price: "99.5000".parse().expect("decimal"),
                penalty: "0.0000".parse().expect("decimal"),
                net_settlement: "99.5000".parse().expect("decimal"),
                isps: vec![FlexOrderSettlementIsp {
                    start: 33,
                    duration: 8,
                    baseline_power: 1_000_000,
                    ordered_flex_power: -250_000,
                    actual_power: 760_000,
                    delivered_flex_power: -240_000,
                    power_deficiency: 10_000,
                }],
            }],
            contract_settlements: vec![ContractSettlement {
                contract_id: Some("contract-1".to_string()),
                periods: vec![ContractSettlementPeriod {
                    period: "2023-05-12".parse().expect("date"),
                    isps: vec![ContractSettlementIsp {
                        start: 33,
                        duration: 8,
                        reserved_power: 250_000,
                        requested_power: Some(250_000),
                        available_power: None,
                        offered_power: None,
                        ordered_power: Some(250_000),
                    }],
                }],
            }],
        };
        settlement.fill(&MessageFill::now("dso.dev", "agr.dev"));
        assert!(settlement.validate().is_ok());

        let mut without_contracts = settlement.clone();
        without_contracts.contract_settlements.clear();
        assert!(without_contracts.validate().is_err());

        settlement.flex_order_settlements.clear();
        assert!(settlement.validate().is_err());
    }

    #[test]
    fn test_settlement_response_requires_statuses() {
        let mut response = FlexSettlementResponse::default();
        response.fill(&MessageFill::now("agr.dev", "dso.dev"));
        assert!(response.validate().is_err());

        response
            .flex_order_settlement_statuses
            .push(FlexOrderSettlementStatus {
                order_reference: Some("order-1".to_string()),
                disposition: AcceptedDisputed::Accepted,
                dispute_reason: None,
            });
        assert!(response.validate().is_ok());
    }
}
