//! Metering: the AGR submits metering data for one meter and one period to
//! the DSO, organised as one or more profiles of per-ISP values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::IspDuration;
use crate::payload::{uftp_payload, uftp_response, Payload};
use crate::validations as v;

/// What a metering profile's values represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeteringProfileKind {
    /// Average active power during the ISP, `(import - export) * 60 /
    /// isp_minutes`.
    Power,
    /// Imported active energy consumed during the ISP.
    ImportEnergy,
    /// Exported active energy generated during the ISP.
    ExportEnergy,
    /// Cumulative imported meter reading at the end of the ISP.
    ImportMeterReading,
    /// Cumulative exported meter reading at the end of the ISP.
    ExportMeterReading,
}

/// Unit of a metering profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeteringUnit {
    /// Used with [`MeteringProfileKind::Power`].
    #[serde(rename = "kW")]
    KW,
    /// Used with the energy profile kinds.
    #[serde(rename = "kWh")]
    KWh,
}

/// One metering value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeteringIsp {
    /// Number of the ISP this value belongs to (1-based).
    #[serde(rename = "@Start")]
    pub start: u32,
    /// Metering value at the end of this ISP, in the profile unit.
    #[serde(rename = "@Value")]
    pub value: Decimal,
}

/// A sequence of ISP values of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeteringProfile {
    /// Kind of metering data in this profile.
    #[serde(rename = "@ProfileType")]
    pub profile_type: MeteringProfileKind,
    /// Unit of the values.
    #[serde(rename = "@Unit")]
    pub unit: MeteringUnit,
    #[serde(rename = "ISP", default)]
    pub isps: Vec<MeteringIsp>,
}

uftp_payload! {
    /// Metering data for one meter and one period.
    pub struct Metering {
        /// Sequence number, incremented for each new revision.
        #[serde(rename = "@Revision")]
        pub revision: u32,
        /// Duration of the ISPs referenced in this message.
        #[serde(rename = "@ISP-Duration")]
        pub isp_duration: IspDuration,
        /// IANA time zone that applies to `Period`.
        #[serde(rename = "@TimeZone")]
        pub time_zone: String,
        /// ISO 4217 currency, required only when tariff profiles are
        /// included.
        #[serde(rename = "@Currency", default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
        /// Day the ISPs in this message belong to.
        #[serde(rename = "@Period")]
        pub period: NaiveDate,
        /// EAN of the meter the message applies to.
        #[serde(rename = "@EAN")]
        pub ean: String,
        #[serde(rename = "Profile", default)]
        pub profiles: Vec<MeteringProfile>,
    }
}

impl Metering {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()?;
        v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
        v::check_pattern("EAN", &self.ean, &v::EAN)?;
        if let Some(currency) = &self.currency {
            v::check_pattern("Currency", currency, &v::CURRENCY)?;
        }
        v::validate_list("profiles", &self.profiles, 1)?;
        for profile in &self.profiles {
            v::validate_list("isps", &profile.isps, 1)?;
        }
        Ok(())
    }
}

uftp_response! {
    /// Reply to a [`Metering`] message.
    pub struct MeteringResponse {
        /// MessageID of the Metering message being answered.
        #[serde(rename = "@MeteringMessageID")]
        pub metering_message_id: Uuid,
    }
}

impl MeteringResponse {
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_common()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MessageFill;

    #[test]
    fn test_metering_validation() {
        let mut metering = Metering {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            revision: 1,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            currency: None,
            period: "2023-06-01".parse().expect("date"),
            ean: "E1234567890123456".to_string(),
            profiles: vec![MeteringProfile {
                profile_type: MeteringProfileKind::Power,
                unit: MeteringUnit::KW,
                isps: vec![MeteringIsp {
                    start: 1,
                    value: "42.5".parse().expect("decimal"),
                }],
            }],
        };
        metering.fill(&MessageFill::now("agr.dev", "dso.dev"));
        assert!(metering.validate().is_ok());

        metering.ean = "1234".to_string();
        assert!(metering.validate().is_err());
    }
}
