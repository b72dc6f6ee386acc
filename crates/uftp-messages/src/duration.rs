//! ISP duration, an ISO 8601 time interval restricted to whole minutes.
//!
//! Every Flex* message states the ISP length it was computed against
//! (for example `PT15M`), letting receivers reject messages quantised onto
//! a different market grid.

use serde::{Deserialize, Serialize};

/// Duration of one Imbalance Settlement Period, in whole minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IspDuration(u32);

impl IspDuration {
    /// The common European market value of 15 minutes.
    pub const FIFTEEN_MINUTES: IspDuration = IspDuration(15);

    /// Create a duration from a number of minutes.
    pub fn from_minutes(minutes: u32) -> Self {
        IspDuration(minutes)
    }

    /// The number of minutes in one ISP.
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for IspDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PT{}M", self.0)
    }
}

impl std::str::FromStr for IspDuration {
    type Err = crate::MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes = s
            .strip_prefix("PT")
            .and_then(|rest| rest.strip_suffix('M'))
            .and_then(|digits| digits.parse::<u32>().ok())
            .ok_or_else(|| crate::MessageError::PatternMismatch {
                field: "ISP-Duration",
                value: s.to_string(),
            })?;
        Ok(IspDuration(minutes))
    }
}

impl TryFrom<String> for IspDuration {
    type Error = crate::MessageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IspDuration> for String {
    fn from(value: IspDuration) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(IspDuration::from_minutes(15).to_string(), "PT15M");
        assert_eq!(IspDuration::from_minutes(30).to_string(), "PT30M");
    }

    #[test]
    fn test_parse() {
        let d: IspDuration = "PT15M".parse().expect("parse");
        assert_eq!(d.minutes(), 15);
    }

    #[test]
    fn test_parse_rejects_other_units() {
        assert!("PT1H".parse::<IspDuration>().is_err());
        assert!("P1D".parse::<IspDuration>().is_err());
        assert!("15".parse::<IspDuration>().is_err());
        assert!("PTM".parse::<IspDuration>().is_err());
    }

    #[test]
    fn test_roundtrip_through_string() {
        let d = IspDuration::from_minutes(5);
        let s: String = d.into();
        let back: IspDuration = s.parse().expect("parse");
        assert_eq!(back, d);
    }
}
