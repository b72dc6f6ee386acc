//! Protocol enumerations.
//!
//! String values match the UFTP 3.x XML schema exactly; they appear verbatim
//! as attribute values on the wire.

use serde::{Deserialize, Serialize};

/// The three participant roles of the flexibility market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Aggregator.
    #[serde(rename = "AGR")]
    Agr,
    /// Common Reference Operator.
    #[serde(rename = "CRO")]
    Cro,
    /// Distribution System Operator.
    #[serde(rename = "DSO")]
    Dso,
}

impl Role {
    /// The wire name of this role, as used in `SenderRole` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Agr => "AGR",
            Role::Cro => "CRO",
            Role::Dso => "DSO",
        }
    }

    /// The lowercase label used in the well-known DNS names
    /// (`_agr._usef.<domain>` and friends).
    pub fn dns_label(self) -> &'static str {
        match self {
            Role::Agr => "agr",
            Role::Cro => "cro",
            Role::Dso => "dso",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AGR" | "agr" => Ok(Role::Agr),
            "CRO" | "cro" => Ok(Role::Cro),
            "DSO" | "dso" => Ok(Role::Dso),
            other => Err(crate::MessageError::PatternMismatch {
                field: "SenderRole",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a request was executed successfully or rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptedRejected {
    #[default]
    Accepted,
    Rejected,
}

/// Whether a settlement item is accepted or disputed by the AGR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptedDisputed {
    #[default]
    Accepted,
    Disputed,
}

/// Disposition of a FlexRequest ISP row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailableRequested {
    Available,
    Requested,
}

/// Which party is responsible for redispatch on a congestion point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedispatchBy {
    #[serde(rename = "AGR")]
    Agr,
    #[serde(rename = "DSO")]
    Dso,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Agr, Role::Cro, Role::Dso] {
            let parsed: Role = role.as_str().parse().expect("parse role");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!("BRP".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_dns_labels_are_lowercase() {
        assert_eq!(Role::Agr.dns_label(), "agr");
        assert_eq!(Role::Cro.dns_label(), "cro");
        assert_eq!(Role::Dso.dns_label(), "dso");
    }

    #[test]
    fn test_default_result_is_accepted() {
        assert_eq!(AcceptedRejected::default(), AcceptedRejected::Accepted);
    }
}
