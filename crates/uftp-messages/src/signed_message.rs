//! The `SignedMessage` transport envelope.
//!
//! This is the only structure that appears on the wire at the HTTP
//! boundary. The `Body` attribute carries the sealed inner message: the
//! 64-byte Ed25519 signature followed by the UTF-8 XML of the payload,
//! base64-encoded as a whole.

use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::validations as v;

/// Secure wrapper used to submit UFTP XML messages to a remote participant.
///
/// The envelope metadata lets the recipient look up the sender's public
/// signing key (via DNS or configuration) before unsealing the body. After
/// unsealing, the inner message's `SenderDomain` must equal the envelope's
/// `SenderDomain`; a mismatch is rejected as an invalid sender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "SignedMessage")]
pub struct SignedMessage {
    /// Internet domain of the sending participant.
    #[serde(rename = "@SenderDomain")]
    pub sender_domain: String,
    /// Role of the sending participant.
    #[serde(rename = "@SenderRole")]
    pub sender_role: Role,
    /// Sealed inner message, base64-encoded.
    #[serde(rename = "@Body", with = "body_base64")]
    pub body: Vec<u8>,
}

impl SignedMessage {
    /// Validate the envelope metadata.
    pub fn validate(&self) -> crate::Result<()> {
        v::check_pattern("SenderDomain", &self.sender_domain, &v::DOMAIN)
    }
}

mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_xml_roundtrip() {
        let envelope = SignedMessage {
            sender_domain: "agr.dev".to_string(),
            sender_role: Role::Agr,
            body: vec![0, 1, 2, 254, 255],
        };
        let xml = quick_xml::se::to_string(&envelope).expect("serialize");
        assert!(xml.contains("SenderDomain=\"agr.dev\""));
        assert!(xml.contains("SenderRole=\"AGR\""));
        let parsed: SignedMessage = quick_xml::de::from_str(&xml).expect("parse");
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_envelope_rejects_bad_base64() {
        let xml = r#"<SignedMessage SenderDomain="agr.dev" SenderRole="AGR" Body="@@not-base64@@"/>"#;
        assert!(quick_xml::de::from_str::<SignedMessage>(xml).is_err());
    }

    #[test]
    fn test_envelope_rejects_unknown_role() {
        let xml = r#"<SignedMessage SenderDomain="agr.dev" SenderRole="MDC" Body="AAAA"/>"#;
        assert!(quick_xml::de::from_str::<SignedMessage>(xml).is_err());
    }

    #[test]
    fn test_envelope_domain_validation() {
        let envelope = SignedMessage {
            sender_domain: "Not A Domain".to_string(),
            sender_role: Role::Dso,
            body: Vec::new(),
        };
        assert!(envelope.validate().is_err());
    }
}
