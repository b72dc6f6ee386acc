//! XML and JSON marshalling.
//!
//! XML is the wire format: the root element name selects the message kind,
//! scalar fields are attributes, repeated rows are child elements. JSON is
//! a companion format for handing messages to systems outside the UFTP
//! conversation; both directions round-trip losslessly.

use quick_xml::events::Event;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kind::UftpMessage;
use crate::signed_message::SignedMessage;
use crate::{MessageError, Result};

/// Render a business message to its XML wire form.
pub fn to_xml(message: &UftpMessage) -> Result<String> {
    quick_xml::se::to_string(message).map_err(|e| MessageError::Serialize(e.to_string()))
}

/// Parse a business message from XML and validate it.
///
/// An unknown root element, malformed XML, a missing required attribute
/// and a failed validation rule all surface as errors here; the transport
/// layer maps them onto the schema failure status.
pub fn from_xml(xml: &str) -> Result<UftpMessage> {
    let message: UftpMessage =
        quick_xml::de::from_str(xml).map_err(|e| MessageError::Parse(e.to_string()))?;
    message.validate()?;
    Ok(message)
}

/// Render a [`SignedMessage`] envelope to XML.
pub fn envelope_to_xml(envelope: &SignedMessage) -> Result<String> {
    quick_xml::se::to_string(envelope).map_err(|e| MessageError::Serialize(e.to_string()))
}

/// Parse a [`SignedMessage`] envelope from XML.
///
/// The root element must literally be `SignedMessage`; anything else is a
/// schema failure even if its attributes happen to line up.
pub fn envelope_from_xml(xml: &str) -> Result<SignedMessage> {
    expect_root(xml, "SignedMessage")?;
    let envelope: SignedMessage =
        quick_xml::de::from_str(xml).map_err(|e| MessageError::Parse(e.to_string()))?;
    envelope.validate()?;
    Ok(envelope)
}

/// Serialize any message value to JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| MessageError::Serialize(e.to_string()))
}

/// Parse a message value of a known type from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| MessageError::Parse(e.to_string()))
}

fn expect_root(xml: &str, root: &str) -> Result<()> {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                return if start.name().as_ref() == root.as_bytes() {
                    Ok(())
                } else {
                    Err(MessageError::Parse(format!(
                        "expected root element '{root}', found '{}'",
                        String::from_utf8_lossy(start.name().as_ref())
                    )))
                };
            }
            Ok(Event::Empty(empty)) => {
                return if empty.name().as_ref() == root.as_bytes() {
                    Ok(())
                } else {
                    Err(MessageError::Parse(format!(
                        "expected root element '{root}', found '{}'",
                        String::from_utf8_lossy(empty.name().as_ref())
                    )))
                };
            }
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::Text(_)) => continue,
            Ok(Event::Eof) => {
                return Err(MessageError::Parse("document has no root element".to_string()))
            }
            Ok(other) => {
                return Err(MessageError::Parse(format!(
                    "unexpected XML event before root element: {other:?}"
                )))
            }
            Err(e) => return Err(MessageError::Parse(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Role;
    use crate::messages::*;
    use crate::payload::{MessageFill, Payload};
    use crate::IspDuration;
    use uuid::Uuid;

    fn portfolio_update() -> UftpMessage {
        let mut update = UftpMessage::AgrPortfolioUpdate(AgrPortfolioUpdate {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            connections: vec![AgrPortfolioUpdateConnection {
                entity_address: "ean.123456789012".to_string(),
                start_period: "2023-01-01".parse().expect("date"),
                end_period: None,
            }],
        });
        update.fill(&MessageFill::now("agr.dev", "cro.dev"));
        update
    }

    fn prognosis() -> UftpMessage {
        let mut prognosis = UftpMessage::DPrognosis(DPrognosis {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-01-01".parse().expect("date"),
            congestion_point: "ean.871685900012636543".to_string(),
            revision: 1,
            isps: vec![
                DPrognosisIsp {
                    power: 210_000,
                    start: 1,
                    duration: 1,
                },
                DPrognosisIsp {
                    power: 220_000,
                    start: 2,
                    duration: 1,
                },
            ],
        });
        prognosis.fill(&MessageFill::now("agr.dev", "dso.dev"));
        prognosis
    }

    #[test]
    fn test_xml_roundtrip() {
        for message in [portfolio_update(), prognosis()] {
            let xml = to_xml(&message).expect("serialize");
            let parsed = from_xml(&xml).expect("parse");
            assert_eq!(parsed, message);
        }
    }

    #[test]
    fn test_xml_shape() {
        let xml = to_xml(&portfolio_update()).expect("serialize");
        assert!(xml.starts_with("<AGRPortfolioUpdate"));
        assert!(xml.contains("TimeZone=\"Europe/Amsterdam\""));
        assert!(xml.contains("<Connection"));
        assert!(xml.contains("EntityAddress=\"ean.123456789012\""));
    }

    #[test]
    fn test_prognosis_root_element_is_hyphenated() {
        let xml = to_xml(&prognosis()).expect("serialize");
        assert!(xml.starts_with("<D-Prognosis"), "got: {xml}");
    }

    #[test]
    fn test_unknown_root_rejected() {
        assert!(from_xml("<Hello />").is_err());
        assert!(from_xml(r#"<?xml version="1.0" encoding="UTF-8"?><Hello />"#).is_err());
    }

    #[test]
    fn test_parse_validates() {
        // Well-formed XML, but the connection list is empty.
        let xml = r#"<AGRPortfolioUpdate Version="3.0.0" SenderDomain="agr.dev"
            RecipientDomain="cro.dev" TimeStamp="2023-01-01T12:00:00+00:00"
            MessageID="f94a4a9d-d64d-4cb4-b7c0-d43e0e0ca5ab"
            ConversationID="f94a4a9d-d64d-4cb4-b7c0-d43e0e0ca5ab"
            TimeZone="Europe/Amsterdam"/>"#;
        assert!(from_xml(xml).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let message = prognosis();
        let json = to_json(&message).expect("serialize");
        let parsed: UftpMessage = from_json(&json).expect("parse");
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let envelope = SignedMessage {
            sender_domain: "agr.dev".to_string(),
            sender_role: Role::Agr,
            body: b"sealed bytes".to_vec(),
        };
        let xml = envelope_to_xml(&envelope).expect("serialize");
        let parsed = envelope_from_xml(&xml).expect("parse");
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_envelope_requires_signed_message_root() {
        let xml = r#"<Wrapper SenderDomain="agr.dev" SenderRole="AGR" Body="AAAA"/>"#;
        assert!(envelope_from_xml(xml).is_err());
    }

    #[test]
    fn test_decimal_attributes_keep_their_scale() {
        let mut offer = UftpMessage::FlexOffer(FlexOffer {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: "2023-06-01".parse().expect("date"),
            congestion_point: "ean.871685900012636543".to_string(),
            expiration_date_time: "2023-06-01T10:00:00+02:00".parse().expect("timestamp"),
            flex_request_message_id: Some(Uuid::new_v4()),
            contract_id: None,
            d_prognosis_message_id: None,
            baseline_reference: None,
            currency: "EUR".to_string(),
            offer_options: vec![FlexOfferOption {
                option_reference: "option-1".to_string(),
                price: "99.5".parse().expect("decimal"),
                min_activation_factor: "1".parse().expect("decimal"),
                isps: vec![FlexOfferOptionIsp {
                    power: -250_000,
                    start: 33,
                    duration: 8,
                }],
            }],
        });
        offer.fill(&MessageFill::now("agr.dev", "dso.dev"));
        let xml = to_xml(&offer).expect("serialize");
        assert!(xml.contains("Price=\"99.5000\""), "got: {xml}");
        assert!(xml.contains("MinActivationFactor=\"1.00\""), "got: {xml}");
    }
}
