//! Seal and unseal payload messages.
//!
//! Sealing renders a message to canonical XML and prepends the 64-byte
//! Ed25519 signature over those exact bytes. Unsealing verifies the
//! signature first and only then parses and validates the XML, so an
//! attacker cannot reach the parser with unauthenticated input.

use tracing::{debug, warn};

use uftp_messages::{codec, UftpMessage};

use crate::keys::{SigningKey, VerifyingKey};
use crate::{Result, TransportError};

/// Length of the detached signature prefix.
const SIGNATURE_LEN: usize = 64;

/// Sign a message with the sender's private key, returning the sealed
/// blob: `signature || utf-8 xml`.
pub fn seal(message: &UftpMessage, private_key: &SigningKey) -> Result<Vec<u8>> {
    let xml = codec::to_xml(message)?;
    debug!(kind = %message.kind().name(), "sealing outgoing message");
    let signature = private_key.sign(xml.as_bytes());
    let mut sealed = Vec::with_capacity(SIGNATURE_LEN + xml.len());
    sealed.extend_from_slice(&signature);
    sealed.extend_from_slice(xml.as_bytes());
    Ok(sealed)
}

/// Verify a sealed blob against the sender's public key and parse the
/// enclosed message.
pub fn unseal(sealed: &[u8], public_key: &VerifyingKey) -> Result<UftpMessage> {
    if sealed.len() < SIGNATURE_LEN {
        warn!(len = sealed.len(), "sealed message shorter than a signature");
        return Err(TransportError::InvalidSignature);
    }
    let (signature, xml_bytes) = sealed.split_at(SIGNATURE_LEN);
    public_key.verify(xml_bytes, signature).map_err(|err| {
        warn!("sealed message does not verify against the sender's public key");
        err
    })?;

    let xml = std::str::from_utf8(xml_bytes)
        .map_err(|e| TransportError::Schema(format!("payload is not valid UTF-8: {e}")))?;
    debug!(payload = xml, "unsealed incoming message");
    Ok(codec::from_xml(xml)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use uftp_messages::messages::{AgrPortfolioUpdate, AgrPortfolioUpdateConnection};
    use uftp_messages::{MessageFill, Payload};

    fn message() -> UftpMessage {
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

    #[test]
    fn test_seal_unseal_roundtrip() {
        let pair = KeyPair::generate();
        let message = message();
        let sealed = seal(&message, &pair.signing_key).expect("seal");
        let unsealed = unseal(&sealed, &pair.verifying_key).expect("unseal");
        assert_eq!(unsealed, message);
    }

    #[test]
    fn test_tampered_message_rejected() {
        let pair = KeyPair::generate();
        let sealed = seal(&message(), &pair.signing_key).expect("seal");
        // Flip one byte at every position; each mutation must fail.
        for index in [0, 32, 63, 64, sealed.len() - 1] {
            let mut mutated = sealed.clone();
            mutated[index] ^= 0x01;
            assert!(
                unseal(&mutated, &pair.verifying_key).is_err(),
                "byte {index} flipped but message still unsealed"
            );
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sender = KeyPair::generate();
        let other = KeyPair::generate();
        let sealed = seal(&message(), &sender.signing_key).expect("seal");
        assert!(matches!(
            unseal(&sealed, &other.verifying_key),
            Err(TransportError::InvalidSignature)
        ));
    }

    #[test]
    fn test_validly_signed_garbage_is_schema_error() {
        let pair = KeyPair::generate();
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?><Hello />"#;
        let mut sealed = pair.signing_key.sign(xml).to_vec();
        sealed.extend_from_slice(xml);
        assert!(matches!(
            unseal(&sealed, &pair.verifying_key),
            Err(TransportError::Schema(_))
        ));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let pair = KeyPair::generate();
        assert!(unseal(&[0u8; 10], &pair.verifying_key).is_err());
    }
}
