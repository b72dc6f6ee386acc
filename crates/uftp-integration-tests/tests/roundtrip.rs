//! Wire-format properties across every message kind: XML and JSON
//! round-trips, seal/unseal, and tamper detection.

use anyhow::Context;

use uftp_integration_tests::sample_messages;
use uftp_messages::{codec, UftpMessage};
use uftp_transport::keys::KeyPair;
use uftp_transport::seal::{seal, unseal};

#[test]
fn test_xml_roundtrip_for_every_kind() -> anyhow::Result<()> {
    for message in sample_messages() {
        let kind = message.kind();
        let xml = codec::to_xml(&message).with_context(|| format!("serialize {kind:?}"))?;
        let parsed = codec::from_xml(&xml).with_context(|| format!("parse {kind:?}: {xml}"))?;
        assert_eq!(parsed, message, "XML roundtrip changed a {kind:?}");
    }
    Ok(())
}

#[test]
fn test_json_roundtrip_for_every_kind() -> anyhow::Result<()> {
    for message in sample_messages() {
        let kind = message.kind();
        let json = codec::to_json(&message).with_context(|| format!("serialize {kind:?}"))?;
        let parsed: UftpMessage =
            codec::from_json(&json).with_context(|| format!("parse {kind:?}: {json}"))?;
        assert_eq!(parsed, message, "JSON roundtrip changed a {kind:?}");
    }
    Ok(())
}

#[test]
fn test_seal_unseal_for_every_kind() -> anyhow::Result<()> {
    let pair = KeyPair::generate();
    for message in sample_messages() {
        let kind = message.kind();
        let sealed =
            seal(&message, &pair.signing_key).with_context(|| format!("seal {kind:?}"))?;
        let unsealed =
            unseal(&sealed, &pair.verifying_key).with_context(|| format!("unseal {kind:?}"))?;
        assert_eq!(unsealed, message, "seal/unseal changed a {kind:?}");
    }
    Ok(())
}

#[test]
fn test_tampered_blobs_are_rejected() -> anyhow::Result<()> {
    let pair = KeyPair::generate();
    for message in sample_messages().into_iter().take(4) {
        let kind = message.kind();
        let sealed =
            seal(&message, &pair.signing_key).with_context(|| format!("seal {kind:?}"))?;
        for index in [0, 63, 64, sealed.len() / 2, sealed.len() - 1] {
            let mut mutated = sealed.clone();
            mutated[index] ^= 0x01;
            assert!(
                unseal(&mutated, &pair.verifying_key).is_err(),
                "flipping byte {index} of a sealed {kind:?} went unnoticed"
            );
        }
    }
    Ok(())
}
