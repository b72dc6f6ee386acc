//! Ed25519 key material, handled in the base64 form UFTP participants
//! exchange and publish.
//!
//! Private keys are accepted both as a 32-byte seed and as the 64-byte
//! seed‖public concatenation emitted by libsodium-based tooling; public
//! keys are always 32 bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer, Verifier};

use crate::{Result, TransportError};

/// An Ed25519 signing key (private key).
pub struct SigningKey {
    inner: ed25519_dalek::SigningKey,
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(&self.inner.to_bytes()),
        }
    }
}

/// An Ed25519 verification key (public key).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: ed25519_dalek::VerifyingKey,
}

/// A signing/verification key pair.
pub struct KeyPair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Import a signing key from its base64 form. Accepts a 32-byte seed
    /// or a 64-byte seed‖public concatenation.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| TransportError::InvalidKey(format!("not valid base64: {e}")))?;
        let seed: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .map_err(|_| TransportError::InvalidKey("seed truncated".to_string()))?,
            other => {
                return Err(TransportError::InvalidKey(format!(
                    "private key must be 32 or 64 bytes, got {other}"
                )))
            }
        };
        Ok(Self {
            inner: ed25519_dalek::SigningKey::from_bytes(&seed),
        })
    }

    /// Export the 32-byte seed as base64.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.inner.to_bytes())
    }

    /// The corresponding verification key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Sign a message, returning the 64-byte detached signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.inner.sign(message).to_bytes()
    }
}

impl VerifyingKey {
    /// Import a verification key from its base64 form (32 bytes).
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| TransportError::InvalidKey(format!("not valid base64: {e}")))?;
        let raw: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            TransportError::InvalidKey(format!("public key must be 32 bytes, got {}", bytes.len()))
        })?;
        let inner = ed25519_dalek::VerifyingKey::from_bytes(&raw)
            .map_err(|e| TransportError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Export the key as base64.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.inner.to_bytes())
    }

    /// Verify a 64-byte detached signature over a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let raw: [u8; 64] = signature
            .try_into()
            .map_err(|_| TransportError::InvalidSignature)?;
        let signature = ed25519_dalek::Signature::from_bytes(&raw);
        self.inner
            .verify(message, &signature)
            .map_err(|_| TransportError::InvalidSignature)
    }
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate();
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("public", &self.verifying_key().to_base64())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let pair = KeyPair::generate();
        let signature = pair.signing_key.sign(b"test message");
        assert!(pair.verifying_key.verify(b"test message", &signature).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let pair = KeyPair::generate();
        let signature = pair.signing_key.sign(b"correct message");
        assert!(pair
            .verifying_key
            .verify(b"wrong message", &signature)
            .is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let pair1 = KeyPair::generate();
        let pair2 = KeyPair::generate();
        let signature = pair1.signing_key.sign(b"test");
        assert!(pair2.verifying_key.verify(b"test", &signature).is_err());
    }

    #[test]
    fn test_base64_roundtrip() {
        let pair = KeyPair::generate();
        let restored = SigningKey::from_base64(&pair.signing_key.to_base64()).expect("valid key");
        assert_eq!(
            restored.verifying_key().to_base64(),
            pair.verifying_key.to_base64()
        );
    }

    #[test]
    fn test_sixty_four_byte_private_key_accepted() {
        // libsodium emits seed || public as the "private key".
        let pair = KeyPair::generate();
        let mut combined = Vec::with_capacity(64);
        combined.extend_from_slice(&BASE64.decode(pair.signing_key.to_base64()).expect("base64"));
        combined.extend_from_slice(&BASE64.decode(pair.verifying_key.to_base64()).expect("base64"));
        let restored =
            SigningKey::from_base64(&BASE64.encode(&combined)).expect("64-byte key accepted");
        assert_eq!(
            restored.verifying_key().to_base64(),
            pair.verifying_key.to_base64()
        );
    }

    #[test]
    fn test_invalid_key_material_rejected() {
        assert!(SigningKey::from_base64("@@@").is_err());
        assert!(SigningKey::from_base64(&BASE64.encode([0u8; 16])).is_err());
        assert!(VerifyingKey::from_base64(&BASE64.encode([0u8; 16])).is_err());
    }

    #[test]
    fn test_signing_key_debug_hides_secret() {
        let pair = KeyPair::generate();
        let debug = format!("{:?}", pair.signing_key);
        assert!(!debug.contains(&pair.signing_key.to_base64()));
    }
}
