//! # uftp-transport
//!
//! Signed-envelope transport for UFTP messages.
//!
//! A payload travels as a *sealed* blob: the UTF-8 XML of the message with
//! its 64-byte Ed25519 signature prepended. The blob is base64-framed into
//! a `SignedMessage` envelope by the client; this crate provides the
//! [`seal`](seal::seal) / [`unseal`](seal::unseal) pair and the key
//! material wrappers.
//!
//! The cryptographic suite is fixed (`cs1.`, plain Ed25519 signatures);
//! no negotiation takes place.

pub mod keys;
pub mod seal;

/// Error types for transport operations. Each variant maps onto the HTTP
/// status a service endpoint answers with.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request carries no Content-Length header.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// The request's Content-Type is not `text/xml` with UTF-8 charset.
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// The originating participant is sending too many requests.
    #[error("too many requests")]
    TooManyRequests,

    /// The XML body cannot be parsed or does not comply with the schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// The sender's public key could not be resolved.
    #[error("authentication timeout: {0}")]
    AuthenticationTimeout(String),

    /// The sealed message does not verify against the sender's public key.
    #[error("invalid signature")]
    InvalidSignature,

    /// Key material is malformed (wrong length, not valid base64).
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

impl TransportError {
    /// The HTTP status code a service endpoint reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            TransportError::MissingContentLength => 411,
            TransportError::InvalidContentType(_) => 400,
            TransportError::TooManyRequests => 429,
            TransportError::Schema(_) => 400,
            TransportError::AuthenticationTimeout(_) => 419,
            TransportError::InvalidKey(_) => 419,
            TransportError::InvalidSignature => 401,
        }
    }
}

impl From<uftp_messages::MessageError> for TransportError {
    fn from(err: uftp_messages::MessageError) -> Self {
        TransportError::Schema(err.to_string())
    }
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
