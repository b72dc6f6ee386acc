//! # uftp-messages
//!
//! Message model for the Shapeshifter UFTP 3.x protocol family.
//!
//! Every business message exchanged between energy-flexibility market
//! participants (AGR, CRO, DSO) is defined here, together with the XML
//! wire codec, a JSON companion codec, and the static routing matrix that
//! says which role may send which kind to which role.
//!
//! ## Modules
//!
//! - [`enums`] — protocol enumerations ([`Role`](enums::Role), result codes)
//! - [`duration`] — the ISO 8601 minutes-only ISP duration type
//! - [`payload`] — common payload metadata, the [`Payload`](payload::Payload)
//!   and [`Response`](payload::Response) traits
//! - [`signed_message`] — the `SignedMessage` transport envelope
//! - [`messages`] — one module per business message family
//! - [`kind`] — the [`UftpMessage`](kind::UftpMessage) union, kind tags and
//!   the routing matrix
//! - [`codec`] — XML and JSON marshalling
//! - [`validations`] — shared validation helpers and the pattern table

pub mod codec;
pub mod duration;
pub mod enums;
pub mod kind;
pub mod messages;
pub mod payload;
pub mod signed_message;
pub mod validations;

pub use codec::{from_json, from_xml, to_json, to_xml};
pub use duration::IspDuration;
pub use enums::{AcceptedDisputed, AcceptedRejected, AvailableRequested, RedispatchBy, Role};
pub use kind::{snake_case, MessageKind, Route, UftpMessage};
pub use payload::{MessageFill, Payload, Response};
pub use signed_message::SignedMessage;

/// Error types for message construction, validation and marshalling.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// XML or JSON could not be rendered.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The document could not be parsed into a known message kind.
    #[error("schema error: {0}")]
    Parse(String),

    /// A required attribute is absent.
    #[error("missing required attribute '{attribute}'")]
    MissingAttribute {
        /// XML attribute name.
        attribute: &'static str,
    },

    /// An attribute value does not match its declared pattern.
    #[error("value '{value}' for '{field}' does not match the required pattern")]
    PatternMismatch { field: &'static str, value: String },

    /// A value could not be interpreted as a decimal number.
    #[error("'{field}' must be a valid numeric value, not '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    /// A numeric value is outside its declared bounds.
    #[error("'{field}' value {value} is outside the range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// A list is shorter than its declared minimum length.
    #[error("length of list '{field}' must be {minimum} or greater, not {actual}")]
    ListTooShort {
        field: &'static str,
        minimum: usize,
        actual: usize,
    },

    /// Two ISP rows in the same series cover the same settlement period.
    #[error("ISP series '{field}' contains overlapping entries")]
    IspOverlap { field: &'static str },
}

/// Result type alias for message operations.
pub type Result<T> = std::result::Result<T, MessageError>;
