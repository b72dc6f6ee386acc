//! Functional errors: protocol-level rejections.
//!
//! Unlike transport errors, these do not surface as HTTP failures. The
//! original request is acknowledged with HTTP 200 and a well-formed
//! response with `Result=Rejected` and the reason below travels back to
//! the sender asynchronously.
//!
//! The framework itself only raises [`FunctionalError::InvalidSender`]
//! and [`FunctionalError::InvalidMessage`]; the remaining variants are
//! standardised reasons for application handlers to use when they reject
//! a message on business grounds.

/// A protocol-level rejection and its human-readable reason.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FunctionalError {
    /// Despite being schema-compliant, the type or semantics of the
    /// message are unacceptable for the receiving implementation.
    #[error("Invalid Message: '{0}'")]
    InvalidMessage(String),

    /// The SenderDomain of the envelope does not match the one inside
    /// the sealed message.
    #[error("Invalid Sender")]
    InvalidSender,

    /// The RecipientDomain of the inner message is not handled by this
    /// endpoint.
    #[error("Unknown Recipient")]
    UnknownRecipient,

    /// This endpoint explicitly blocks messages from this sender.
    #[error("Barred Sender")]
    BarredSender,

    /// The MessageID was already used for a message with different
    /// content.
    #[error("Duplicate Identifier")]
    DuplicateIdentifier,

    /// The MessageID was already used for an identical message; the copy
    /// counts as successfully submitted.
    #[error("Already Submitted")]
    AlreadySubmitted,

    /// The ISP duration is not the agreed market-wide value.
    #[error("ISP Duration Rejected")]
    IspDurationRejected,

    /// The time zone has a different UTC offset than the market-wide
    /// value.
    #[error("TimeZone Rejected")]
    TimeZoneRejected,

    /// Unknown congestion point, or the recipient is not active there.
    #[error("Invalid Congestion Point")]
    InvalidCongestionPoint,

    /// The referenced message is unknown.
    #[error("Unknown Reference")]
    UnknownReference,

    /// The referenced message concerns a different period.
    #[error("Reference Period Mismatch")]
    ReferencePeriodMismatch,

    /// The referenced message has expired.
    #[error("Reference Message Expired")]
    ReferenceMessageExpired,

    /// The referenced message has been revoked.
    #[error("Reference Message Revoked")]
    ReferenceMessageRevoked,

    /// One or more ISPs fall outside the period.
    #[error("ISPs Out Of Bounds")]
    IspsOutOfBounds,

    /// One or more ISPs are defined more than once.
    #[error("ISP Conflict")]
    IspConflict,

    /// The period of the message is inappropriate.
    #[error("Period Out Of Bounds")]
    PeriodOutOfBounds,

    /// The expiration moment is in the past or exceeds the ISPs in the
    /// message.
    #[error("Expiration DateTime Out Of Bounds")]
    ExpirationDateTimeOutOfBounds,

    /// The CRO operates in closed mode and the sender is not
    /// pre-registered.
    #[error("Unauthorized")]
    Unauthorized,

    /// A connection was previously registered at another congestion
    /// point.
    #[error("Connection conflict: {connection} at {congestion_point}")]
    ConnectionConflict {
        connection: String,
        congestion_point: String,
    },

    /// The message sequence is lower than a previously received one.
    #[error("Subordinate Sequence Number")]
    SubordinateSequenceNumber,
}

impl FunctionalError {
    /// The reason string placed in the `RejectionReason` attribute.
    pub fn rejection_reason(&self) -> String {
        self.to_string()
    }
}
