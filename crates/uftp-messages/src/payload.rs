//! Common payload metadata shared by every UFTP business message.
//!
//! Every message carries the same six attributes (`Version`, `SenderDomain`,
//! `RecipientDomain`, `TimeStamp`, `MessageID`, `ConversationID`); responses
//! add `Result`, `RejectionReason` and `ReferenceMessageID`. The
//! [`uftp_payload!`], [`uftp_response!`] and [`uftp_flex_payload!`] macros
//! declare a message kind with those attributes inlined, and implement the
//! [`Payload`] / [`Response`] / [`Flex`] accessor traits for it.
//!
//! The sender-side framework fills the common attributes just before
//! sealing (see [`Payload::fill`]), so application code only provides the
//! business content.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::duration::IspDuration;
use crate::enums::AcceptedRejected;

/// The market-wide default time zone.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Amsterdam";

/// The protocol version stamped on outgoing messages.
pub const PROTOCOL_VERSION: &str = "3.0.0";

/// Values the framework stamps onto a message before sealing.
#[derive(Clone, Debug)]
pub struct MessageFill {
    pub version: String,
    pub sender_domain: String,
    pub recipient_domain: String,
    pub time_stamp: DateTime<FixedOffset>,
}

impl MessageFill {
    /// A fill for the current instant with the default protocol version.
    pub fn now(sender_domain: &str, recipient_domain: &str) -> Self {
        MessageFill {
            version: PROTOCOL_VERSION.to_string(),
            sender_domain: sender_domain.to_string(),
            recipient_domain: recipient_domain.to_string(),
            time_stamp: chrono::Utc::now().fixed_offset(),
        }
    }
}

/// Accessors for the common payload attributes.
pub trait Payload {
    fn version(&self) -> &str;
    fn sender_domain(&self) -> Option<&str>;
    fn recipient_domain(&self) -> Option<&str>;
    fn time_stamp(&self) -> Option<DateTime<FixedOffset>>;
    fn message_id(&self) -> Option<Uuid>;
    fn conversation_id(&self) -> Option<Uuid>;

    /// Overwrite the conversation identifier (used when correlating a
    /// response to its request).
    fn set_conversation_id(&mut self, id: Uuid);

    /// Overwrite or clear the message identifier.
    fn set_message_id(&mut self, id: Option<Uuid>);

    /// Overwrite or clear the creation timestamp.
    fn set_time_stamp(&mut self, time_stamp: Option<DateTime<FixedOffset>>);

    /// Stamp the common attributes. Version, sender and recipient are
    /// always overwritten; timestamp and identifiers are only generated
    /// when the application left them unset.
    fn fill(&mut self, fill: &MessageFill);

    /// Validate the common attributes: all six must be present, and the
    /// string-valued ones must match their schema patterns.
    fn validate_common(&self) -> crate::Result<()>;
}

/// Accessors for the common response attributes.
pub trait Response: Payload {
    fn result(&self) -> AcceptedRejected;
    fn rejection_reason(&self) -> Option<&str>;
    fn reference_message_id(&self) -> Option<Uuid>;
}

/// Accessors for the trading-message attributes common to all Flex* kinds.
pub trait Flex: Payload {
    fn isp_duration(&self) -> IspDuration;
    fn time_zone(&self) -> &str;
    fn period(&self) -> NaiveDate;
    fn congestion_point(&self) -> &str;

    /// Validate the Flex* attributes against the pattern table.
    fn validate_flex(&self) -> crate::Result<()>;
}

// Serde default functions, referenced by path from the macro expansions.

pub fn default_version() -> String {
    PROTOCOL_VERSION.to_string()
}

pub fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

pub fn default_duration() -> u32 {
    1
}

pub fn default_currency() -> String {
    "EUR".to_string()
}

/// Activation factor default of 1.00 (full activation).
pub fn default_activation_factor() -> Decimal {
    Decimal::new(100, 2)
}

/// Zero with four fraction digits, the default penalty.
pub fn default_penalty() -> Decimal {
    Decimal::new(0, 4)
}

/// Declare a UFTP payload message: the given struct grows the six common
/// attributes and implements [`Payload`].
macro_rules! uftp_payload {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            /// Version of the Shapeshifter specification used by the sender.
            #[serde(rename = "@Version", default = "crate::payload::default_version")]
            pub version: String,
            /// Internet domain of the sending participant. Must match the
            /// `SenderDomain` of the envelope, or the message is rejected.
            #[serde(rename = "@SenderDomain", default, skip_serializing_if = "Option::is_none")]
            pub sender_domain: Option<String>,
            /// Internet domain of the participant this message is intended for.
            #[serde(rename = "@RecipientDomain", default, skip_serializing_if = "Option::is_none")]
            pub recipient_domain: Option<String>,
            /// Creation time of this message, including the time zone.
            #[serde(rename = "@TimeStamp", default, skip_serializing_if = "Option::is_none")]
            pub time_stamp: Option<chrono::DateTime<chrono::FixedOffset>>,
            /// Unique identifier (RFC 4122) for this message.
            #[serde(rename = "@MessageID", default, skip_serializing_if = "Option::is_none")]
            pub message_id: Option<uuid::Uuid>,
            /// Correlates all messages belonging to one conversation.
            #[serde(rename = "@ConversationID", default, skip_serializing_if = "Option::is_none")]
            pub conversation_id: Option<uuid::Uuid>,
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl crate::payload::Payload for $name {
            fn version(&self) -> &str {
                &self.version
            }

            fn sender_domain(&self) -> Option<&str> {
                self.sender_domain.as_deref()
            }

            fn recipient_domain(&self) -> Option<&str> {
                self.recipient_domain.as_deref()
            }

            fn time_stamp(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
                self.time_stamp
            }

            fn message_id(&self) -> Option<uuid::Uuid> {
                self.message_id
            }

            fn conversation_id(&self) -> Option<uuid::Uuid> {
                self.conversation_id
            }

            fn set_conversation_id(&mut self, id: uuid::Uuid) {
                self.conversation_id = Some(id);
            }

            fn set_message_id(&mut self, id: Option<uuid::Uuid>) {
                self.message_id = id;
            }

            fn set_time_stamp(
                &mut self,
                time_stamp: Option<chrono::DateTime<chrono::FixedOffset>>,
            ) {
                self.time_stamp = time_stamp;
            }

            fn fill(&mut self, fill: &crate::payload::MessageFill) {
                self.version = fill.version.clone();
                self.sender_domain = Some(fill.sender_domain.clone());
                self.recipient_domain = Some(fill.recipient_domain.clone());
                if self.time_stamp.is_none() {
                    self.time_stamp = Some(fill.time_stamp);
                }
                if self.message_id.is_none() {
                    self.message_id = Some(uuid::Uuid::new_v4());
                }
                if self.conversation_id.is_none() {
                    self.conversation_id = Some(uuid::Uuid::new_v4());
                }
            }

            fn validate_common(&self) -> crate::Result<()> {
                use crate::validations as v;
                v::check_pattern("Version", &self.version, &v::VERSION)?;
                let sender = self.sender_domain.as_deref().ok_or(
                    crate::MessageError::MissingAttribute {
                        attribute: "SenderDomain",
                    },
                )?;
                v::check_pattern("SenderDomain", sender, &v::DOMAIN)?;
                let recipient = self.recipient_domain.as_deref().ok_or(
                    crate::MessageError::MissingAttribute {
                        attribute: "RecipientDomain",
                    },
                )?;
                v::check_pattern("RecipientDomain", recipient, &v::DOMAIN)?;
                if self.time_stamp.is_none() {
                    return Err(crate::MessageError::MissingAttribute {
                        attribute: "TimeStamp",
                    });
                }
                if self.message_id.is_none() {
                    return Err(crate::MessageError::MissingAttribute {
                        attribute: "MessageID",
                    });
                }
                if self.conversation_id.is_none() {
                    return Err(crate::MessageError::MissingAttribute {
                        attribute: "ConversationID",
                    });
                }
                Ok(())
            }
        }
    };
}
pub(crate) use uftp_payload;

/// Declare a UFTP response message: a payload that additionally carries
/// `Result`, `RejectionReason` and `ReferenceMessageID`, implements
/// [`Response`], and has a `Default` so rejections can be built from
/// scratch by the framework.
macro_rules! uftp_response {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        crate::payload::uftp_payload! {
            $(#[$meta])*
            pub struct $name {
                /// Indication whether the referenced message was executed
                /// successfully or rejected.
                #[serde(rename = "@Result", default)]
                pub result: crate::enums::AcceptedRejected,
                /// Human-readable description of the failure, when rejected.
                #[serde(rename = "@RejectionReason", default, skip_serializing_if = "Option::is_none")]
                pub rejection_reason: Option<String>,
                /// MessageID of the message that was accepted or rejected.
                #[serde(rename = "@ReferenceMessageID", default, skip_serializing_if = "Option::is_none")]
                pub reference_message_id: Option<uuid::Uuid>,
                $(
                    $(#[$fmeta])*
                    pub $field: $ty
                ),*
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    version: crate::payload::default_version(),
                    sender_domain: None,
                    recipient_domain: None,
                    time_stamp: None,
                    message_id: None,
                    conversation_id: None,
                    result: Default::default(),
                    rejection_reason: None,
                    reference_message_id: None,
                    $(
                        $field: Default::default()
                    ),*
                }
            }
        }

        impl crate::payload::Response for $name {
            fn result(&self) -> crate::enums::AcceptedRejected {
                self.result
            }

            fn rejection_reason(&self) -> Option<&str> {
                self.rejection_reason.as_deref()
            }

            fn reference_message_id(&self) -> Option<uuid::Uuid> {
                self.reference_message_id
            }
        }
    };
}
pub(crate) use uftp_response;

/// Declare a Flex* trading message: a payload that additionally carries
/// `ISP-Duration`, `TimeZone`, `Period` and `CongestionPoint`, and
/// implements [`Flex`].
macro_rules! uftp_flex_payload {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        crate::payload::uftp_payload! {
            $(#[$meta])*
            pub struct $name {
                /// Duration of the ISPs referenced in this message.
                #[serde(rename = "@ISP-Duration")]
                pub isp_duration: crate::duration::IspDuration,
                /// IANA time zone that applies to `Period`.
                #[serde(rename = "@TimeZone", default = "crate::payload::default_time_zone")]
                pub time_zone: String,
                /// Day the ISPs referenced in this message belong to.
                #[serde(rename = "@Period")]
                pub period: chrono::NaiveDate,
                /// Entity address of the congestion point this message
                /// applies to.
                #[serde(rename = "@CongestionPoint")]
                pub congestion_point: String,
                $(
                    $(#[$fmeta])*
                    pub $field: $ty
                ),*
            }
        }

        impl crate::payload::Flex for $name {
            fn isp_duration(&self) -> crate::duration::IspDuration {
                self.isp_duration
            }

            fn time_zone(&self) -> &str {
                &self.time_zone
            }

            fn period(&self) -> chrono::NaiveDate {
                self.period
            }

            fn congestion_point(&self) -> &str {
                &self.congestion_point
            }

            fn validate_flex(&self) -> crate::Result<()> {
                use crate::validations as v;
                v::check_pattern("TimeZone", &self.time_zone, &v::TIME_ZONE)?;
                v::check_pattern("CongestionPoint", &self.congestion_point, &v::ENTITY_ADDRESS)?;
                Ok(())
            }
        }
    };
}
pub(crate) use uftp_flex_payload;
