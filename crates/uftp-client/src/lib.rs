//! # uftp-client
//!
//! Outbound client for UFTP participants.
//!
//! [`UftpClient`](client::UftpClient) performs one sealed send: it stamps
//! the common payload metadata, seals the message with the sender's
//! private key, wraps it in a `SignedMessage` envelope and POSTs it to the
//! recipient endpoint. Six role-pair clients ([`AgrCroClient`], …) expose
//! one typed `send_<kind>` method per message kind the routing matrix
//! allows for that pair.
//!
//! The queued variant ([`UftpClient::enqueue`](client::UftpClient::enqueue))
//! retries failed deliveries on an exponential backoff schedule and hands
//! the eventual response to a callback.
//!
//! An optional [`TokenManager`](oauth::TokenManager) injects an OAuth2
//! client-credentials bearer token into every outbound request.

pub mod client;
pub mod oauth;
pub mod queue;
mod scheduler;

mod agr_cro;
mod agr_dso;
mod cro_agr;
mod cro_dso;
mod dso_agr;
mod dso_cro;

pub use agr_cro::AgrCroClient;
pub use agr_dso::AgrDsoClient;
pub use client::{ClientConfig, ClientParams, UftpClient};
pub use cro_agr::CroAgrClient;
pub use cro_dso::CroDsoClient;
pub use dso_agr::DsoAgrClient;
pub use dso_cro::DsoCroClient;
pub use oauth::{OAuthConfig, TokenManager};
pub use queue::DeliveryCallback;

use uftp_discovery::DiscoveryError;
use uftp_messages::MessageError;
use uftp_transport::TransportError;

/// Error types for outbound operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The message failed validation before sealing, or a response failed
    /// schema validation.
    #[error(transparent)]
    Message(#[from] MessageError),

    /// Sealing or unsealing failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The recipient's endpoint or key could not be resolved.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The HTTP request itself failed (connection refused, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The recipient answered with a non-200 status.
    #[error("request was not successful: HTTP {status}: {body}")]
    ErrorResponse { status: u16, body: String },

    /// A bearer token could not be obtained from the OAuth server.
    #[error("authorization error: {0}")]
    Authorization(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
