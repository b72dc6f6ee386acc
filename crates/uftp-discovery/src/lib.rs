//! # uftp-discovery
//!
//! Service discovery for UFTP participants.
//!
//! Peers publish three kinds of records under well-known DNS names:
//!
//! - `_usef.<domain>` TXT — the protocol version (`X.Y.Z`)
//! - `_<role>._usef.<domain>` TXT — `cs1.` + base64 public key material
//! - `_http._<role>._usef.<domain>` CNAME — the endpoint host, from which
//!   the URL `https://<target>/shapeshifter/api/v<major>/message` is built
//!
//! [`DnsDiscovery`](dns::DnsDiscovery) resolves all three behind a
//! one-hour TTL cache. The [`KeyLookup`](resolver::KeyLookup) /
//! [`EndpointLookup`](resolver::EndpointLookup) traits are the seams the
//! client and service consume, so deployments can substitute a static
//! directory or their own registry instead of DNS.

pub mod cache;
pub mod dns;
pub mod resolver;

pub use cache::TtlCache;
pub use dns::{DnsDiscovery, KeyRecord};
pub use resolver::{EndpointLookup, KeyLookup, StaticDirectory};

/// Error types for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The well-known DNS name does not exist (NXDOMAIN).
    #[error("could not resolve {0}: DNS name not found")]
    NameNotFound(String),

    /// No DNS server could answer (SERVFAIL or network trouble). This is a
    /// local problem, not a problem with the remote participant.
    #[error(
        "could not resolve {0} because no DNS server was available. \
         Check your own network and resolver configuration; this is not \
         a problem with the receiving participant"
    )]
    Unavailable(String),

    /// The key record exists but is not `cs1.` + base64 of 32 or 64 bytes.
    #[error("invalid key record at {name}: {detail}")]
    InvalidKeyRecord { name: String, detail: String },

    /// The version record exists but is not in `X.Y.Z` form.
    #[error("the version published at {name} is not in the format X.Y.Z: {value}")]
    InvalidVersion { name: String, value: String },

    /// The participant is not listed (static directories only).
    #[error("participant {domain} ({role}) is not known to this directory")]
    UnknownParticipant {
        domain: String,
        role: uftp_messages::Role,
    },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
