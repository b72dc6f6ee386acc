//! # uftp-service
//!
//! The role-aware service endpoint for UFTP participants.
//!
//! A service exposes one HTTP route (default
//! `POST /shapeshifter/api/v3/message`). Incoming envelopes are unsealed
//! and checked synchronously; the HTTP exchange always ends with an empty
//! 200 for well-formed, well-signed requests, and the business work runs
//! afterwards on a bounded worker pool. Functionally invalid messages
//! (mismatching sender, unacceptable kind) are answered asynchronously
//! with a `Result=Rejected` response envelope built from the routing
//! matrix.
//!
//! Three facades specialise the engine per role: [`AgrService`],
//! [`CroService`] and [`DsoService`]. Each requires a handler
//! implementation covering exactly the message kinds that role accepts,
//! and offers peer-client factories for the roles it talks to.

pub mod agr;
pub mod config;
pub mod cro;
pub mod dso;
pub mod error;
pub mod lookup;
pub mod server;
mod workers;

pub use agr::{AgrHandler, AgrService};
pub use config::ServiceConfig;
pub use cro::{CroHandler, CroService};
pub use dso::{DsoHandler, DsoService};
pub use error::FunctionalError;
pub use lookup::{OauthLookup, Resolvers};
pub use server::{ServiceCore, ServiceState};

/// Error types for running a service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The listener could not be bound or the server failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The configuration is unusable (unreadable file, bad key material).
    #[error("configuration error: {0}")]
    Config(String),

    /// A peer client could not be built.
    #[error(transparent)]
    Client(#[from] uftp_client::ClientError),
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
