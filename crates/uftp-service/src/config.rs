//! Service configuration.
//!
//! Loadable from a TOML file; every field except the participant identity
//! has a default, so a minimal configuration is just `sender_domain` and
//! `signing_key`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use uftp_client::ClientConfig;

use crate::ServiceError;

/// Complete configuration of one service instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Our own domain (FQDN), used by peers to look us up.
    pub sender_domain: String,
    /// Base64 Ed25519 private key used to sign outgoing messages.
    pub signing_key: String,
    /// Host to bind the HTTP server to.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Port to bind the HTTP server to. 0 = OS-assigned ephemeral port.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    /// URL path the server listens on.
    #[serde(default = "default_path")]
    pub path: String,
    /// Workers running user message handlers.
    #[serde(default = "default_workers")]
    pub num_inbound_workers: usize,
    /// Workers delivering rejection responses and queued messages.
    #[serde(default = "default_workers")]
    pub num_outbound_workers: usize,
    /// Delivery attempts before a queued message is dropped.
    #[serde(default = "default_delivery_attempts")]
    pub num_delivery_attempts: u32,
    /// Timeout in seconds for one outbound HTTP request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Multiplier of the retry backoff schedule.
    #[serde(default = "default_retry_factor")]
    pub exponential_retry_factor: f64,
    /// Base of the retry backoff schedule.
    #[serde(default = "default_retry_base")]
    pub exponential_retry_base: f64,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/shapeshifter/api/v3/message".to_string()
}

fn default_workers() -> usize {
    10
}

fn default_delivery_attempts() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_retry_factor() -> f64 {
    1.0
}

fn default_retry_base() -> f64 {
    2.0
}

impl ServiceConfig {
    /// A configuration with all defaults for the given identity.
    pub fn new(sender_domain: &str, signing_key: &str) -> Self {
        Self {
            sender_domain: sender_domain.to_string(),
            signing_key: signing_key.to_string(),
            bind_host: default_bind_host(),
            bind_port: default_bind_port(),
            path: default_path(),
            num_inbound_workers: default_workers(),
            num_outbound_workers: default_workers(),
            num_delivery_attempts: default_delivery_attempts(),
            request_timeout_secs: default_request_timeout(),
            exponential_retry_factor: default_retry_factor(),
            exponential_retry_base: default_retry_base(),
        }
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.as_ref().display())))?;
        toml::from_str(&content)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.as_ref().display())))
    }

    /// The client tunables derived from this configuration, used for
    /// rejection deliveries and peer clients.
    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            num_outgoing_workers: self.num_outbound_workers,
            num_delivery_attempts: self.num_delivery_attempts,
            exponential_retry_factor: self.exponential_retry_factor,
            exponential_retry_base: self.exponential_retry_base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::new("dso.dev", "a-base64-key");
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.path, "/shapeshifter/api/v3/message");
        assert_eq!(config.num_inbound_workers, 10);
        assert_eq!(config.num_outbound_workers, 10);
        assert_eq!(config.num_delivery_attempts, 10);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_minimal_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            sender_domain = "agr.dev"
            signing_key = "a-base64-key"
            bind_port = 9001
            "#,
        )
        .expect("parse");
        assert_eq!(config.sender_domain, "agr.dev");
        assert_eq!(config.bind_port, 9001);
        assert_eq!(config.num_inbound_workers, 10);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ServiceConfig::new("cro.dev", "a-base64-key");
        let rendered = toml::to_string(&config).expect("serialize");
        let parsed: ServiceConfig = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed.sender_domain, config.sender_domain);
        assert_eq!(parsed.bind_port, config.bind_port);
    }
}
