//! Lookup traits and the static directory.
//!
//! Services and clients resolve peers through these traits. The default
//! implementation is [`DnsDiscovery`](crate::dns::DnsDiscovery); closed
//! deployments and tests plug in a [`StaticDirectory`] instead.

use std::collections::HashMap;

use async_trait::async_trait;

use uftp_messages::Role;

use crate::{DiscoveryError, Result};

/// Resolves a participant's public signing key (base64, 32 bytes).
#[async_trait]
pub trait KeyLookup: Send + Sync {
    async fn signing_key(&self, domain: &str, role: Role) -> Result<String>;
}

/// Resolves a participant's HTTP endpoint URL.
#[async_trait]
pub trait EndpointLookup: Send + Sync {
    async fn endpoint(&self, domain: &str, role: Role) -> Result<String>;
}

/// An in-memory participant directory.
///
/// Useful for tests and for deployments where the set of peers is fixed
/// and exchanged out-of-band instead of published in DNS.
#[derive(Clone, Debug, Default)]
pub struct StaticDirectory {
    keys: HashMap<(String, Role), String>,
    endpoints: HashMap<(String, Role), String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant's signing key and endpoint.
    pub fn register(
        mut self,
        domain: &str,
        role: Role,
        signing_key: &str,
        endpoint: &str,
    ) -> Self {
        self.keys
            .insert((domain.to_string(), role), signing_key.to_string());
        self.endpoints
            .insert((domain.to_string(), role), endpoint.to_string());
        self
    }

    fn unknown(&self, domain: &str, role: Role) -> DiscoveryError {
        DiscoveryError::UnknownParticipant {
            domain: domain.to_string(),
            role,
        }
    }
}

#[async_trait]
impl KeyLookup for StaticDirectory {
    async fn signing_key(&self, domain: &str, role: Role) -> Result<String> {
        self.keys
            .get(&(domain.to_string(), role))
            .cloned()
            .ok_or_else(|| self.unknown(domain, role))
    }
}

#[async_trait]
impl EndpointLookup for StaticDirectory {
    async fn endpoint(&self, domain: &str, role: Role) -> Result<String> {
        self.endpoints
            .get(&(domain.to_string(), role))
            .cloned()
            .ok_or_else(|| self.unknown(domain, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory() {
        let directory = StaticDirectory::new().register(
            "agr.dev",
            Role::Agr,
            "a-base64-key",
            "http://localhost:9001/shapeshifter/api/v3/message",
        );

        let key = directory
            .signing_key("agr.dev", Role::Agr)
            .await
            .expect("registered key");
        assert_eq!(key, "a-base64-key");

        assert!(directory.signing_key("agr.dev", Role::Dso).await.is_err());
        assert!(directory.endpoint("cro.dev", Role::Cro).await.is_err());
    }
}
