//! Resolver bundle handed to a service at construction.

use std::sync::Arc;

use uftp_client::OAuthConfig;
use uftp_discovery::{DnsDiscovery, EndpointLookup, KeyLookup, StaticDirectory};
use uftp_messages::Role;

/// Supplies the OAuth configuration for peers that protect their endpoint
/// with a bearer token. Returning `None` sends no `Authorization` header.
pub trait OauthLookup: Send + Sync {
    fn oauth_config(&self, domain: &str, role: Role) -> Option<OAuthConfig>;
}

/// The lookups a service uses to reach its peers.
#[derive(Clone)]
pub struct Resolvers {
    pub key_lookup: Arc<dyn KeyLookup>,
    pub endpoint_lookup: Arc<dyn EndpointLookup>,
    pub oauth_lookup: Option<Arc<dyn OauthLookup>>,
}

impl Resolvers {
    /// Resolve peers through the well-known DNS names.
    pub fn dns() -> Self {
        let discovery = Arc::new(DnsDiscovery::new());
        Self {
            key_lookup: discovery.clone(),
            endpoint_lookup: discovery,
            oauth_lookup: None,
        }
    }

    /// Resolve peers through a fixed directory.
    pub fn from_directory(directory: StaticDirectory) -> Self {
        let directory = Arc::new(directory);
        Self {
            key_lookup: directory.clone(),
            endpoint_lookup: directory,
            oauth_lookup: None,
        }
    }

    /// Attach an OAuth lookup.
    pub fn with_oauth(mut self, oauth_lookup: Arc<dyn OauthLookup>) -> Self {
        self.oauth_lookup = Some(oauth_lookup);
        self
    }
}
