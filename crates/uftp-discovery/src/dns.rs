//! DNS-backed discovery of peer endpoints, keys and protocol versions.
//!
//! Record layout per the UFTP 3.x service-discovery conventions:
//!
//! | Name | Type | Content |
//! |------|------|---------|
//! | `_usef.<domain>` | TXT | `X.Y.Z` |
//! | `_<role>._usef.<domain>` | TXT | `cs1.` + base64 of 32 or 64 bytes |
//! | `_http._<role>._usef.<domain>` | CNAME | endpoint host |

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use async_trait::async_trait;
use uftp_messages::{validations, Role};

use crate::cache::{TtlCache, DISCOVERY_TTL};
use crate::resolver::{EndpointLookup, KeyLookup};
use crate::{DiscoveryError, Result};

/// The public key material a participant publishes: a signing key and,
/// optionally, an encryption key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRecord {
    /// Base64 Ed25519 public signing key (32 bytes).
    pub signing_key: String,
    /// Base64 public encryption key (32 bytes), when published.
    pub encryption_key: Option<String>,
}

/// Resolves participants through the well-known DNS names, caching every
/// answer for one hour.
pub struct DnsDiscovery {
    resolver: TokioAsyncResolver,
    keys: TtlCache<(String, Role), KeyRecord>,
    endpoints: TtlCache<(String, Role), String>,
    versions: TtlCache<String, String>,
}

impl DnsDiscovery {
    /// Use the operating system's resolver configuration.
    pub fn from_system_conf() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| DiscoveryError::Unavailable(format!("system resolver: {e}")))?;
        Ok(Self::with_resolver(resolver))
    }

    /// Use the default public resolver configuration.
    pub fn new() -> Self {
        Self::with_resolver(TokioAsyncResolver::tokio(
            ResolverConfig::default(),
            ResolverOpts::default(),
        ))
    }

    /// Wrap an explicitly configured resolver.
    pub fn with_resolver(resolver: TokioAsyncResolver) -> Self {
        Self {
            resolver,
            keys: TtlCache::new(DISCOVERY_TTL),
            endpoints: TtlCache::new(DISCOVERY_TTL),
            versions: TtlCache::new(DISCOVERY_TTL),
        }
    }

    /// The protocol version a participant publishes at `_usef.<domain>`.
    pub async fn version(&self, domain: &str) -> Result<String> {
        if let Some(version) = self.versions.get(&domain.to_string()) {
            return Ok(version);
        }
        let name = format!("_usef.{domain}");
        let content = self.first_txt(&name).await?;
        let version = content.trim().to_string();
        if !validations::VERSION.is_match(&version) {
            return Err(DiscoveryError::InvalidVersion {
                name,
                value: version,
            });
        }
        self.versions.insert(domain.to_string(), version.clone());
        Ok(version)
    }

    /// The message endpoint URL for a participant, composed from the
    /// published CNAME target and the major protocol version.
    pub async fn endpoint(&self, domain: &str, role: Role) -> Result<String> {
        let cache_key = (domain.to_string(), role);
        if let Some(endpoint) = self.endpoints.get(&cache_key) {
            return Ok(endpoint);
        }
        let name = format!("_http._{}._usef.{domain}", role.dns_label());
        let target = self.cname_target(&name).await?;
        let version = self.version(domain).await?;
        let major = version.split('.').next().unwrap_or("3");
        let endpoint = format!(
            "https://{}/shapeshifter/api/v{major}/message",
            target.trim_end_matches('.')
        );
        debug!(domain, role = %role, endpoint, "resolved endpoint");
        self.endpoints.insert(cache_key, endpoint.clone());
        Ok(endpoint)
    }

    /// The public key material a participant publishes for one role.
    pub async fn keys(&self, domain: &str, role: Role) -> Result<KeyRecord> {
        let cache_key = (domain.to_string(), role);
        if let Some(record) = self.keys.get(&cache_key) {
            return Ok(record);
        }
        let name = format!("_{}._usef.{domain}", role.dns_label());
        let content = self.first_txt(&name).await?;
        let record = parse_key_record(&name, &content)?;
        self.keys.insert(cache_key, record.clone());
        Ok(record)
    }

    async fn first_txt(&self, name: &str) -> Result<String> {
        let lookup = self
            .resolver
            .txt_lookup(name.to_string())
            .await
            .map_err(|e| classify(name, e))?;
        let record = lookup
            .iter()
            .next()
            .ok_or_else(|| DiscoveryError::NameNotFound(name.to_string()))?;
        let mut content = String::new();
        for chunk in record.txt_data() {
            content.push_str(&String::from_utf8_lossy(chunk));
        }
        Ok(content)
    }

    async fn cname_target(&self, name: &str) -> Result<String> {
        let lookup = self
            .resolver
            .lookup(name.to_string(), RecordType::CNAME)
            .await
            .map_err(|e| classify(name, e))?;
        for record in lookup.record_iter() {
            if let Some(RData::CNAME(target)) = record.data() {
                return Ok(target.0.to_utf8());
            }
        }
        Err(DiscoveryError::NameNotFound(name.to_string()))
    }
}

impl Default for DnsDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyLookup for DnsDiscovery {
    async fn signing_key(&self, domain: &str, role: Role) -> Result<String> {
        Ok(self.keys(domain, role).await?.signing_key)
    }
}

#[async_trait]
impl EndpointLookup for DnsDiscovery {
    async fn endpoint(&self, domain: &str, role: Role) -> Result<String> {
        DnsDiscovery::endpoint(self, domain, role).await
    }
}

fn classify(name: &str, err: ResolveError) -> DiscoveryError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::ServFail {
                DiscoveryError::Unavailable(name.to_string())
            } else {
                DiscoveryError::NameNotFound(name.to_string())
            }
        }
        _ => DiscoveryError::Unavailable(name.to_string()),
    }
}

/// Parse the content of a published key record: `cs1.` followed by the
/// base64 of either 32 bytes (signing key only) or 64 bytes (signing key
/// followed by encryption key).
pub fn parse_key_record(name: &str, content: &str) -> Result<KeyRecord> {
    let content = content.trim();
    let invalid = |detail: String| DiscoveryError::InvalidKeyRecord {
        name: name.to_string(),
        detail,
    };

    let encoded = content
        .strip_prefix("cs1.")
        .ok_or_else(|| invalid(format!("must start with 'cs1.', was: {content}")))?;
    let combined = BASE64
        .decode(encoded)
        .map_err(|e| invalid(format!("'{encoded}' is not valid base64: {e}")))?;

    match combined.len() {
        32 => Ok(KeyRecord {
            signing_key: BASE64.encode(&combined),
            encryption_key: None,
        }),
        64 => Ok(KeyRecord {
            signing_key: BASE64.encode(&combined[..32]),
            encryption_key: Some(BASE64.encode(&combined[32..])),
        }),
        other => Err(invalid(format!(
            "decoded key data should be 32 or 64 bytes long, length is: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signing_key_only() {
        let signing = [7u8; 32];
        let content = format!("cs1.{}", BASE64.encode(signing));
        let record = parse_key_record("_agr._usef.agr.dev", &content).expect("valid record");
        assert_eq!(record.signing_key, BASE64.encode(signing));
        assert!(record.encryption_key.is_none());
    }

    #[test]
    fn test_parse_combined_keys() {
        let mut combined = vec![1u8; 32];
        combined.extend_from_slice(&[2u8; 32]);
        let content = format!("cs1.{}", BASE64.encode(&combined));
        let record = parse_key_record("_dso._usef.dso.dev", &content).expect("valid record");
        assert_eq!(record.signing_key, BASE64.encode([1u8; 32]));
        assert_eq!(record.encryption_key, Some(BASE64.encode([2u8; 32])));
    }

    #[test]
    fn test_parse_rejects_wrong_prefix() {
        let content = format!("cs2.{}", BASE64.encode([0u8; 32]));
        assert!(parse_key_record("_agr._usef.agr.dev", &content).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let content = format!("cs1.{}", BASE64.encode([0u8; 48]));
        assert!(parse_key_record("_agr._usef.agr.dev", &content).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_base64() {
        assert!(parse_key_record("_agr._usef.agr.dev", "cs1.!!!").is_err());
    }
}
