//! The generic sealed-send client.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use uftp_discovery::{EndpointLookup, KeyLookup};
use uftp_messages::{codec, MessageFill, Payload, Role, SignedMessage, UftpMessage};
use uftp_transport::keys::{SigningKey, VerifyingKey};
use uftp_transport::seal::{seal, unseal};

use crate::oauth::TokenManager;
use crate::queue::{DeliveryCallback, DeliveryQueue};
use crate::{ClientError, Result};

/// Tunables for one client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// HTTP timeout for one delivery attempt.
    pub request_timeout: Duration,
    /// Number of workers draining the delivery queue.
    pub num_outgoing_workers: usize,
    /// How often a queued message is attempted before it is dropped.
    pub num_delivery_attempts: u32,
    /// Multiplier of the exponential backoff schedule.
    pub exponential_retry_factor: f64,
    /// Base of the exponential backoff schedule; attempt `n` is retried
    /// after `factor * base^n` seconds.
    pub exponential_retry_base: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            num_outgoing_workers: 10,
            num_delivery_attempts: 10,
            exponential_retry_factor: 1.0,
            exponential_retry_base: 2.0,
        }
    }
}

/// Everything needed to construct a client for one peer.
pub struct ClientParams {
    /// Our own domain, stamped into every outgoing message.
    pub sender_domain: String,
    /// Our private signing key.
    pub signing_key: Arc<SigningKey>,
    /// The peer's domain.
    pub recipient_domain: String,
    /// The peer's endpoint URL. Resolved through `endpoint_lookup` when
    /// absent.
    pub recipient_endpoint: Option<String>,
    /// The peer's public signing key. Resolved through `key_lookup` when
    /// absent.
    pub recipient_signing_key: Option<VerifyingKey>,
    /// Resolver for peer signing keys.
    pub key_lookup: Arc<dyn KeyLookup>,
    /// Resolver for peer endpoints.
    pub endpoint_lookup: Arc<dyn EndpointLookup>,
    /// Bearer-token manager for peers that require OAuth.
    pub oauth: Option<Arc<TokenManager>>,
    /// Tunables.
    pub config: ClientConfig,
}

pub(crate) struct ClientInner {
    sender_domain: String,
    sender_role: Role,
    recipient_domain: String,
    recipient_role: Role,
    signing_key: Arc<SigningKey>,
    recipient_endpoint: Option<String>,
    recipient_signing_key: Option<VerifyingKey>,
    key_lookup: Arc<dyn KeyLookup>,
    endpoint_lookup: Arc<dyn EndpointLookup>,
    oauth: Option<Arc<TokenManager>>,
    http: reqwest::Client,
    config: ClientConfig,
}

/// Sends sealed messages to one recipient.
///
/// Cloning is cheap; clones share the HTTP connection pool and the
/// delivery queue.
#[derive(Clone)]
pub struct UftpClient {
    inner: Arc<ClientInner>,
    queue: Arc<OnceLock<DeliveryQueue>>,
}

impl UftpClient {
    /// Build a client for one `(sender_role, recipient_role)` pair. The
    /// role-pair clients pass their fixed roles here.
    pub fn new(sender_role: Role, recipient_role: Role, params: ClientParams) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(params.config.request_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                sender_domain: params.sender_domain,
                sender_role,
                recipient_domain: params.recipient_domain,
                recipient_role,
                signing_key: params.signing_key,
                recipient_endpoint: params.recipient_endpoint,
                recipient_signing_key: params.recipient_signing_key,
                key_lookup: params.key_lookup,
                endpoint_lookup: params.endpoint_lookup,
                oauth: params.oauth,
                http,
                config: params.config,
            }),
            queue: Arc::new(OnceLock::new()),
        })
    }

    /// Our own role in this pairing.
    pub fn sender_role(&self) -> Role {
        self.inner.sender_role
    }

    /// The peer's role in this pairing.
    pub fn recipient_role(&self) -> Role {
        self.inner.recipient_role
    }

    /// The peer's domain.
    pub fn recipient_domain(&self) -> &str {
        &self.inner.recipient_domain
    }

    /// Send one message and wait for the HTTP exchange to finish.
    ///
    /// The common metadata is stamped before sealing: version, sender and
    /// recipient are always set by the framework, while timestamp and
    /// identifiers are generated only when unset. An empty 200 response
    /// yields `Ok(None)`; a non-empty response is unsealed with the
    /// peer's public key and returned.
    pub async fn send(&self, message: UftpMessage) -> Result<Option<UftpMessage>> {
        self.inner.send(message).await
    }

    /// Queue a message for delivery with retries.
    ///
    /// Failed attempts are rescheduled after `factor * base^attempt`
    /// seconds until `num_delivery_attempts` is exceeded, after which the
    /// message is logged and dropped. On success the callback receives
    /// the (possibly absent) response; a panicking callback is logged and
    /// never unwinds into the worker.
    pub fn enqueue(
        &self,
        message: UftpMessage,
        callback: impl FnOnce(Option<UftpMessage>) + Send + 'static,
    ) {
        self.enqueue_boxed(message, Box::new(callback));
    }

    /// As [`enqueue`](Self::enqueue), for an already-boxed callback.
    pub fn enqueue_boxed(&self, message: UftpMessage, callback: DeliveryCallback) {
        let queue = self
            .queue
            .get_or_init(|| DeliveryQueue::start(self.inner.clone()));
        queue.push(message, callback);
    }
}

impl ClientInner {
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn recipient_label(&self) -> (Role, &str) {
        (self.recipient_role, &self.recipient_domain)
    }

    pub(crate) async fn send(&self, mut message: UftpMessage) -> Result<Option<UftpMessage>> {
        message.fill(&MessageFill::now(
            &self.sender_domain,
            &self.recipient_domain,
        ));
        message.validate()?;

        let sealed = seal(&message, &self.signing_key)?;
        let envelope = SignedMessage {
            sender_domain: self.sender_domain.clone(),
            sender_role: self.sender_role,
            body: sealed,
        };
        let body = codec::envelope_to_xml(&envelope)?;

        let endpoint = match &self.recipient_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                self.endpoint_lookup
                    .endpoint(&self.recipient_domain, self.recipient_role)
                    .await?
            }
        };
        debug!(
            kind = %message.kind().name(),
            endpoint = %endpoint,
            "sending message"
        );

        let mut request = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body);
        if let Some(oauth) = &self.oauth {
            request = request.header(AUTHORIZATION, oauth.authorization_header().await?);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if status.as_u16() != 200 {
            return Err(ClientError::ErrorResponse {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        if bytes.is_empty() {
            return Ok(None);
        }

        let text = std::str::from_utf8(&bytes).map_err(|e| {
            ClientError::Message(uftp_messages::MessageError::Parse(format!(
                "response is not valid UTF-8: {e}"
            )))
        })?;
        let sealed_response = codec::envelope_from_xml(text)?;
        let recipient_key = match &self.recipient_signing_key {
            Some(key) => key.clone(),
            None => {
                let encoded = self
                    .key_lookup
                    .signing_key(&self.recipient_domain, self.recipient_role)
                    .await?;
                VerifyingKey::from_base64(&encoded)?
            }
        };
        Ok(Some(unseal(&sealed_response.body, &recipient_key)?))
    }
}
