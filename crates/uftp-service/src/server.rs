//! The service engine: HTTP endpoint, envelope checks, worker pools and
//! the asynchronous rejection path.
//!
//! ## Request lifecycle
//!
//! `received → parsed → unsealed → accepted → enqueued → processed`
//!
//! Transport failures (unparseable envelope, unresolvable key, bad
//! signature) end the HTTP exchange with their mapped status code.
//! Functional failures (mismatching sender, unacceptable kind) still get
//! an empty 200; the rejection response is built from the routing matrix
//! and delivered asynchronously by the outbound pool. Handler errors are
//! logged and never crash a worker.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::sync::{watch, Mutex, Notify};
use tracing::{error, info, warn};

use uftp_client::{ClientParams, TokenManager, UftpClient};
use uftp_messages::kind::build_rejection;
use uftp_messages::{codec, MessageKind, Payload, Role, SignedMessage, UftpMessage};
use uftp_transport::keys::{SigningKey, VerifyingKey};
use uftp_transport::seal::unseal;
use uftp_transport::TransportError;

use crate::config::ServiceConfig;
use crate::error::FunctionalError;
use crate::lookup::Resolvers;
use crate::workers::WorkerPool;
use crate::{Result, ServiceError};

/// Dispatches an accepted inbound message to the role-specific handler.
/// Implemented by the per-role facades.
#[async_trait]
pub trait InboundDispatch: Send + Sync + 'static {
    async fn dispatch(&self, message: UftpMessage) -> anyhow::Result<()>;
}

/// Lifecycle of a service instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Init,
    Running,
    Stopping,
    Stopped,
}

const STATE_INIT: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;
const STATE_STOPPED: u8 = 3;

/// A rejection waiting to be delivered back to the sender.
struct RejectJob {
    recipient_domain: String,
    recipient_role: Role,
    original: UftpMessage,
    reason: String,
}

/// Everything the outbound pool needs to deliver a rejection without
/// holding a reference back to the engine.
struct RejectContext {
    role: Role,
    sender_domain: String,
    signing_key: Arc<SigningKey>,
    resolvers: Resolvers,
    client_config: uftp_client::ClientConfig,
}

impl RejectContext {
    async fn send_rejection(&self, job: RejectJob) {
        let Some(rejection) = build_rejection(&job.original, &job.reason) else {
            // Response kinds have no response pairing; nothing to send.
            return;
        };

        let oauth = self
            .resolvers
            .oauth_lookup
            .as_ref()
            .and_then(|lookup| lookup.oauth_config(&job.recipient_domain, job.recipient_role))
            .and_then(|config| match TokenManager::new(config) {
                Ok(manager) => Some(Arc::new(manager)),
                Err(err) => {
                    error!(error = %err, "could not set up OAuth for rejection delivery");
                    None
                }
            });

        let params = ClientParams {
            sender_domain: self.sender_domain.clone(),
            signing_key: Arc::clone(&self.signing_key),
            recipient_domain: job.recipient_domain.clone(),
            recipient_endpoint: None,
            recipient_signing_key: None,
            key_lookup: Arc::clone(&self.resolvers.key_lookup),
            endpoint_lookup: Arc::clone(&self.resolvers.endpoint_lookup),
            oauth,
            config: self.client_config.clone(),
        };
        let client = match UftpClient::new(self.role, job.recipient_role, params) {
            Ok(client) => client,
            Err(err) => {
                error!(error = %err, "could not build client for rejection delivery");
                return;
            }
        };

        match client.send(rejection).await {
            Ok(_) => info!(
                recipient = %job.recipient_domain,
                reason = %job.reason,
                "delivered rejection response"
            ),
            Err(err) => error!(
                recipient = %job.recipient_domain,
                reason = %job.reason,
                error = %err,
                "could not deliver rejection response"
            ),
        }
    }
}

/// The role-agnostic service engine. The role facades construct one and
/// plug in their dispatcher.
pub struct ServiceCore {
    config: ServiceConfig,
    role: Role,
    signing_key: Arc<SigningKey>,
    resolvers: Resolvers,
    inbound: WorkerPool<UftpMessage>,
    outbound: WorkerPool<RejectJob>,
    state: AtomicU8,
    shutdown: Notify,
    bound_addr: watch::Sender<Option<SocketAddr>>,
    bound_addr_rx: watch::Receiver<Option<SocketAddr>>,
    server_task: Mutex<Option<tokio::task::JoinHandle<Result<()>>>>,
}

impl ServiceCore {
    /// Build the engine and spawn its worker pools. Must be called
    /// within a Tokio runtime.
    pub fn new(
        role: Role,
        config: ServiceConfig,
        dispatcher: Arc<dyn InboundDispatch>,
        resolvers: Resolvers,
    ) -> Result<Arc<Self>> {
        let signing_key = Arc::new(
            SigningKey::from_base64(&config.signing_key)
                .map_err(|e| ServiceError::Config(format!("signing key: {e}")))?,
        );

        let inbound = WorkerPool::start(config.num_inbound_workers, move |message: UftpMessage| {
            let dispatcher = Arc::clone(&dispatcher);
            async move {
                let kind = message.kind();
                if let Err(err) = dispatcher.dispatch(message).await {
                    error!(kind = kind.name(), error = %err, "message handler failed");
                }
            }
        });

        let context = Arc::new(RejectContext {
            role,
            sender_domain: config.sender_domain.clone(),
            signing_key: Arc::clone(&signing_key),
            resolvers: resolvers.clone(),
            client_config: config.client_config(),
        });
        let outbound = WorkerPool::start(config.num_outbound_workers, move |job: RejectJob| {
            let context = Arc::clone(&context);
            async move { context.send_rejection(job).await }
        });

        let (bound_addr, bound_addr_rx) = watch::channel(None);
        Ok(Arc::new(Self {
            config,
            role,
            signing_key,
            resolvers,
            inbound,
            outbound,
            state: AtomicU8::new(STATE_INIT),
            shutdown: Notify::new(),
            bound_addr,
            bound_addr_rx,
            server_task: Mutex::new(None),
        }))
    }

    /// The role this service represents.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Our own domain.
    pub fn sender_domain(&self) -> &str {
        &self.config.sender_domain
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        match self.state.load(Ordering::SeqCst) {
            STATE_RUNNING => ServiceState::Running,
            STATE_STOPPING => ServiceState::Stopping,
            STATE_STOPPED => ServiceState::Stopped,
            _ => ServiceState::Init,
        }
    }

    /// The bound listen address, once the server is up.
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr_rx.borrow()
    }

    /// Bind the listener and serve until [`stop`](Self::stop) is called.
    pub async fn serve(self: Arc<Self>) -> Result<()> {
        let listener = tokio::net::TcpListener::bind((
            self.config.bind_host.as_str(),
            self.config.bind_port,
        ))
        .await?;
        let addr = listener.local_addr()?;
        let _ = self.bound_addr.send(Some(addr));
        self.state.store(STATE_RUNNING, Ordering::SeqCst);
        info!(role = %self.role, %addr, path = %self.config.path, "service listening");

        let app = Router::new()
            .route(&self.config.path, post(receive_message))
            .with_state(Arc::clone(&self));
        let core = Arc::clone(&self);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { core.shutdown.notified().await })
            .await?;

        self.state.store(STATE_STOPPED, Ordering::SeqCst);
        Ok(())
    }

    /// Serve in a background task and wait until the listener is bound.
    pub async fn start(self: Arc<Self>) -> Result<SocketAddr> {
        let core = Arc::clone(&self);
        let handle = tokio::spawn(async move { core.serve().await });
        *self.server_task.lock().await = Some(handle);

        let mut rx = self.bound_addr_rx.clone();
        loop {
            if let Some(addr) = *rx.borrow() {
                return Ok(addr);
            }
            let finished = self
                .server_task
                .lock()
                .await
                .as_ref()
                .map(|task| task.is_finished())
                .unwrap_or(true);
            if finished {
                let outcome = self.server_task.lock().await.take();
                if let Some(task) = outcome {
                    match task.await {
                        Ok(Err(err)) => return Err(err),
                        _ => {
                            return Err(ServiceError::Config(
                                "server task ended before binding".to_string(),
                            ))
                        }
                    }
                }
                return Err(ServiceError::Config(
                    "server task ended before binding".to_string(),
                ));
            }
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(ServiceError::Config(
                            "server task dropped its address channel".to_string(),
                        ));
                    }
                }
                _ = tokio::time::sleep(Duration::from_millis(20)) => {}
            }
        }
    }

    /// Signal shutdown and wait for the server task to finish. In-flight
    /// handlers on the worker pools are allowed to complete.
    pub async fn stop(&self) {
        self.state.store(STATE_STOPPING, Ordering::SeqCst);
        self.shutdown.notify_one();
        if let Some(task) = self.server_task.lock().await.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => error!(error = %err, "server ended with an error"),
                Err(err) => error!(error = %err, "server task aborted"),
            }
        }
        self.state.store(STATE_STOPPED, Ordering::SeqCst);
    }

    /// Client parameters for reaching a peer, using our identity and the
    /// configured resolvers.
    pub fn peer_params(&self, recipient_domain: &str, recipient_role: Role) -> Result<ClientParams> {
        let oauth = match self
            .resolvers
            .oauth_lookup
            .as_ref()
            .and_then(|lookup| lookup.oauth_config(recipient_domain, recipient_role))
        {
            Some(config) => Some(Arc::new(TokenManager::new(config)?)),
            None => None,
        };
        Ok(ClientParams {
            sender_domain: self.config.sender_domain.clone(),
            signing_key: Arc::clone(&self.signing_key),
            recipient_domain: recipient_domain.to_string(),
            recipient_endpoint: None,
            recipient_signing_key: None,
            key_lookup: Arc::clone(&self.resolvers.key_lookup),
            endpoint_lookup: Arc::clone(&self.resolvers.endpoint_lookup),
            oauth,
            config: self.config.client_config(),
        })
    }

    async fn handle_incoming(
        &self,
        headers: &HeaderMap,
        body: &str,
    ) -> std::result::Result<(), TransportError> {
        if headers.get(header::CONTENT_LENGTH).is_none() {
            return Err(TransportError::MissingContentLength);
        }
        check_content_type(headers)?;

        let envelope = codec::envelope_from_xml(body)?;
        let encoded_key = self
            .resolvers
            .key_lookup
            .signing_key(&envelope.sender_domain, envelope.sender_role)
            .await
            .map_err(|e| TransportError::AuthenticationTimeout(e.to_string()))?;
        let sender_key = VerifyingKey::from_base64(&encoded_key)?;
        let message = unseal(&envelope.body, &sender_key)?;

        if message.sender_domain() != Some(envelope.sender_domain.as_str()) {
            warn!(
                envelope_sender = %envelope.sender_domain,
                inner_sender = ?message.sender_domain(),
                "mismatching sender domain in envelope and payload"
            );
            self.reject(&envelope, message, FunctionalError::InvalidSender);
            return Ok(());
        }

        let kind = message.kind();
        if !MessageKind::acceptable_messages(self.role).contains(&kind) {
            warn!(
                kind = kind.name(),
                sender = %envelope.sender_domain,
                "misdirected message"
            );
            let reason = FunctionalError::InvalidMessage(kind.name().to_string());
            self.reject(&envelope, message, reason);
            return Ok(());
        }

        info!(kind = kind.name(), sender = %envelope.sender_domain, "accepted message");
        self.inbound.submit("inbound", message);
        Ok(())
    }

    fn reject(&self, envelope: &SignedMessage, original: UftpMessage, error: FunctionalError) {
        self.outbound.submit(
            "outbound",
            RejectJob {
                recipient_domain: envelope.sender_domain.clone(),
                recipient_role: envelope.sender_role,
                original,
                reason: error.rejection_reason(),
            },
        );
    }
}

async fn receive_message(
    State(core): State<Arc<ServiceCore>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match core.handle_incoming(&headers, &body).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            warn!(error = %err, status = err.http_status(), "rejecting request");
            StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::BAD_REQUEST)
                .into_response()
        }
    }
}

fn check_content_type(headers: &HeaderMap) -> std::result::Result<(), TransportError> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| TransportError::InvalidContentType("missing Content-Type".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| TransportError::InvalidContentType("unreadable Content-Type".to_string()))?;
    let lowered = value.to_ascii_lowercase();
    if !lowered.starts_with("text/xml") && !lowered.starts_with("application/xml") {
        return Err(TransportError::InvalidContentType(value.to_string()));
    }
    if let Some(charset) = lowered.split("charset=").nth(1) {
        let charset = charset.split(';').next().unwrap_or(charset).trim();
        if charset != "utf-8" {
            return Err(TransportError::InvalidContentType(value.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).expect("header value"),
        );
        map
    }

    #[test]
    fn test_content_type_accepted() {
        assert!(check_content_type(&headers("text/xml; charset=utf-8")).is_ok());
        assert!(check_content_type(&headers("text/xml")).is_ok());
        assert!(check_content_type(&headers("application/xml; charset=UTF-8")).is_ok());
    }

    #[test]
    fn test_content_type_rejected() {
        assert!(check_content_type(&headers("application/json")).is_err());
        assert!(check_content_type(&headers("text/xml; charset=latin-1")).is_err());
        assert!(check_content_type(&HeaderMap::new()).is_err());
    }
}
