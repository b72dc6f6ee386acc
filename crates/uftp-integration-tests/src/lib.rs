//! Shared fixtures for the end-to-end tests: a three-participant network
//! (`agr.dev`, `cro.dev`, `dso.dev`) on loopback ports, a shared
//! participant directory standing in for DNS, capturing handlers that
//! forward every processed message to an inbox, and one sample instance
//! of every message kind.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use uftp_discovery::{DiscoveryError, EndpointLookup, KeyLookup, StaticDirectory};
use uftp_messages::messages::*;
use uftp_messages::{
    AcceptedDisputed, AvailableRequested, IspDuration, MessageFill, MessageKind, Payload,
    RedispatchBy, Role, UftpMessage,
};
use uftp_service::{
    AgrHandler, AgrService, CroHandler, CroService, DsoHandler, DsoService, Resolvers,
    ServiceConfig,
};
use uftp_transport::keys::KeyPair;

pub const AGR_DOMAIN: &str = "agr.dev";
pub const CRO_DOMAIN: &str = "cro.dev";
pub const DSO_DOMAIN: &str = "dso.dev";

/// Wire up ambient logging for a test run. Safe to call repeatedly.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A participant directory that can be populated after the services have
/// bound their ephemeral ports.
#[derive(Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<StaticDirectory>>,
}

impl SharedDirectory {
    pub fn register(&self, domain: &str, role: Role, signing_key: &str, endpoint: &str) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let updated = guard
            .clone()
            .register(domain, role, signing_key, endpoint);
        *guard = updated;
    }

    fn snapshot(&self) -> StaticDirectory {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl KeyLookup for SharedDirectory {
    async fn signing_key(
        &self,
        domain: &str,
        role: Role,
    ) -> Result<String, DiscoveryError> {
        self.snapshot().signing_key(domain, role).await
    }
}

#[async_trait]
impl EndpointLookup for SharedDirectory {
    async fn endpoint(&self, domain: &str, role: Role) -> Result<String, DiscoveryError> {
        self.snapshot().endpoint(domain, role).await
    }
}

/// Receives every message a capturing handler processed.
pub struct Inbox {
    rx: Mutex<mpsc::UnboundedReceiver<UftpMessage>>,
}

impl Inbox {
    /// Wait for the next processed message.
    pub async fn expect(&self, within: Duration) -> anyhow::Result<UftpMessage> {
        let mut rx = self.rx.lock().await;
        let message = tokio::time::timeout(within, rx.recv())
            .await
            .map_err(|_| anyhow::anyhow!("no message processed within {within:?}"))?;
        message.ok_or_else(|| anyhow::anyhow!("inbox closed"))
    }

    /// Assert that nothing is processed for the given duration.
    pub async fn expect_nothing(&self, within: Duration) -> anyhow::Result<()> {
        let mut rx = self.rx.lock().await;
        match tokio::time::timeout(within, rx.recv()).await {
            Err(_) => Ok(()),
            Ok(Some(message)) => anyhow::bail!(
                "unexpected message processed: {}",
                message.kind().name()
            ),
            Ok(None) => anyhow::bail!("inbox closed"),
        }
    }
}

/// A handler for any role that forwards every processed message into an
/// [`Inbox`].
pub struct CapturingHandler {
    tx: mpsc::UnboundedSender<UftpMessage>,
}

impl CapturingHandler {
    pub fn new() -> (Arc<Self>, Inbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), Inbox { rx: Mutex::new(rx) })
    }

    fn capture(&self, message: UftpMessage) -> anyhow::Result<()> {
        self.tx
            .send(message)
            .map_err(|_| anyhow::anyhow!("inbox dropped"))
    }
}

#[async_trait]
impl AgrHandler for CapturingHandler {
    async fn process_agr_portfolio_query_response(
        &self,
        message: AgrPortfolioQueryResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::AgrPortfolioQueryResponse(message))
    }

    async fn process_agr_portfolio_update_response(
        &self,
        message: AgrPortfolioUpdateResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::AgrPortfolioUpdateResponse(message))
    }

    async fn process_d_prognosis_response(
        &self,
        message: DPrognosisResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::DPrognosisResponse(message))
    }

    async fn process_flex_offer_response(
        &self,
        message: FlexOfferResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOfferResponse(message))
    }

    async fn process_flex_offer_revocation_response(
        &self,
        message: FlexOfferRevocationResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOfferRevocationResponse(message))
    }

    async fn process_flex_order(&self, message: FlexOrder) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOrder(message))
    }

    async fn process_flex_request(&self, message: FlexRequest) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexRequest(message))
    }

    async fn process_flex_reservation_update(
        &self,
        message: FlexReservationUpdate,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexReservationUpdate(message))
    }

    async fn process_flex_settlement(&self, message: FlexSettlement) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexSettlement(message))
    }

    async fn process_metering_response(&self, message: MeteringResponse) -> anyhow::Result<()> {
        self.capture(UftpMessage::MeteringResponse(message))
    }
}

#[async_trait]
impl CroHandler for CapturingHandler {
    async fn process_agr_portfolio_query(
        &self,
        message: AgrPortfolioQuery,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::AgrPortfolioQuery(message))
    }

    async fn process_agr_portfolio_update(
        &self,
        message: AgrPortfolioUpdate,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::AgrPortfolioUpdate(message))
    }

    async fn process_dso_portfolio_query(
        &self,
        message: DsoPortfolioQuery,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::DsoPortfolioQuery(message))
    }

    async fn process_dso_portfolio_update(
        &self,
        message: DsoPortfolioUpdate,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::DsoPortfolioUpdate(message))
    }
}

#[async_trait]
impl DsoHandler for CapturingHandler {
    async fn process_d_prognosis(&self, message: DPrognosis) -> anyhow::Result<()> {
        self.capture(UftpMessage::DPrognosis(message))
    }

    async fn process_dso_portfolio_query_response(
        &self,
        message: DsoPortfolioQueryResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::DsoPortfolioQueryResponse(message))
    }

    async fn process_dso_portfolio_update_response(
        &self,
        message: DsoPortfolioUpdateResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::DsoPortfolioUpdateResponse(message))
    }

    async fn process_flex_offer(&self, message: FlexOffer) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOffer(message))
    }

    async fn process_flex_offer_revocation(
        &self,
        message: FlexOfferRevocation,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOfferRevocation(message))
    }

    async fn process_flex_order_response(
        &self,
        message: FlexOrderResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexOrderResponse(message))
    }

    async fn process_flex_request_response(
        &self,
        message: FlexRequestResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexRequestResponse(message))
    }

    async fn process_flex_reservation_update_response(
        &self,
        message: FlexReservationUpdateResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexReservationUpdateResponse(message))
    }

    async fn process_flex_settlement_response(
        &self,
        message: FlexSettlementResponse,
    ) -> anyhow::Result<()> {
        self.capture(UftpMessage::FlexSettlementResponse(message))
    }

    async fn process_metering(&self, message: Metering) -> anyhow::Result<()> {
        self.capture(UftpMessage::Metering(message))
    }
}

/// The three services of a test market, bound to ephemeral loopback
/// ports and wired up through a [`SharedDirectory`].
pub struct TestNetwork {
    pub agr: AgrService,
    pub cro: CroService,
    pub dso: DsoService,
    pub agr_inbox: Inbox,
    pub cro_inbox: Inbox,
    pub dso_inbox: Inbox,
    pub agr_keys: KeyPair,
    pub cro_keys: KeyPair,
    pub dso_keys: KeyPair,
    pub directory: SharedDirectory,
}

impl TestNetwork {
    pub async fn start() -> anyhow::Result<Self> {
        let directory = SharedDirectory::default();
        let resolvers = Resolvers {
            key_lookup: Arc::new(directory.clone()),
            endpoint_lookup: Arc::new(directory.clone()),
            oauth_lookup: None,
        };

        let agr_keys = KeyPair::generate();
        let cro_keys = KeyPair::generate();
        let dso_keys = KeyPair::generate();

        let (agr_handler, agr_inbox) = CapturingHandler::new();
        let (cro_handler, cro_inbox) = CapturingHandler::new();
        let (dso_handler, dso_inbox) = CapturingHandler::new();

        let agr = AgrService::new(
            loopback_config(AGR_DOMAIN, &agr_keys),
            resolvers.clone(),
            agr_handler,
        )?;
        let cro = CroService::new(
            loopback_config(CRO_DOMAIN, &cro_keys),
            resolvers.clone(),
            cro_handler,
        )?;
        let dso = DsoService::new(
            loopback_config(DSO_DOMAIN, &dso_keys),
            resolvers,
            dso_handler,
        )?;

        let agr_addr = agr.start().await?;
        let cro_addr = cro.start().await?;
        let dso_addr = dso.start().await?;

        directory.register(
            AGR_DOMAIN,
            Role::Agr,
            &agr_keys.verifying_key.to_base64(),
            &format!("http://{agr_addr}/shapeshifter/api/v3/message"),
        );
        directory.register(
            CRO_DOMAIN,
            Role::Cro,
            &cro_keys.verifying_key.to_base64(),
            &format!("http://{cro_addr}/shapeshifter/api/v3/message"),
        );
        directory.register(
            DSO_DOMAIN,
            Role::Dso,
            &dso_keys.verifying_key.to_base64(),
            &format!("http://{dso_addr}/shapeshifter/api/v3/message"),
        );

        Ok(Self {
            agr,
            cro,
            dso,
            agr_inbox,
            cro_inbox,
            dso_inbox,
            agr_keys,
            cro_keys,
            dso_keys,
            directory,
        })
    }

    /// The registered endpoint of one participant.
    pub async fn endpoint_of(&self, domain: &str, role: Role) -> anyhow::Result<String> {
        Ok(self.directory.endpoint(domain, role).await?)
    }

    pub async fn shutdown(&self) {
        self.agr.stop().await;
        self.cro.stop().await;
        self.dso.stop().await;
    }
}

/// A service configuration bound to an ephemeral loopback port.
pub fn loopback_config(domain: &str, keys: &KeyPair) -> ServiceConfig {
    let mut config = ServiceConfig::new(domain, &keys.signing_key.to_base64());
    config.bind_host = "127.0.0.1".to_string();
    config.bind_port = 0;
    config
}

/// A portfolio update with one connection, the message of the happy-path
/// scenario.
pub fn sample_portfolio_update() -> AgrPortfolioUpdate {
    AgrPortfolioUpdate {
        version: "3.0.0".to_string(),
        sender_domain: None,
        recipient_domain: None,
        time_stamp: None,
        message_id: None,
        conversation_id: None,
        time_zone: "Europe/Amsterdam".to_string(),
        connections: vec![AgrPortfolioUpdateConnection {
            entity_address: "ean.123456789012".to_string(),
            start_period: date(2023, 1, 1),
            end_period: None,
        }],
    }
}

fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn filled<P: Payload>(mut message: P, sender: &str, recipient: &str) -> P {
    message.fill(&MessageFill::now(sender, recipient));
    message
}

/// One schema-valid instance of every message kind, with the common
/// metadata filled according to the routing matrix. Drives the
/// round-trip and routing-coverage properties.
pub fn sample_messages() -> Vec<UftpMessage> {
    let reference = uuid::Uuid::new_v4();
    let expiration: chrono::DateTime<chrono::FixedOffset> = "2033-06-01T10:00:00+02:00"
        .parse()
        .expect("valid timestamp");

    let fill_by_route = |message: &mut dyn Payload, kind: MessageKind| {
        let route = kind.routing();
        let (sender, recipient) = match (route.sender, route.recipient) {
            (Role::Agr, Role::Cro) => (AGR_DOMAIN, CRO_DOMAIN),
            (Role::Cro, Role::Agr) => (CRO_DOMAIN, AGR_DOMAIN),
            (Role::Agr, Role::Dso) => (AGR_DOMAIN, DSO_DOMAIN),
            (Role::Dso, Role::Agr) => (DSO_DOMAIN, AGR_DOMAIN),
            (Role::Dso, Role::Cro) => (DSO_DOMAIN, CRO_DOMAIN),
            (Role::Cro, Role::Dso) => (CRO_DOMAIN, DSO_DOMAIN),
            (a, b) => (a.dns_label(), b.dns_label()),
        };
        message.fill(&MessageFill::now(sender, recipient));
    };

    let mut messages = vec![
        UftpMessage::AgrPortfolioQuery(AgrPortfolioQuery {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 1, 1),
        }),
        UftpMessage::AgrPortfolioQueryResponse(AgrPortfolioQueryResponse {
            agr_portfolio_query_message_id: reference,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 1, 1),
            dso_views: vec![AgrPortfolioQueryResponseDsoView {
                dso_portfolios: vec![AgrPortfolioQueryResponseDsoPortfolio {
                    dso_domain: DSO_DOMAIN.to_string(),
                    congestion_points: vec![AgrPortfolioQueryResponseCongestionPoint {
                        entity_address: "ean.871685900012636543".to_string(),
                        mutex_offers_supported: true,
                        day_ahead_redispatch_by: RedispatchBy::Agr,
                        intraday_redispatch_by: Some(RedispatchBy::Dso),
                        connections: vec![AgrPortfolioQueryResponseConnection {
                            entity_address: "ean.123456789012".to_string(),
                        }],
                    }],
                }],
                connections: Vec::new(),
            }],
            ..Default::default()
        }),
        UftpMessage::AgrPortfolioUpdate(sample_portfolio_update()),
        UftpMessage::AgrPortfolioUpdateResponse(AgrPortfolioUpdateResponse {
            agr_portfolio_update_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::DsoPortfolioQuery(DsoPortfolioQuery {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 1, 1),
            entity_address: "ean.871685900012636543".to_string(),
        }),
        UftpMessage::DsoPortfolioQueryResponse(DsoPortfolioQueryResponse {
            dso_portfolio_query_message_id: reference,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 1, 1),
            congestion_point: Some(DsoPortfolioQueryCongestionPoint {
                entity_address: "ean.871685900012636543".to_string(),
                connections: vec![DsoPortfolioQueryConnection {
                    entity_address: "ean.123456789012".to_string(),
                    agr_domain: Some(AGR_DOMAIN.to_string()),
                }],
            }),
            ..Default::default()
        }),
        UftpMessage::DsoPortfolioUpdate(DsoPortfolioUpdate {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            time_zone: "Europe/Amsterdam".to_string(),
            congestion_points: vec![DsoPortfolioUpdateCongestionPoint {
                entity_address: "ean.871685900012636543".to_string(),
                start_period: date(2023, 1, 1),
                end_period: None,
                mutex_offers_supported: false,
                day_ahead_redispatch_by: RedispatchBy::Dso,
                intraday_redispatch_by: None,
                connections: vec![DsoPortfolioUpdateConnection {
                    entity_address: "ean.123456789012".to_string(),
                    start_period: date(2023, 1, 1),
                    end_period: None,
                }],
            }],
        }),
        UftpMessage::DsoPortfolioUpdateResponse(DsoPortfolioUpdateResponse {
            dso_portfolio_update_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::DPrognosis(DPrognosis {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 6, 1),
            congestion_point: "ean.871685900012636543".to_string(),
            revision: 1,
            isps: vec![
                DPrognosisIsp {
                    power: 210_000,
                    start: 1,
                    duration: 1,
                },
                DPrognosisIsp {
                    power: 250_000,
                    start: 2,
                    duration: 95,
                },
            ],
        }),
        UftpMessage::DPrognosisResponse(DPrognosisResponse {
            d_prognosis_message_id: reference,
            flex_order_statuses: vec![FlexOrderStatus {
                flex_order_message_id: reference,
                is_validated: true,
            }],
            ..Default::default()
        }),
        UftpMessage::FlexRequest(FlexRequest {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 6, 1),
            congestion_point: "ean.871685900012636543".to_string(),
            revision: 1,
            expiration_date_time: expiration,
            contract_id: None,
            service_type: None,
            isps: vec![
                FlexRequestIsp {
                    disposition: Some(AvailableRequested::Requested),
                    min_power: -500_000,
                    max_power: 0,
                    start: 33,
                    duration: 8,
                },
                FlexRequestIsp {
                    disposition: Some(AvailableRequested::Available),
                    min_power: -1_000_000,
                    max_power: 1_000_000,
                    start: 41,
                    duration: 56,
                },
            ],
        }),
        UftpMessage::FlexRequestResponse(FlexRequestResponse {
            flex_request_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::FlexOffer(FlexOffer {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 6, 1),
            congestion_point: "ean.871685900012636543".to_string(),
            expiration_date_time: expiration,
            flex_request_message_id: Some(reference),
            contract_id: None,
            d_prognosis_message_id: None,
            baseline_reference: None,
            currency: "EUR".to_string(),
            offer_options: vec![FlexOfferOption {
                option_reference: "option-1".to_string(),
                price: "99.5000".parse().expect("valid decimal"),
                min_activation_factor: "0.50".parse().expect("valid decimal"),
                isps: vec![FlexOfferOptionIsp {
                    power: -250_000,
                    start: 33,
                    duration: 8,
                }],
            }],
        }),
        UftpMessage::FlexOfferResponse(FlexOfferResponse {
            flex_offer_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::FlexOfferRevocation(FlexOfferRevocation {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            flex_offer_message_id: reference,
        }),
        UftpMessage::FlexOfferRevocationResponse(FlexOfferRevocationResponse {
            flex_offer_revocation_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::FlexOrder(FlexOrder {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 6, 1),
            congestion_point: "ean.871685900012636543".to_string(),
            flex_offer_message_id: reference,
            contract_id: None,
            d_prognosis_message_id: None,
            baseline_reference: None,
            price: "99.5000".parse().expect("valid decimal"),
            currency: "EUR".to_string(),
            order_reference: "order-1".to_string(),
            option_reference: Some("option-1".to_string()),
            activation_factor: "1.00".parse().expect("valid decimal"),
            isps: vec![FlexOrderIsp {
                power: -250_000,
                start: 33,
                duration: 8,
            }],
        }),
        UftpMessage::FlexOrderResponse(FlexOrderResponse {
            flex_order_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::FlexReservationUpdate(FlexReservationUpdate {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            period: date(2023, 6, 1),
            congestion_point: "ean.871685900012636543".to_string(),
            contract_id: "contract-1".to_string(),
            reference: "reservation-1".to_string(),
            isps: vec![FlexReservationUpdateIsp {
                power: 100_000,
                start: 1,
                duration: 96,
            }],
        }),
        UftpMessage::FlexReservationUpdateResponse(FlexReservationUpdateResponse {
            flex_reservation_update_message_id: reference,
            ..Default::default()
        }),
        UftpMessage::FlexSettlement(FlexSettlement {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            period_start: date(2023, 5, 1),
            period_end: date(2023, 5, 31),
            currency: "EUR".to_string(),
            flex_order_settlements: vec![FlexOrderSettlement {
                order_reference: Some("order-1".to_string()),
                period: date(2023, 5, 12),
                contract_id: None,
                d_prognosis_message_id: Some(reference),
                baseline_reference: None,
                congestion_point: "ean.871685900012636543".to_string(),
                price: "99.5000".parse().expect("valid decimal"),
                penalty: "1.2500".parse().expect("valid decimal"),
                net_settlement: "98.2500".parse().expect("valid decimal"),
                isps: vec![FlexOrderSettlementIsp {
                    start: 33,
                    duration: 8,
                    baseline_power: 1_000_000,
                    ordered_flex_power: -250_000,
                    actual_power: 760_000,
                    delivered_flex_power: -240_000,
                    power_deficiency: 10_000,
                }],
            }],
            contract_settlements: vec![ContractSettlement {
                contract_id: Some("contract-1".to_string()),
                periods: vec![ContractSettlementPeriod {
                    period: date(2023, 5, 12),
                    isps: vec![ContractSettlementIsp {
                        start: 33,
                        duration: 8,
                        reserved_power: 250_000,
                        requested_power: Some(250_000),
                        available_power: Some(500_000),
                        offered_power: Some(250_000),
                        ordered_power: Some(250_000),
                    }],
                }],
            }],
        }),
        UftpMessage::FlexSettlementResponse(FlexSettlementResponse {
            flex_settlement_message_id: reference,
            flex_order_settlement_statuses: vec![FlexOrderSettlementStatus {
                order_reference: Some("order-1".to_string()),
                disposition: AcceptedDisputed::Accepted,
                dispute_reason: None,
            }],
            ..Default::default()
        }),
        UftpMessage::Metering(Metering {
            version: "3.0.0".to_string(),
            sender_domain: None,
            recipient_domain: None,
            time_stamp: None,
            message_id: None,
            conversation_id: None,
            revision: 1,
            isp_duration: IspDuration::FIFTEEN_MINUTES,
            time_zone: "Europe/Amsterdam".to_string(),
            currency: None,
            period: date(2023, 6, 1),
            ean: "E1234567890123456".to_string(),
            profiles: vec![MeteringProfile {
                profile_type: MeteringProfileKind::Power,
                unit: MeteringUnit::KW,
                isps: vec![
                    MeteringIsp {
                        start: 1,
                        value: "42.5".parse().expect("valid decimal"),
                    },
                    MeteringIsp {
                        start: 2,
                        value: "43.1".parse().expect("valid decimal"),
                    },
                ],
            }],
        }),
        UftpMessage::MeteringResponse(MeteringResponse {
            metering_message_id: reference,
            ..Default::default()
        }),
    ];

    for message in &mut messages {
        let kind = message.kind();
        fill_by_route(message, kind);
    }
    messages
}

/// Convenience wrapper used by tests that need a single filled message.
pub fn filled_portfolio_update() -> AgrPortfolioUpdate {
    filled(sample_portfolio_update(), AGR_DOMAIN, CRO_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_messages_cover_every_kind() {
        let kinds: Vec<MessageKind> = sample_messages().iter().map(|m| m.kind()).collect();
        for kind in MessageKind::ALL {
            assert!(kinds.contains(&kind), "no sample for {kind:?}");
        }
        assert_eq!(kinds.len(), MessageKind::ALL.len());
    }

    #[test]
    fn test_sample_messages_are_valid() {
        for message in sample_messages() {
            let kind = message.kind();
            let result = message.validate();
            assert!(
                result.is_ok(),
                "sample for {kind:?} is invalid: {:?}",
                result.err()
            );
        }
    }
}
