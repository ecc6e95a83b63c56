//! HTTP server implementation
//!
//! Wires configuration, adapters, and services together once at startup
//! and serves the composed routes. The server expects a reverse proxy in
//! front of it to own TLS and CORS.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use std::convert::Infallible;

use warp::{Filter, Reply};

use crate::application::services::{IntentService, OrderService, StatusService, WebhookService};
use crate::config::AppConfig;
use crate::infrastructure::adapters::{
    BakongClient, HmacSignatureVerifier, InMemoryOrderStore, IntentStore, KhqrEncoder, OrderStore,
    PaymentNetwork, QrEncoder, SignatureVerifier,
};
use crate::infrastructure::http::routes::RouteBuilder;
use crate::middleware::RateLimitMiddleware;
use crate::shared::error::AppResult;
use crate::shared::metrics::PaymentMetrics;

pub struct PaymentServer {
    config: AppConfig,
    intent_service: Arc<IntentService>,
    status_service: Arc<StatusService>,
    order_service: Arc<OrderService>,
    webhook_service: Arc<WebhookService>,
    intent_store: IntentStore,
    metrics: Arc<PaymentMetrics>,
    rate_limiter: Arc<RateLimitMiddleware>,
}

impl PaymentServer {
    /// Create the server against the real Bakong open API
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let network: Arc<dyn PaymentNetwork> =
            Arc::new(BakongClient::new(Arc::new(config.clone()))?);
        Self::with_network(config, network).await
    }

    /// Create the server with an injected payment network. This is the
    /// seam integration tests use to run the full HTTP stack without
    /// touching the real upstream.
    pub async fn with_network(
        config: AppConfig,
        network: Arc<dyn PaymentNetwork>,
    ) -> AppResult<Self> {
        let config_arc = Arc::new(config.clone());
        let metrics = Arc::new(PaymentMetrics::new()?);

        let encoder: Arc<dyn QrEncoder> = Arc::new(KhqrEncoder::new());
        let intent_store = IntentStore::connect(&config).await;
        let orders: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let verifier: Arc<dyn SignatureVerifier> = Arc::new(HmacSignatureVerifier::new(
            config.webhook.shared_secret.clone(),
        ));

        let intent_service = Arc::new(IntentService::new(
            config_arc.clone(),
            encoder,
            metrics.clone(),
        ));
        let status_service = Arc::new(StatusService::new(
            config_arc.clone(),
            network,
            metrics.clone(),
        ));
        let order_service = Arc::new(OrderService::new(
            orders.clone(),
            status_service.clone(),
            metrics.clone(),
        ));
        let webhook_service = Arc::new(WebhookService::new(verifier, orders, metrics.clone()));
        let rate_limiter = Arc::new(RateLimitMiddleware::new(&config));

        Ok(Self {
            config,
            intent_service,
            status_service,
            order_service,
            webhook_service,
            intent_store,
            metrics,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Create the application routes
    pub fn create_routes(self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        RouteBuilder::build_routes(
            self.config,
            self.intent_service,
            self.status_service,
            self.order_service,
            self.webhook_service,
            self.intent_store,
            self.metrics,
            self.rate_limiter,
        )
    }

    /// Run the HTTP server until the process is stopped
    pub async fn run(self) -> AppResult<()> {
        let addr = SocketAddr::new(self.config.server.bind_address, self.config.server.port);
        info!("Starting KHQR payment server on {}", addr);
        if !self.config.upstream_configured() {
            info!("No upstream API token configured, settlement checks will degrade");
        }

        let routes = self.create_routes();
        warp::serve(routes).run(addr).await;

        Ok(())
    }
}
