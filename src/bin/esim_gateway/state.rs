//! Shared handler state.

use crate::config::ServerConfig;
use esim_gateway::bnesim::{BnesimClient, BnesimError, BnesimProvider};
use esim_gateway::{
    CancellationToken, EsimRetryableProvider, ProductId, ProvisioningService,
    ProvisioningServiceConfig,
};
use std::sync::Arc;
use url::Url;

pub type GatewayProvider = EsimRetryableProvider<BnesimProvider>;
pub type GatewayService = ProvisioningService<GatewayProvider>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GatewayService>,
    pub default_product_id: Option<ProductId>,
    /// Cancelled on shutdown; every provisioning run uses a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: GatewayService, default_product_id: Option<ProductId>) -> Self {
        Self {
            service: Arc::new(service),
            default_product_id,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, BnesimError> {
        let endpoint = Url::parse(config.bnesim_base_url.trim()).map_err(|e| BnesimError::Config {
            message: format!("invalid BNESIM_BASE_URL: {e}"),
        })?;

        let client = BnesimClient::builder(&config.bnesim_api_key, &config.bnesim_api_secret)
            .endpoint(endpoint)
            .timeout(config.request_timeout())
            .build()?;

        let service = ProvisioningService::new(
            EsimRetryableProvider::new(BnesimProvider::new(client)),
            ProvisioningServiceConfig::default().with_poll_policy(config.poll_policy()),
        );

        let default_product_id = config
            .default_product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ProductId::from);

        Ok(Self::new(service, default_product_id))
    }
}
