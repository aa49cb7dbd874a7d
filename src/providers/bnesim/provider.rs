//! BNESIM provider implementation.

use super::client::BnesimClient;
use super::errors::{BnesimError, Result};
use crate::providers::traits::Provider;
use crate::types::{ActivationTransaction, EsimRequest, Iccid, LicenseRequest, StatusPayload};
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::debug;

/// BNESIM provider implementation.
///
/// This wraps the [`BnesimClient`] and implements the generic [`Provider`] trait.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
/// use esim_gateway::{EsimRetryableProvider, ProvisioningService};
///
/// let client = BnesimClient::from_env()?;
/// let provider = EsimRetryableProvider::new(BnesimProvider::new(client));
/// let service = ProvisioningService::with_provider(provider);
/// ```
#[derive(Debug, Clone)]
pub struct BnesimProvider {
    client: BnesimClient,
}

impl BnesimProvider {
    /// Create a new BNESIM provider.
    pub fn new(client: BnesimClient) -> Self {
        Self { client }
    }

    /// Create a provider from the `BNESIM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BnesimClient::from_env()?))
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &BnesimClient {
        &self.client
    }
}

impl Provider for BnesimProvider {
    type Error = BnesimError;

    async fn authenticate(&self) -> Result<()> {
        self.client.token().await?;

        #[cfg(feature = "tracing")]
        debug!("Operator token available");

        Ok(())
    }

    async fn create_license(&self, request: &LicenseRequest) -> Result<ActivationTransaction> {
        self.client.create_license(request).await
    }

    async fn add_esim(&self, request: &EsimRequest) -> Result<ActivationTransaction> {
        self.client.add_esim(request).await
    }

    async fn get_activation_status(
        &self,
        transaction: &ActivationTransaction,
    ) -> Result<StatusPayload> {
        self.client.get_activation_status(transaction).await
    }

    async fn get_simcard_detail(&self, iccid: &Iccid, with_products: bool) -> Result<Value> {
        self.client.get_simcard_detail(iccid, with_products).await
    }

    async fn get_products(&self, area: Option<&str>) -> Result<Value> {
        self.client.get_products(area).await
    }
}
