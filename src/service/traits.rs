//! Service trait definition.

use super::structure::ProvisionedQr;
use crate::errors::RetryableError;
use crate::types::{ProvisionedEsim, ProvisioningRequest};
use std::error::Error as StdError;

/// Trait for eSIM provisioning service implementations.
///
/// This trait abstracts the service interface, allowing different
/// service implementations to be used interchangeably.
#[allow(async_fn_in_trait)]
pub trait ProvisioningServiceTrait: Send + Sync {
    /// The error type for this service.
    type Error: StdError + RetryableError;

    /// Issue an eSIM for a customer.
    ///
    /// Creates a license, waits for it, attaches an eSIM with the requested
    /// product, waits for that, and reads the provisioning string from the
    /// simcard detail.
    async fn provision_esim(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedEsim, Self::Error>;

    /// Like [`provision_esim`](Self::provision_esim), additionally rendering
    /// the provisioning string as a QR image.
    async fn provision_and_encode(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedQr, Self::Error>;
}
