//! Provider trait definition.

use crate::errors::ProviderFailure;
use crate::types::{ActivationTransaction, EsimRequest, Iccid, LicenseRequest, StatusPayload};
use serde_json::Value;
use std::error::Error as StdError;
use std::future::Future;

/// Core trait that every eSIM issuance backend must implement.
///
/// This trait covers the operations the provisioning workflow needs:
/// - Starting a license activation
/// - Attaching an eSIM to a license
/// - Reading the status of an asynchronous activation transaction
/// - Fetching the simcard detail that carries the provisioning payload
///
/// Implementations return provider payloads unchanged: resolving which field
/// carries the iccid or the LPA string is the provisioning service's job.
///
/// # Note on async methods
///
/// All async methods in this trait return `Send` futures, making them
/// compatible with multi-threaded executors.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::{ActivationTransaction, EsimRequest, Iccid, LicenseRequest, Provider, StatusPayload};
///
/// #[derive(Clone)]
/// struct MyProvider { /* ... */ }
///
/// impl Provider for MyProvider {
///     type Error = MyError;
///
///     async fn create_license(&self, request: &LicenseRequest) -> Result<ActivationTransaction, Self::Error> {
///         // Start the license activation job
///     }
///
///     async fn get_activation_status(&self, tx: &ActivationTransaction) -> Result<StatusPayload, Self::Error> {
///         // Read the job status
///     }
///     // ...
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait Provider: Send + Sync + Clone {
    /// Error type returned by provider operations.
    type Error: StdError + ProviderFailure + Send + Sync + 'static;

    /// Make sure a usable credential is available, logging in if needed.
    fn authenticate(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start a license activation and return its transaction.
    fn create_license(
        &self,
        request: &LicenseRequest,
    ) -> impl Future<Output = Result<ActivationTransaction, Self::Error>> + Send;

    /// Attach an eSIM to a license and return the assignment transaction.
    fn add_esim(
        &self,
        request: &EsimRequest,
    ) -> impl Future<Output = Result<ActivationTransaction, Self::Error>> + Send;

    /// Read the current status of an activation transaction.
    ///
    /// A pending job is not an error: the payload simply carries a
    /// non-terminal `activation_status`.
    fn get_activation_status(
        &self,
        transaction: &ActivationTransaction,
    ) -> impl Future<Output = Result<StatusPayload, Self::Error>> + Send;

    /// Fetch the simcard detail (provisioning payload) of an issued eSIM.
    fn get_simcard_detail(
        &self,
        iccid: &Iccid,
        with_products: bool,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// List the products available in an area (all areas when `None`).
    fn get_products(
        &self,
        area: Option<&str>,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;
}
