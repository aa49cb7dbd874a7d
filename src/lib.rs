//! # eSIM Gateway
//!
//! Provision eSIMs through an enterprise provider and hand back a scannable
//! QR code.
//!
//! The provider works asynchronously: creating a license or attaching an eSIM
//! starts an activation transaction that must be polled until it settles.
//! This crate caches the operator token, polls transactions with a bounded,
//! cancellable loop, reads the iccid and LPA string out of loosely-shaped
//! payloads and renders the result as a PNG QR code.
//!
//! ## Supported Providers
//!
//! | Provider | Feature | Website |
//! |----------|---------|---------|
//! | BNESIM | `bnesim` (default) | <https://www.bnesim.com> |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
//! use esim_gateway::{
//!     EsimRetryableProvider, ProvisioningRequest, ProvisioningService, ProvisioningServiceTrait,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // BNESIM_BASE_URL, BNESIM_API_KEY, BNESIM_API_SECRET
//!     let provider = BnesimProvider::new(BnesimClient::from_env()?);
//!
//!     // Retry transient failures of status and detail reads
//!     let service = ProvisioningService::with_provider(EsimRetryableProvider::new(provider));
//!
//!     let request = ProvisioningRequest::new("Ada Lovelace", "ada@example.com", "P1");
//!     let result = service.provision_and_encode(&request).await?;
//!
//!     println!("iccid: {}", result.esim.iccid);
//!     println!("lpa:   {}", result.esim.provisioning_string);
//!     println!("qr:    {}", result.qr.to_data_url());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ProvisioningService<P>      (license -> eSIM -> detail -> QR)
//!         │
//!         ▼
//! EsimRetryableProvider<P>    (optional retry wrapper)
//!         │
//!         ▼
//!     Provider                (trait: BnesimProvider, ...)
//!         │
//!         ▼
//!   BnesimClient ── CredentialCache (shared operator token)
//! ```
//!
//! ## Features
//!
//! - `bnesim` - BNESIM provider support (enabled by default)
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)
//! - `qr` - PNG rendering of provisioning strings (enabled by default)
//! - `server` - the `esim-gateway` HTTP binary

pub mod errors;
pub mod lookup;
pub mod providers;
pub mod qr;
pub mod service;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types at the crate root
pub use errors::{ErrorKind, ProviderFailure, RetryableError};
pub use lookup::{FieldChain, FieldPath, Lookup};
pub use providers::{EsimRetryableProvider, OnRetryCallback, Provider};
pub use qr::{EncodedQr, QrEncoder, QrError};
pub use service::{
    ErrorReport, ProvisionedQr, ProvisioningError, ProvisioningService,
    ProvisioningServiceBuilder, ProvisioningServiceConfig, ProvisioningServiceConfigBuilder,
    ProvisioningServiceTrait, ProvisioningStage,
};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    ActivationStatus, ActivationTransaction, EsimRequest, Iccid, InvalidRequest, LicenseCli,
    LicenseRequest, ProductId, ProvisionedEsim, ProvisioningRequest, ProvisioningString,
    SimcardDiagnostics, StatusPayload,
};
pub use utils::poll::{PollError, PollPolicy, PollStep, Polled, poll_until};
pub use utils::retry::RetryConfig;

#[cfg(feature = "qr")]
pub use qr::PngQrEncoder;

// Re-export provider modules for convenience
#[cfg(feature = "bnesim")]
pub use providers::bnesim;
