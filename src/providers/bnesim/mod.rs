//! BNESIM enterprise provider.
//!
//! This module provides integration with the BNESIM enterprise API: operator
//! login with a cached JWT, license activation, eSIM assignment, activation
//! status and simcard detail.
//!
//! # Example
//!
//! ```rust,ignore
//! use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
//! use esim_gateway::{ProvisioningRequest, ProvisioningService, ProvisioningServiceTrait};
//!
//! let provider = BnesimProvider::new(BnesimClient::from_env()?);
//! let service = ProvisioningService::with_provider(provider);
//!
//! let esim = service
//!     .provision_esim(&ProvisioningRequest::new("Ada", "ada@example.com", "P1"))
//!     .await?;
//! println!("iccid {} -> {}", esim.iccid, esim.provisioning_string);
//! ```

pub mod client;
pub mod credentials;
pub mod errors;
pub mod provider;
mod response;

// Re-export commonly used types
pub use client::{BnesimClient, BnesimClientBuilder};
pub use credentials::{Credential, CredentialCache};
pub use errors::{BnesimError, Operation};
pub use provider::BnesimProvider;
