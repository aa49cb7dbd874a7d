//! eSIM provider implementations.

pub(crate) mod retryable;
pub(crate) mod traits;

#[cfg(feature = "bnesim")]
pub mod bnesim;

pub use retryable::{EsimRetryableProvider, OnRetryCallback};
pub use traits::Provider;
