//! Service-level error types.

use crate::errors::{ErrorKind, ProviderFailure, RetryableError};
use crate::qr::QrError;
use crate::types::ActivationTransaction;
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Service-level errors that wrap provider errors.
///
/// Payload-carrying variants keep the provider response unchanged so callers
/// can see exactly what came back.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Error from the underlying provider.
    #[error("eSIM provider error: {source}")]
    Provider {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
        /// Classification captured from the provider error.
        kind: ErrorKind,
        /// HTTP status, if the provider answered with one.
        http_status: Option<u16>,
        /// Provider response body, if any.
        raw: Option<Value>,
        /// Whether the same call can be retried.
        is_retryable: bool,
        /// Whether a fresh run might succeed.
        should_retry_operation: bool,
    },

    /// The activation transaction reached `FAILED`.
    #[error("Activation {transaction} failed")]
    ActivationFailed {
        transaction: ActivationTransaction,
        /// Terminal status payload.
        payload: Value,
    },

    /// Polling ran out of attempts.
    #[error(
        "Activation {transaction} still pending after {attempts} checks ({:.1}s)",
        elapsed.as_secs_f64()
    )]
    PollTimeout {
        transaction: ActivationTransaction,
        /// Number of status checks made.
        attempts: u32,
        /// Time spent polling.
        elapsed: Duration,
    },

    /// Cancellation was requested.
    #[error("Provisioning cancelled")]
    Cancelled {
        /// Transaction being polled when the run was cancelled, if any.
        transaction: Option<ActivationTransaction>,
    },

    /// A required field is absent from a successful payload.
    #[error("Provider payload is missing `{field}`")]
    MissingField { field: String, payload: Value },

    /// A field is present but empty or not a scalar.
    #[error("Provider payload has an unusable `{field}`")]
    InvalidField { field: String, payload: Value },

    /// None of the candidate iccid fields were present.
    #[error("Cannot find the iccid in the provider payload (tried {candidates})")]
    AmbiguousProviderResponse { candidates: String, payload: Value },

    /// Simcard detail carried no provisioning string.
    #[error("Simcard detail carries no provisioning string")]
    MissingProvisioningData { payload: Value },

    /// The provisioning string could not be encoded.
    #[error(transparent)]
    QrEncoding(#[from] QrError),
}

impl ProvisioningError {
    pub(crate) fn provider<E>(error: E) -> Self
    where
        E: StdError + ProviderFailure + Send + Sync + 'static,
    {
        Self::Provider {
            kind: error.kind(),
            http_status: error.http_status(),
            raw: error.raw_payload(),
            is_retryable: error.is_retryable(),
            should_retry_operation: error.should_retry_operation(),
            source: Box::new(error),
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider { kind, .. } => *kind,
            Self::ActivationFailed { .. } => ErrorKind::ActivationFailed,
            Self::PollTimeout { .. } => ErrorKind::PollTimeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::InvalidField { .. } => ErrorKind::InvalidField,
            Self::AmbiguousProviderResponse { .. } => ErrorKind::AmbiguousProviderResponse,
            Self::MissingProvisioningData { .. } => ErrorKind::MissingProvisioningData,
            Self::QrEncoding(_) => ErrorKind::QrEncoding,
        }
    }

    /// HTTP status returned by the provider, if the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Provider { http_status, .. } => *http_status,
            _ => None,
        }
    }

    /// Provider payload attached to this failure.
    pub fn raw_payload(&self) -> Option<&Value> {
        match self {
            Self::Provider { raw, .. } => raw.as_ref(),
            Self::ActivationFailed { payload, .. }
            | Self::MissingField { payload, .. }
            | Self::InvalidField { payload, .. }
            | Self::AmbiguousProviderResponse { payload, .. }
            | Self::MissingProvisioningData { payload } => Some(payload),
            Self::PollTimeout { .. } | Self::Cancelled { .. } | Self::QrEncoding(_) => None,
        }
    }

    /// Serialisable summary for API responses and logs.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            http_status: self.http_status(),
            raw: self.raw_payload().cloned(),
        }
    }
}

impl RetryableError for ProvisioningError {
    fn is_retryable(&self) -> bool {
        match self {
            ProvisioningError::Provider { is_retryable, .. } => *is_retryable,
            ProvisioningError::ActivationFailed { .. }
            | ProvisioningError::PollTimeout { .. }
            | ProvisioningError::Cancelled { .. }
            | ProvisioningError::MissingField { .. }
            | ProvisioningError::InvalidField { .. }
            | ProvisioningError::AmbiguousProviderResponse { .. }
            | ProvisioningError::MissingProvisioningData { .. }
            | ProvisioningError::QrEncoding(_) => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            ProvisioningError::Provider {
                should_retry_operation,
                ..
            } => *should_retry_operation,
            ProvisioningError::PollTimeout { .. } => true,
            ProvisioningError::ActivationFailed { .. }
            | ProvisioningError::Cancelled { .. }
            | ProvisioningError::MissingField { .. }
            | ProvisioningError::InvalidField { .. }
            | ProvisioningError::AmbiguousProviderResponse { .. }
            | ProvisioningError::MissingProvisioningData { .. }
            | ProvisioningError::QrEncoding(_) => false,
        }
    }
}

/// Serialisable description of a failed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Provider HTTP status, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Provider payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}
