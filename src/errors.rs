//! Error classification shared by providers and the provisioning service.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Trait for errors that can be classified as retryable or permanent.
///
/// This trait provides two levels of retryability classification:
///
/// 1. **Call-level** (`is_retryable`): whether the same provider call should be
///    repeated. Use this for transient errors like network timeouts, 429 or 5xx.
///
/// 2. **Operation-level** (`should_retry_operation`): whether re-running the
///    whole provisioning workflow might succeed. A poll timeout is not
///    retryable as a call, but a fresh run may well go through.
///
/// # Examples
///
/// ```rust
/// use esim_gateway::RetryableError;
///
/// enum MyError {
///     NetworkTimeout,   // Repeat the call
///     ActivationStuck,  // Don't repeat the poll, but a new run might work
///     BadCredentials,   // Don't retry at all
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::NetworkTimeout)
///     }
///
///     fn should_retry_operation(&self) -> bool {
///         match self {
///             MyError::NetworkTimeout | MyError::ActivationStuck => true,
///             MyError::BadCredentials => false,
///         }
///     }
/// }
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same call is repeated.
    fn is_retryable(&self) -> bool;

    /// Returns true if a fresh provisioning run might succeed.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}

/// Failure categories surfaced at the orchestration boundary.
///
/// Serialises to the names used in error reports (`"ProviderError"`,
/// `"PollTimeout"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or invalid credentials / URLs. Fatal.
    #[serde(rename = "ConfigError")]
    Config,
    /// Login rejected or returned no token.
    #[serde(rename = "AuthError")]
    Auth,
    /// Non-200 HTTP response from the provider.
    #[serde(rename = "ProviderError")]
    Provider,
    /// 200 response missing an expected field.
    #[serde(rename = "ProtocolError")]
    Protocol,
    /// Network failure, client timeout or undecodable body.
    #[serde(rename = "TransportError")]
    Transport,
    /// Activation transaction reached `FAILED`.
    ActivationFailed,
    /// Polling exhausted its attempts without a terminal status.
    PollTimeout,
    /// The caller cancelled the run.
    Cancelled,
    /// Required field absent from an otherwise successful payload.
    MissingField,
    /// Field present but empty or not a scalar.
    InvalidField,
    /// None of the candidate iccid fields were present.
    AmbiguousProviderResponse,
    /// Simcard detail carried no usable provisioning string.
    MissingProvisioningData,
    /// The provisioning string could not be rendered as a QR image.
    #[serde(rename = "QrEncodingError")]
    QrEncoding,
}

impl ErrorKind {
    /// Name used in error reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::Auth => "AuthError",
            Self::Provider => "ProviderError",
            Self::Protocol => "ProtocolError",
            Self::Transport => "TransportError",
            Self::ActivationFailed => "ActivationFailed",
            Self::PollTimeout => "PollTimeout",
            Self::Cancelled => "Cancelled",
            Self::MissingField => "MissingField",
            Self::InvalidField => "InvalidField",
            Self::AmbiguousProviderResponse => "AmbiguousProviderResponse",
            Self::MissingProvisioningData => "MissingProvisioningData",
            Self::QrEncoding => "QrEncodingError",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a [`Provider`](crate::Provider) implementation.
///
/// The provisioning service keeps the original error boxed; this trait lets it
/// capture the classification and HTTP status up front so callers can inspect
/// them without downcasting.
pub trait ProviderFailure: RetryableError {
    /// Category of this failure.
    fn kind(&self) -> ErrorKind;

    /// HTTP status returned by the provider, if the failure came from one.
    fn http_status(&self) -> Option<u16> {
        None
    }

    /// Raw provider payload worth surfacing for diagnosis, if any.
    fn raw_payload(&self) -> Option<serde_json::Value> {
        None
    }
}
