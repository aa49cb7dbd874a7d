//! Error types for the BNESIM provider.

use crate::errors::{ErrorKind, ProviderFailure, RetryableError};
use serde_json::Value;
use thiserror::Error;

/// Provider operations, used to label errors and log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /v2.0/login`
    Login,
    /// `POST /v2.0/enterprise/license/activation`
    CreateLicense,
    /// `POST /v2.0/enterprise/simcard/add-esim`
    AddEsim,
    /// `POST /v2.0/enterprise/activation-transaction/get-status`
    GetActivationStatus,
    /// `POST /v2.0/enterprise/simcard/get-detail`
    GetSimcardDetail,
    /// `POST /v2.0/enterprise/products/get-products`
    GetProducts,
}

impl Operation {
    /// Path of the operation relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "v2.0/login",
            Self::CreateLicense => "v2.0/enterprise/license/activation",
            Self::AddEsim => "v2.0/enterprise/simcard/add-esim",
            Self::GetActivationStatus => "v2.0/enterprise/activation-transaction/get-status",
            Self::GetSimcardDetail => "v2.0/enterprise/simcard/get-detail",
            Self::GetProducts => "v2.0/enterprise/products/get-products",
        }
    }

    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CreateLicense => "create_license",
            Self::AddEsim => "add_esim",
            Self::GetActivationStatus => "get_activation_status",
            Self::GetSimcardDetail => "get_simcard_detail",
            Self::GetProducts => "get_products",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for BNESIM client operations.
///
/// Credentials never appear in any variant.
#[derive(Debug, Error)]
pub enum BnesimError {
    /// A required setting is missing or malformed.
    #[error("BNESIM configuration error: {message}")]
    Config {
        /// What is wrong.
        message: String,
    },

    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to encode a form body.
    #[error("Failed to encode {operation} request: {source}")]
    EncodeForm {
        /// Operation being encoded.
        operation: Operation,
        #[source]
        source: serde_urlencoded::ser::Error,
    },

    /// Login returned a non-success status or no token.
    #[error("BNESIM login failed: {message}")]
    Auth {
        /// HTTP status, when the provider answered with one.
        status: Option<u16>,
        /// What went wrong.
        message: String,
    },

    /// Provider answered with a non-200 status.
    #[error("BNESIM {operation} failed with HTTP {status}: {message}")]
    Provider {
        /// Operation that failed.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Best-effort human-readable reason from the body.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// A 200 response lacked an expected field.
    #[error("BNESIM {operation} response is missing `{field}`")]
    Protocol {
        /// Operation whose response was incomplete.
        operation: Operation,
        /// Missing field.
        field: &'static str,
        /// Raw response body.
        body: Value,
    },

    /// Failed to send HTTP request.
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Failed to read response body.
    #[error("Failed to read response: {0}")]
    ParseResponse(#[source] reqwest::Error),

    /// Failed to deserialize JSON response.
    #[error("Failed to deserialize {operation} response: {source}")]
    DeserializeJson {
        /// Operation whose body was not JSON.
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, BnesimError>;

impl BnesimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            Self::Auth { status, .. } => *status,
            _ => None,
        }
    }
}

impl RetryableError for BnesimError {
    fn is_retryable(&self) -> bool {
        match self {
            // Rate limiting and server-side failures are transient
            BnesimError::Provider { status, .. } => *status == 429 || *status >= 500,
            BnesimError::HttpRequest(_) | BnesimError::ParseResponse(_) => true,
            BnesimError::Config { .. }
            | BnesimError::BuildHttpClient(_)
            | BnesimError::EncodeForm { .. }
            | BnesimError::Auth { .. }
            | BnesimError::Protocol { .. }
            | BnesimError::DeserializeJson { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            BnesimError::Provider { status, .. } => {
                *status == 401 || *status == 429 || *status >= 500
            }
            BnesimError::HttpRequest(_) | BnesimError::ParseResponse(_) => true,
            // The provider may have had a hiccup; a fresh run re-reads everything
            BnesimError::Protocol { .. } | BnesimError::DeserializeJson { .. } => true,
            BnesimError::Config { .. }
            | BnesimError::BuildHttpClient(_)
            | BnesimError::EncodeForm { .. }
            | BnesimError::Auth { .. } => false,
        }
    }
}

impl ProviderFailure for BnesimError {
    fn kind(&self) -> ErrorKind {
        match self {
            BnesimError::Config { .. }
            | BnesimError::BuildHttpClient(_)
            | BnesimError::EncodeForm { .. } => ErrorKind::Config,
            BnesimError::Auth { .. } => ErrorKind::Auth,
            BnesimError::Provider { .. } => ErrorKind::Provider,
            BnesimError::Protocol { .. } => ErrorKind::Protocol,
            BnesimError::HttpRequest(_)
            | BnesimError::ParseResponse(_)
            | BnesimError::DeserializeJson { .. } => ErrorKind::Transport,
        }
    }

    fn http_status(&self) -> Option<u16> {
        self.status()
    }

    fn raw_payload(&self) -> Option<Value> {
        match self {
            BnesimError::Provider { body, .. } => Some(
                serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())),
            ),
            BnesimError::Protocol { body, .. } => Some(body.clone()),
            _ => None,
        }
    }
}
