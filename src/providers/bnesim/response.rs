//! Response parsing for the BNESIM API.

use super::errors::{BnesimError, Operation};
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Longest body excerpt kept in an error message.
const MESSAGE_EXCERPT_LEN: usize = 200;

/// Raw HTTP outcome of a provider call.
#[derive(Debug, Clone)]
pub(crate) struct BnesimResponse {
    pub operation: Operation,
    pub status: u16,
    pub body: String,
}

impl BnesimResponse {
    pub fn new(operation: Operation, status: u16, body: String) -> Self {
        Self {
            operation,
            status,
            body,
        }
    }

    /// Accept only HTTP 200 and decode the body as JSON.
    ///
    /// Any other status becomes [`BnesimError::Provider`] carrying the raw
    /// body. An empty 200 body decodes to `null`.
    pub fn into_json(self) -> Result<Value, BnesimError> {
        if self.status != 200 {
            return Err(self.into_provider_error());
        }

        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&self.body).map_err(|source| BnesimError::DeserializeJson {
            operation: self.operation,
            source,
        })
    }

    pub fn into_provider_error(self) -> BnesimError {
        let message = error_message(&self.body)
            .unwrap_or_else(|| format!("HTTP {}", self.status));

        #[cfg(feature = "tracing")]
        warn!(
            operation = %self.operation,
            status = self.status,
            message = %message,
            "BNESIM returned an error response"
        );

        BnesimError::Provider {
            operation: self.operation,
            status: self.status,
            message,
            body: self.body,
        }
    }
}

/// Best-effort reason extracted from an error body.
///
/// Looks for the usual `message` / `error` / `error_description` fields of a
/// JSON body and falls back to a trimmed excerpt of a plain-text body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "error_description", "detail"] {
            match json.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(s)) = inner.get("message") {
                        return Some(s.trim().to_string());
                    }
                }
                _ => {}
            }
        }
        return None;
    }

    Some(trimmed.chars().take(MESSAGE_EXCERPT_LEN).collect())
}
