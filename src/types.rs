//! Core types for eSIM provisioning operations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Declares a string-backed identifier with the usual conversions.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

// =============================================================================
// Identifiers
// =============================================================================

string_id!(
    /// License identifier assigned by the provider once a license activation
    /// reaches `OK`. Required before an eSIM can be attached to the license.
    LicenseCli
);

string_id!(
    /// Unique identifier of an issued SIM/eSIM profile.
    Iccid
);

string_id!(
    /// Provider product (data plan) identifier.
    ProductId
);

string_id!(
    /// Payload encoded into the QR image: an LPA activation string
    /// (`LPA:1$smdp$matching-id`) or a universal installation link.
    ProvisioningString
);

/// Opaque handle to an in-progress asynchronous provider job.
///
/// The provider returns it either as a JSON string or a JSON number; both are
/// normalised to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ActivationTransaction(String);

impl ActivationTransaction {
    /// Create a new ActivationTransaction.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the transaction id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read a transaction id out of a JSON value (string or number).
    ///
    /// Returns `None` for any other shape, including an empty string and a
    /// number too wide for an integer.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) if n.is_u64() || n.is_i64() => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ActivationTransaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "activation transaction must be a non-empty string or a number, got {value}"
            ))
        })
    }
}

impl Display for ActivationTransaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ActivationTransaction {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActivationTransaction {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActivationTransaction {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Activation status
// =============================================================================

/// Status of an activation transaction.
///
/// Only [`Ok`](Self::Ok) and [`Failed`](Self::Failed) are terminal. Every
/// other value, including strings the provider may introduce later, means the
/// job is still running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationStatus {
    /// Job finished successfully.
    Ok,
    /// Job failed on the provider side.
    Failed,
    /// Job accepted but not finished.
    Pending,
    /// Any other provider-defined value.
    Other(String),
}

impl ActivationStatus {
    /// Parse a raw `activation_status` value. Only the exact upper-case
    /// literals are recognised.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "OK" => Self::Ok,
            "FAILED" => Self::Failed,
            "PENDING" => Self::Pending,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether polling can stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Failed)
    }
}

impl Display for ActivationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Failed => write!(f, "FAILED"),
            Self::Pending => write!(f, "PENDING"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Response body of a get-status call.
///
/// The body is kept as-is; which extra fields (`license_cli`, `iccid`, ...) it
/// carries depends on the job type and on the provider account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusPayload(Value);

impl StatusPayload {
    /// Field holding the job status.
    pub const STATUS_FIELD: &'static str = "activation_status";

    /// Wrap a raw JSON body.
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Status carried by the payload.
    ///
    /// A missing or non-string `activation_status` is reported as
    /// [`ActivationStatus::Pending`].
    pub fn status(&self) -> ActivationStatus {
        self.0
            .get(Self::STATUS_FIELD)
            .and_then(Value::as_str)
            .map(ActivationStatus::from_raw)
            .unwrap_or(ActivationStatus::Pending)
    }

    /// Borrow the raw body.
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Take the raw body.
    pub fn into_json(self) -> Value {
        self.0
    }
}

impl From<Value> for StatusPayload {
    fn from(body: Value) -> Self {
        Self(body)
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Parameters of a license activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseRequest {
    /// Customer name shown on the license.
    pub name: String,
    /// Customer email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Customer phone number.
    #[serde(rename = "phonenumber", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl LicenseRequest {
    /// Create a license request for the given customer name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    /// Attach the customer email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach the customer phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Parameters of an eSIM assignment to an existing license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EsimRequest {
    /// License to attach the eSIM to.
    pub license_cli: LicenseCli,
    /// Product (plan) to load on the eSIM.
    pub product_id: ProductId,
    /// Optional deferred activation date, passed through verbatim.
    #[serde(
        rename = "scheduled_activation_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_date: Option<String>,
}

impl EsimRequest {
    /// Create an immediate eSIM assignment.
    pub fn new(license_cli: LicenseCli, product_id: ProductId) -> Self {
        Self {
            license_cli,
            product_id,
            scheduled_date: None,
        }
    }

    /// Defer activation to the given date.
    pub fn scheduled_for(mut self, date: impl Into<String>) -> Self {
        self.scheduled_date = Some(date.into());
        self
    }
}

/// Input of one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    /// Customer name used for the license.
    pub customer_name: String,
    /// Customer email used for the license.
    pub customer_email: String,
    /// Product to load on the eSIM.
    pub product_id: ProductId,
}

/// A provisioning request that must not reach the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    /// No customer email.
    #[error("customerEmail is required")]
    MissingEmail,
    /// Customer email does not look like an address.
    #[error("customerEmail is not a valid email address")]
    InvalidEmail,
    /// No customer name.
    #[error("customerName is required")]
    MissingName,
    /// No product.
    #[error("productId is required")]
    MissingProduct,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Loose syntactic check of an email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

impl ProvisioningRequest {
    /// Check the request before any provider call is made.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.customer_email.trim().is_empty() {
            return Err(InvalidRequest::MissingEmail);
        }
        if !is_valid_email(&self.customer_email) {
            return Err(InvalidRequest::InvalidEmail);
        }
        if self.customer_name.trim().is_empty() {
            return Err(InvalidRequest::MissingName);
        }
        if self.product_id.as_str().trim().is_empty() {
            return Err(InvalidRequest::MissingProduct);
        }
        Ok(())
    }

    /// Create a provisioning request.
    pub fn new(
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        product_id: impl Into<ProductId>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            product_id: product_id.into(),
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Auxiliary simcard fields surfaced for diagnosis.
///
/// None of these are used for QR generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimcardDiagnostics {
    /// Provider-rendered QR image (usually a URL or data URL).
    pub qr_code_image: Option<String>,
    /// SM-DP+ server address.
    pub smdp_address: Option<String>,
    /// Matching id for the SM-DP+ download.
    pub matching_id: Option<String>,
    /// iOS one-tap installation link.
    pub ios_universal_installation_link: Option<String>,
}

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedEsim {
    /// ICCID of the issued eSIM.
    pub iccid: Iccid,
    /// License the eSIM was attached to.
    pub license_cli: LicenseCli,
    /// Payload to encode into the QR image.
    pub provisioning_string: ProvisioningString,
    /// Auxiliary simcard detail fields.
    pub diagnostics: SimcardDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activation_status_parsing() {
        assert_eq!(ActivationStatus::from_raw("OK"), ActivationStatus::Ok);
        assert_eq!(ActivationStatus::from_raw("FAILED"), ActivationStatus::Failed);
        assert_eq!(ActivationStatus::from_raw("PENDING"), ActivationStatus::Pending);
        assert_eq!(
            ActivationStatus::from_raw("IN_PROGRESS"),
            ActivationStatus::Other("IN_PROGRESS".to_string())
        );
    }

    #[test]
    fn test_lower_case_status_is_not_terminal() {
        for raw in ["ok", "failed", " OK", "Failed"] {
            let status = ActivationStatus::from_raw(raw);
            assert_eq!(status, ActivationStatus::Other(raw.to_string()));
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn test_only_ok_and_failed_are_terminal() {
        assert!(ActivationStatus::Ok.is_terminal());
        assert!(ActivationStatus::Failed.is_terminal());
        assert!(!ActivationStatus::Pending.is_terminal());
        assert!(!ActivationStatus::Other("QUEUED".to_string()).is_terminal());
    }

    #[test]
    fn test_status_payload_missing_status_is_pending() {
        let payload = StatusPayload::new(json!({ "license_cli": "CLI1" }));
        assert_eq!(payload.status(), ActivationStatus::Pending);

        let payload = StatusPayload::new(json!({ "activation_status": 3 }));
        assert_eq!(payload.status(), ActivationStatus::Pending);

        let payload = StatusPayload::new(json!({ "activation_status": "OK" }));
        assert_eq!(payload.status(), ActivationStatus::Ok);
    }

    #[test]
    fn test_activation_transaction_accepts_string_and_number() {
        let tx: ActivationTransaction = serde_json::from_value(json!("L1")).unwrap();
        assert_eq!(tx.as_str(), "L1");

        let tx: ActivationTransaction = serde_json::from_value(json!(98765)).unwrap();
        assert_eq!(tx.as_str(), "98765");

        assert!(serde_json::from_value::<ActivationTransaction>(json!("")).is_err());
        assert!(serde_json::from_value::<ActivationTransaction>(json!(null)).is_err());
    }

    #[test]
    fn test_float_backed_transaction_is_rejected() {
        let wide: Value = serde_json::from_str("89882390000012345678").unwrap();
        assert_eq!(ActivationTransaction::from_json(&wide), None);
        assert_eq!(ActivationTransaction::from_json(&json!(12.5)), None);
        assert_eq!(
            ActivationTransaction::from_json(&json!(-7)).map(|tx| tx.to_string()),
            Some("-7".to_string())
        );
    }

    #[test]
    fn test_license_request_form_fields() {
        let request = LicenseRequest::new("Ada").with_email("ada@example.com");
        let encoded = serde_urlencoded::to_string(&request).unwrap();
        assert_eq!(encoded, "name=Ada&email=ada%40example.com");

        let request = LicenseRequest::new("Ada").with_phone("+441234");
        let encoded = serde_urlencoded::to_string(&request).unwrap();
        assert_eq!(encoded, "name=Ada&phonenumber=%2B441234");
    }

    #[test]
    fn test_esim_request_form_fields() {
        let request = EsimRequest::new(LicenseCli::from("CLI1"), ProductId::from("P9"))
            .scheduled_for("2026-11-01");
        let encoded = serde_urlencoded::to_string(&request).unwrap();
        assert_eq!(
            encoded,
            "license_cli=CLI1&product_id=P9&scheduled_activation_date=2026-11-01"
        );
    }

    #[test]
    fn test_provisioning_request_validation() {
        assert_eq!(ProvisioningRequest::new("Ada", "ada@example.com", "P1").validate(), Ok(()));
        assert_eq!(
            ProvisioningRequest::new("Ada", " ", "P1").validate(),
            Err(InvalidRequest::MissingEmail)
        );
        assert_eq!(
            ProvisioningRequest::new("Ada", "ada@example", "P1").validate(),
            Err(InvalidRequest::InvalidEmail)
        );
        assert_eq!(
            ProvisioningRequest::new("", "ada@example.com", "P1").validate(),
            Err(InvalidRequest::MissingName)
        );
        assert_eq!(
            ProvisioningRequest::new("Ada", "ada@example.com", "").validate(),
            Err(InvalidRequest::MissingProduct)
        );
        assert!(is_valid_email(" bob@mail.example.org "));
        assert!(!is_valid_email("bob @example.com"));
    }
}
