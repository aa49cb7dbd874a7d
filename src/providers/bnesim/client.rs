//! BNESIM HTTP client.

use super::credentials::CredentialCache;
use super::errors::{BnesimError, Operation, Result};
use super::response::{BnesimResponse, error_message};
use crate::types::{
    ActivationTransaction, EsimRequest, Iccid, LicenseRequest, StatusPayload,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, warn};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default BNESIM API base URL.
pub const DEFAULT_API_URL: &str = "https://api.bnesim.com/";

/// Default timeout of a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "BNESIM_BASE_URL";
/// Environment variable holding the operator API key.
pub const ENV_API_KEY: &str = "BNESIM_API_KEY";
/// Environment variable holding the operator API secret.
pub const ENV_API_SECRET: &str = "BNESIM_API_SECRET";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// BNESIM HTTP client.
///
/// Every call except [`login`](Self::login) obtains its bearer token from the
/// shared [`CredentialCache`], so cloning the client is cheap and all clones
/// reuse one token.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::bnesim::BnesimClient;
/// use esim_gateway::LicenseRequest;
///
/// let client = BnesimClient::from_env()?;
///
/// let tx = client
///     .create_license(&LicenseRequest::new("Ada Lovelace").with_email("ada@example.com"))
///     .await?;
/// let status = client.get_activation_status(&tx).await?;
/// println!("license activation {tx}: {}", status.status());
/// ```
#[derive(Clone)]
pub struct BnesimClient {
    http_client: ClientWithMiddleware,
    endpoint: Url,
    credentials: Arc<CredentialCache>,
}

impl std::fmt::Debug for BnesimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BnesimClient")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Builder for configuring a [`BnesimClient`].
pub struct BnesimClientBuilder {
    api_key: String,
    api_secret: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    credentials: Option<Arc<CredentialCache>>,
    timeout: Duration,
}

impl BnesimClientBuilder {
    /// Create a new builder with the given operator key pair.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            endpoint: None,
            http_client: None,
            credentials: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    ///
    /// The request timeout is then the caller's responsibility.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Share an existing credential cache instead of creating one.
    ///
    /// The key pair given to the builder is ignored in that case.
    pub fn credentials(mut self, credentials: Arc<CredentialCache>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the timeout of a single provider call.
    ///
    /// Default: 20 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the [`BnesimClient`].
    pub fn build(self) -> Result<BnesimClient> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => Url::parse(DEFAULT_API_URL)
                .map_err(|e| BnesimError::config(format!("invalid default URL: {e}")))?,
        };
        let endpoint = normalize_endpoint(endpoint)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let client = reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(BnesimError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(CredentialCache::new(self.api_key, self.api_secret)));

        Ok(BnesimClient {
            http_client,
            endpoint,
            credentials,
        })
    }
}

/// Make sure the base URL is http(s) and ends with a slash so operation paths
/// are appended rather than replacing its last segment.
fn normalize_endpoint(mut endpoint: Url) -> Result<Url> {
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(BnesimError::config(format!(
            "BNESIM base URL must be http(s), got `{endpoint}`"
        )));
    }
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }
    Ok(endpoint)
}

impl BnesimClient {
    /// Create a new BNESIM client.
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the BNESIM API
    /// * `api_key` - Operator API key
    /// * `api_secret` - Operator API secret
    pub fn new(
        endpoint: impl AsRef<str>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self> {
        let url = Url::parse(endpoint.as_ref())
            .map_err(|e| BnesimError::config(format!("invalid BNESIM base URL: {e}")))?;

        Self::builder(api_key, api_secret).endpoint(url).build()
    }

    /// Create a client from `BNESIM_BASE_URL`, `BNESIM_API_KEY` and
    /// `BNESIM_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create a client from a variable lookup, failing on the first missing
    /// or blank variable.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BnesimError::config(format!("{name} is not set")))
        };

        let base_url = require(ENV_BASE_URL)?;
        let api_key = require(ENV_API_KEY)?;
        let api_secret = require(ENV_API_SECRET)?;

        Self::new(base_url.trim(), api_key, api_secret)
    }

    /// Create a builder for configuring the client.
    pub fn builder(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> BnesimClientBuilder {
        BnesimClientBuilder::new(api_key, api_secret)
    }

    /// Base URL of the API.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The shared credential cache.
    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    fn operation_url(&self, operation: Operation) -> Result<Url> {
        self.endpoint
            .join(operation.path())
            .map_err(|e| BnesimError::config(format!("invalid URL for {operation}: {e}")))
    }

    /// POST a form and capture the raw outcome.
    async fn send_form<T: Serialize + ?Sized>(
        &self,
        operation: Operation,
        form: &T,
        bearer: Option<&SecretString>,
    ) -> Result<BnesimResponse> {
        let url = self.operation_url(operation)?;
        let body = serde_urlencoded::to_string(form)
            .map_err(|source| BnesimError::EncodeForm { operation, source })?;

        let mut request = self
            .http_client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);

        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(BnesimError::ParseResponse)?;

        Ok(BnesimResponse::new(operation, status, text))
    }

    /// Authenticated call returning the JSON body of a 200 response.
    async fn call<T: Serialize + ?Sized>(&self, operation: Operation, form: &T) -> Result<Value> {
        let token = self.token().await?;
        let response = self.send_form(operation, form, Some(&token)).await?;

        if response.status == 401 && self.credentials.invalidate_token(&token).await {
            #[cfg(feature = "tracing")]
            warn!(operation = %operation, "Token rejected, invalidated cached credential");
        }

        response.into_json()
    }

    /// Exchange the operator key pair for a bearer token.
    ///
    /// This bypasses the cache; use [`token`](Self::token) for cached access.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "BnesimClient::login", skip_all)
    )]
    pub async fn login(
        &self,
        api_key: &SecretString,
        api_secret: &SecretString,
    ) -> Result<SecretString> {
        let form = [
            ("api_key", api_key.expose_secret()),
            ("api_secret", api_secret.expose_secret()),
            ("type", "operator"),
        ];

        let response = self.send_form(Operation::Login, &form[..], None).await?;

        if response.status != 200 {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(BnesimError::Auth {
                status: Some(response.status),
                message,
            });
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|_| BnesimError::Auth {
            status: Some(response.status),
            message: "login response is not JSON".to_string(),
        })?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BnesimError::Auth {
                status: Some(response.status),
                message: "login response carries no token".to_string(),
            })?;

        #[cfg(feature = "tracing")]
        Span::current().set_status(Status::Ok);

        Ok(SecretString::from(token.to_string()))
    }

    /// A bearer token with at least one minute of validity left, logging in
    /// only when the cached one is missing or about to expire.
    pub async fn token(&self) -> Result<SecretString> {
        self.credentials
            .get_or_refresh(|api_key, api_secret| async move {
                self.login(&api_key, &api_secret).await
            })
            .await
    }

    /// Start a license activation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "BnesimClient::create_license",
            skip_all,
            fields(transaction = tracing::field::Empty)
        )
    )]
    pub async fn create_license(&self, request: &LicenseRequest) -> Result<ActivationTransaction> {
        let body = self.call(Operation::CreateLicense, request).await?;
        let transaction = transaction_from(Operation::CreateLicense, body)?;

        #[cfg(feature = "tracing")]
        Span::current()
            .record("transaction", transaction.as_str())
            .set_status(Status::Ok);

        Ok(transaction)
    }

    /// Attach an eSIM to a license.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "BnesimClient::add_esim",
            skip_all,
            fields(
                license_cli = %request.license_cli,
                product_id = %request.product_id,
                transaction = tracing::field::Empty
            )
        )
    )]
    pub async fn add_esim(&self, request: &EsimRequest) -> Result<ActivationTransaction> {
        let body = self.call(Operation::AddEsim, request).await?;
        let transaction = transaction_from(Operation::AddEsim, body)?;

        #[cfg(feature = "tracing")]
        Span::current()
            .record("transaction", transaction.as_str())
            .set_status(Status::Ok);

        Ok(transaction)
    }

    /// Read the status of an activation transaction.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "BnesimClient::get_activation_status",
            skip_all,
            fields(transaction = %transaction, status = tracing::field::Empty)
        )
    )]
    pub async fn get_activation_status(
        &self,
        transaction: &ActivationTransaction,
    ) -> Result<StatusPayload> {
        let form = [("activationTransaction", transaction.as_str())];
        let payload = StatusPayload::new(self.call(Operation::GetActivationStatus, &form[..]).await?);

        #[cfg(feature = "tracing")]
        Span::current().record("status", payload.status().to_string());

        Ok(payload)
    }

    /// Fetch simcard detail, optionally with its loaded products.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "BnesimClient::get_simcard_detail",
            skip_all,
            fields(iccid = %iccid, with_products)
        )
    )]
    pub async fn get_simcard_detail(&self, iccid: &Iccid, with_products: bool) -> Result<Value> {
        let form = [
            ("iccid", iccid.as_str()),
            ("with_products", if with_products { "1" } else { "0" }),
        ];
        self.call(Operation::GetSimcardDetail, &form[..]).await
    }

    /// List products, optionally restricted to an area.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "BnesimClient::get_products", skip_all, fields(area))
    )]
    pub async fn get_products(&self, area: Option<&str>) -> Result<Value> {
        let form: Vec<(&str, &str)> = area.map(|a| ("area", a)).into_iter().collect();
        self.call(Operation::GetProducts, &form[..]).await
    }
}

/// Pull `activationTransaction` out of a job-starting response.
fn transaction_from(operation: Operation, body: Value) -> Result<ActivationTransaction> {
    match body
        .get("activationTransaction")
        .and_then(ActivationTransaction::from_json)
    {
        Some(transaction) => Ok(transaction),
        None => Err(BnesimError::Protocol {
            operation,
            field: "activationTransaction",
            body,
        }),
    }
}
