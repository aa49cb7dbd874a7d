//! Retryable provider wrapper.

use super::traits::Provider;
use crate::errors::RetryableError;
use crate::types::{ActivationTransaction, EsimRequest, Iccid, LicenseRequest, StatusPayload};
use crate::utils::retry::RetryConfig;
use backon::Retryable;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Callback type for retry notifications.
///
/// This callback is invoked each time a retry is attempted.
/// The callback receives the error that caused the retry and the duration
/// until the next retry attempt.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::EsimRetryableProvider;
///
/// let provider = EsimRetryableProvider::new(base_provider)
///     .with_on_retry(|error, duration| {
///         println!("Retrying after {:?} due to: {}", duration, error);
///     });
/// ```
pub type OnRetryCallback<E> = Arc<dyn Fn(&E, Duration) + Send + Sync>;

/// Wrapper that retries transient failures of the idempotent provider reads.
///
/// Activation status, simcard detail and product listing are repeated with
/// exponential backoff while the error's `is_retryable()` holds. License
/// creation and eSIM assignment start jobs on the provider side and are
/// passed through untouched, as is `authenticate`.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::{EsimRetryableProvider, RetryConfig};
/// use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
/// use std::time::Duration;
///
/// let base_provider = BnesimProvider::new(BnesimClient::from_env()?);
///
/// // With default retry config
/// let provider = EsimRetryableProvider::new(base_provider.clone());
///
/// // With custom retry config
/// let custom_config = RetryConfig::default()
///     .with_max_retries(5)
///     .with_min_delay(Duration::from_millis(250));
/// let provider = EsimRetryableProvider::with_config(base_provider, custom_config);
/// ```
pub struct EsimRetryableProvider<P: Provider> {
    inner: Arc<P>,
    retry_config: RetryConfig,
    on_retry: Option<OnRetryCallback<P::Error>>,
}

impl<P: Provider> Clone for EsimRetryableProvider<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            retry_config: self.retry_config.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<P: Provider + Debug> Debug for EsimRetryableProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsimRetryableProvider")
            .field("inner", &self.inner)
            .field("retry_config", &self.retry_config)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "..."))
            .finish()
    }
}

impl<P: Provider> EsimRetryableProvider<P> {
    /// Wrap a provider with default retry logic.
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, RetryConfig::default())
    }

    /// Wrap a provider with custom retry configuration.
    pub fn with_config(inner: P, retry_config: RetryConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            retry_config,
            on_retry: None,
        }
    }

    /// Set a callback to be invoked on each retry attempt.
    pub fn with_on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&P::Error, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Get reference to the inner provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get reference to the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    fn notifier(
        &self,
        _operation: &'static str,
    ) -> impl Fn(&P::Error, Duration) + Send + Sync + 'static
    where
        P::Error: Debug,
    {
        let on_retry = self.on_retry.clone();
        move |err, duration| {
            if let Some(ref callback) = on_retry {
                callback(err, duration);
            }

            #[cfg(feature = "tracing")]
            debug!(
                error = ?err,
                operation = _operation,
                retry_after_secs = %duration.as_secs_f64(),
                "Retrying provider call"
            );
        }
    }
}

impl<P: Provider> Provider for EsimRetryableProvider<P>
where
    P::Error: Debug,
{
    type Error = P::Error;

    async fn authenticate(&self) -> Result<(), Self::Error> {
        self.inner.authenticate().await
    }

    async fn create_license(
        &self,
        request: &LicenseRequest,
    ) -> Result<ActivationTransaction, Self::Error> {
        self.inner.create_license(request).await
    }

    async fn add_esim(&self, request: &EsimRequest) -> Result<ActivationTransaction, Self::Error> {
        self.inner.add_esim(request).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "EsimRetryableProvider::get_activation_status",
            skip_all,
            fields(transaction = %transaction)
        )
    )]
    async fn get_activation_status(
        &self,
        transaction: &ActivationTransaction,
    ) -> Result<StatusPayload, Self::Error> {
        let inner = Arc::clone(&self.inner);
        (|| {
            let inner = Arc::clone(&inner);
            let transaction = transaction.clone();
            async move { inner.get_activation_status(&transaction).await }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &Self::Error| err.is_retryable())
        .notify(self.notifier("get_activation_status"))
        .await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "EsimRetryableProvider::get_simcard_detail",
            skip_all,
            fields(iccid = %iccid)
        )
    )]
    async fn get_simcard_detail(
        &self,
        iccid: &Iccid,
        with_products: bool,
    ) -> Result<Value, Self::Error> {
        let inner = Arc::clone(&self.inner);
        (|| {
            let inner = Arc::clone(&inner);
            let iccid = iccid.clone();
            async move { inner.get_simcard_detail(&iccid, with_products).await }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &Self::Error| err.is_retryable())
        .notify(self.notifier("get_simcard_detail"))
        .await
    }

    async fn get_products(&self, area: Option<&str>) -> Result<Value, Self::Error> {
        let inner = Arc::clone(&self.inner);
        let area = area.map(str::to_string);
        (|| {
            let inner = Arc::clone(&inner);
            let area = area.clone();
            async move { inner.get_products(area.as_deref()).await }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &Self::Error| err.is_retryable())
        .notify(self.notifier("get_products"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockError, MockProvider};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick() -> RetryConfig {
        RetryConfig::default()
            .with_min_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(2))
            .with_jitter(false)
    }

    #[tokio::test]
    async fn test_status_retried_until_success() {
        let mock = MockProvider::new()
            .status("E1", Err(MockError::provider(503, json!("busy"))))
            .status("E1", Err(MockError::transport()))
            .status("E1", Ok(json!({ "activation_status": "OK" })));

        let retries = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&retries);
        let provider = EsimRetryableProvider::with_config(mock.clone(), quick())
            .with_on_retry(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let payload = provider
            .get_activation_status(&ActivationTransaction::from("E1"))
            .await
            .unwrap();

        assert_eq!(payload.as_json()["activation_status"], "OK");
        assert_eq!(mock.calls("get_activation_status"), 3);
        assert_eq!(retries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let mock = MockProvider::new().detail(Err(MockError::provider(404, json!({}))));
        let provider = EsimRetryableProvider::with_config(mock.clone(), quick());

        let err = provider
            .get_simcard_detail(&Iccid::from("8988"), false)
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(404));
        assert_eq!(mock.calls("get_simcard_detail"), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let mock = MockProvider::new();
        let provider =
            EsimRetryableProvider::with_config(mock.clone(), quick().with_max_retries(2));

        assert!(provider.get_products(Some("europe")).await.is_err());
        assert_eq!(mock.calls("get_products"), 3);
    }

    #[tokio::test]
    async fn test_job_starting_calls_pass_through() {
        let mock = MockProvider::new()
            .license(Err(MockError::provider(503, json!("busy"))))
            .license(Ok("L2"));
        let provider = EsimRetryableProvider::with_config(mock.clone(), quick());

        let err = provider
            .create_license(&LicenseRequest::new("Ada"))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(mock.calls("create_license"), 1);
    }
}
