//! Main service implementation.

use super::config::{ProvisioningServiceConfig, ProvisioningServiceConfigBuilder};
use super::error::ProvisioningError;
use super::poller::poll_until_terminal;
use super::stage::{OnStageCallback, ProvisioningStage, StageTracker};
use super::traits::ProvisioningServiceTrait;
use crate::errors::ProviderFailure;
use crate::lookup::{FieldChain, FieldPath, Lookup};
use crate::providers::traits::Provider;
use crate::qr::{EncodedQr, QrEncoder, QrError};
use crate::types::{
    EsimRequest, Iccid, LicenseCli, LicenseRequest, ProvisionedEsim, ProvisioningRequest,
    ProvisioningString, SimcardDiagnostics,
};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info};

/// A provisioned eSIM together with its rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedQr {
    /// Provisioning outcome.
    pub esim: ProvisionedEsim,
    /// QR image of `esim.provisioning_string`.
    pub qr: EncodedQr,
}

/// Generic provisioning service that works with any Provider implementation.
///
/// One call to [`provision_esim`](ProvisioningServiceTrait::provision_esim)
/// runs the whole workflow:
/// - Start a license activation and poll it until the license is ready
/// - Attach an eSIM to the license and poll until it is issued
/// - Fetch the simcard detail and pick the provisioning string
///
/// Steps run strictly in sequence; a failure at any step stops the run and no
/// later provider call is made.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::{ProvisioningRequest, ProvisioningService, ProvisioningServiceTrait};
/// use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
///
/// let provider = BnesimProvider::new(BnesimClient::from_env()?);
/// let service = ProvisioningService::with_provider(provider);
///
/// let result = service
///     .provision_and_encode(&ProvisioningRequest::new("Ada", "ada@example.com", "P1"))
///     .await?;
/// println!("{} -> {}", result.esim.iccid, result.qr.to_data_url());
/// ```
#[derive(Clone)]
pub struct ProvisioningService<P: Provider> {
    provider: P,
    config: ProvisioningServiceConfig,
    qr_encoder: Option<Arc<dyn QrEncoder>>,
    on_stage: Option<OnStageCallback>,
}

impl<P: Provider + Debug> Debug for ProvisioningService<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningService")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .field("qr_encoder", &self.qr_encoder.as_ref().map(|_| "..."))
            .field("on_stage", &self.on_stage.as_ref().map(|_| "..."))
            .finish()
    }
}

fn default_qr_encoder() -> Option<Arc<dyn QrEncoder>> {
    #[cfg(feature = "qr")]
    {
        Some(Arc::new(crate::qr::PngQrEncoder::default()))
    }
    #[cfg(not(feature = "qr"))]
    {
        None
    }
}

impl<P: Provider> ProvisioningService<P> {
    /// Create a new service with a custom provider and configuration.
    pub fn new(provider: P, config: ProvisioningServiceConfig) -> Self {
        Self {
            provider,
            config,
            qr_encoder: default_qr_encoder(),
            on_stage: None,
        }
    }

    /// Create a new service with default configuration.
    pub fn with_provider(provider: P) -> Self {
        Self::new(provider, ProvisioningServiceConfig::default())
    }

    /// Create a new builder for ProvisioningService.
    pub fn builder(provider: P) -> ProvisioningServiceBuilder<P> {
        ProvisioningServiceBuilder::new(provider)
    }

    /// Replace the QR encoder used by `provision_and_encode`.
    pub fn with_qr_encoder(mut self, encoder: impl QrEncoder + 'static) -> Self {
        self.qr_encoder = Some(Arc::new(encoder));
        self
    }

    /// Set a callback invoked each time a run enters a new stage.
    pub fn with_on_stage<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProvisioningStage) + Send + Sync + 'static,
    {
        self.on_stage = Some(Arc::new(callback));
        self
    }

    /// Get reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get reference to the service configuration.
    pub fn config(&self) -> &ProvisioningServiceConfig {
        &self.config
    }

    /// Get mutable reference to the service configuration.
    pub fn config_mut(&mut self) -> &mut ProvisioningServiceConfig {
        &mut self.config
    }

    /// Make sure the provider holds a usable credential.
    pub async fn authenticate(&self) -> Result<(), ProvisioningError> {
        self.provider
            .authenticate()
            .await
            .map_err(ProvisioningError::provider)
    }

    /// Raw product listing, optionally restricted to an area.
    pub async fn list_products(&self, area: Option<&str>) -> Result<Value, ProvisioningError> {
        self.provider
            .get_products(area)
            .await
            .map_err(ProvisioningError::provider)
    }

    /// Run the provisioning workflow; `cancel` aborts it at the next provider
    /// call or poll sleep.
    pub async fn provision_esim_cancellable(
        &self,
        request: &ProvisioningRequest,
        cancel: &CancellationToken,
    ) -> Result<ProvisionedEsim, ProvisioningError> {
        self.execute(request, cancel, false)
            .await
            .map(|(esim, _)| esim)
    }

    /// Run the provisioning workflow and render the provisioning string as a
    /// QR image.
    pub async fn provision_and_encode_cancellable(
        &self,
        request: &ProvisioningRequest,
        cancel: &CancellationToken,
    ) -> Result<ProvisionedQr, ProvisioningError> {
        match self.execute(request, cancel, true).await? {
            (esim, Some(qr)) => Ok(ProvisionedQr { esim, qr }),
            (_, None) => Err(QrError::new("no QR encoder configured").into()),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "esim.provision",
            skip_all,
            fields(product_id = %request.product_id)
        )
    )]
    async fn execute(
        &self,
        request: &ProvisioningRequest,
        cancel: &CancellationToken,
        encode: bool,
    ) -> Result<(ProvisionedEsim, Option<EncodedQr>), ProvisioningError> {
        let mut tracker = StageTracker::new(self.on_stage.clone());

        let outcome = async {
            let esim = self.run(request, cancel, &mut tracker).await?;
            let qr = if encode {
                Some(self.encode(&esim.provisioning_string)?)
            } else {
                None
            };
            Ok::<_, ProvisioningError>((esim, qr))
        }
        .await;

        match outcome {
            Ok(done) => {
                tracker.step();

                #[cfg(feature = "tracing")]
                info!(iccid = %done.0.iccid, "eSIM provisioned");

                Ok(done)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                error!(stage = %tracker.current(), kind = %e.kind(), error = %e, "Provisioning failed");

                tracker.fail();
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &ProvisioningRequest,
        cancel: &CancellationToken,
        tracker: &mut StageTracker,
    ) -> Result<ProvisionedEsim, ProvisioningError> {
        let policy = self.config.poll_policy;

        tracker.step();
        let license_request =
            LicenseRequest::new(&request.customer_name).with_email(&request.customer_email);
        let license_tx = guarded(cancel, self.provider.create_license(&license_request)).await?;

        #[cfg(feature = "tracing")]
        debug!(transaction = %license_tx, "License activation started");

        let license_status = poll_until_terminal(&self.provider, &license_tx, policy, cancel).await?;
        let license_cli = LicenseCli::new(required(
            &self.config.license_cli_fields,
            license_status.as_json(),
        )?);
        tracker.step();

        #[cfg(feature = "tracing")]
        info!(license_cli = %license_cli, "License ready");

        tracker.step();
        let esim_request = EsimRequest::new(license_cli.clone(), request.product_id.clone());
        let esim_tx = guarded(cancel, self.provider.add_esim(&esim_request)).await?;

        #[cfg(feature = "tracing")]
        debug!(transaction = %esim_tx, "eSIM assignment started");

        let esim_status = poll_until_terminal(&self.provider, &esim_tx, policy, cancel).await?;
        let iccid = Iccid::new(resolve_iccid(&self.config.iccid_fields, esim_status.as_json())?);
        tracker.step();

        #[cfg(feature = "tracing")]
        info!(iccid = %iccid, "eSIM issued");

        let detail = guarded(
            cancel,
            self.provider
                .get_simcard_detail(&iccid, self.config.with_products),
        )
        .await?;
        tracker.step();

        let provisioning_string = ProvisioningString::new(resolve_provisioning_string(
            &self.config.provisioning_fields,
            &detail,
        )?);

        Ok(ProvisionedEsim {
            iccid,
            license_cli,
            provisioning_string,
            diagnostics: diagnostics(&detail),
        })
    }

    fn encode(&self, payload: &ProvisioningString) -> Result<EncodedQr, ProvisioningError> {
        let encoder = self
            .qr_encoder
            .as_ref()
            .ok_or_else(|| QrError::new("no QR encoder configured"))?;
        Ok(encoder.encode(payload.as_str())?)
    }
}

impl<P: Provider> ProvisioningServiceTrait for ProvisioningService<P> {
    type Error = ProvisioningError;

    async fn provision_esim(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedEsim, Self::Error> {
        self.provision_esim_cancellable(request, &CancellationToken::new())
            .await
    }

    async fn provision_and_encode(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedQr, Self::Error> {
        self.provision_and_encode_cancellable(request, &CancellationToken::new())
            .await
    }
}

/// Await a provider call unless `cancel` fires first.
async fn guarded<T, E, F>(cancel: &CancellationToken, call: F) -> Result<T, ProvisioningError>
where
    F: Future<Output = Result<T, E>>,
    E: StdError + ProviderFailure + Send + Sync + 'static,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProvisioningError::Cancelled { transaction: None }),
        result = call => result.map_err(ProvisioningError::provider),
    }
}

/// Resolve a chain that must yield a usable scalar.
fn required(chain: &FieldChain, payload: &Value) -> Result<String, ProvisioningError> {
    match chain.resolve(payload).scalar() {
        Some(Ok(value)) => Ok(value),
        Some(Err(path)) => Err(invalid_field(path, payload)),
        None => Err(ProvisioningError::MissingField {
            field: chain.to_string(),
            payload: payload.clone(),
        }),
    }
}

fn resolve_iccid(chain: &FieldChain, payload: &Value) -> Result<String, ProvisioningError> {
    match chain.resolve(payload).scalar() {
        Some(Ok(iccid)) => Ok(iccid),
        Some(Err(path)) => Err(invalid_field(path, payload)),
        None => Err(ProvisioningError::AmbiguousProviderResponse {
            candidates: chain.to_string(),
            payload: payload.clone(),
        }),
    }
}

fn resolve_provisioning_string(
    chain: &FieldChain,
    detail: &Value,
) -> Result<String, ProvisioningError> {
    match chain.resolve(detail) {
        Lookup::NotFound => Err(ProvisioningError::MissingProvisioningData {
            payload: detail.clone(),
        }),
        found => match found.scalar() {
            Some(Ok(value)) => Ok(value),
            Some(Err(path)) => Err(invalid_field(path, detail)),
            None => Err(ProvisioningError::MissingProvisioningData {
                payload: detail.clone(),
            }),
        },
    }
}

fn invalid_field(path: &FieldPath, payload: &Value) -> ProvisioningError {
    ProvisioningError::InvalidField {
        field: path.to_string(),
        payload: payload.clone(),
    }
}

fn diagnostics(detail: &Value) -> SimcardDiagnostics {
    let text = |field: &str| {
        FieldPath::parse(&format!("data.simcard_details.{field}"))
            .get(detail)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    SimcardDiagnostics {
        qr_code_image: text("qr_code_image"),
        smdp_address: text("smdp_address"),
        matching_id: text("matching_id"),
        ios_universal_installation_link: text("ios_universal_installation_link"),
    }
}

/// Builder for ProvisioningService.
///
/// # Example
///
/// ```rust,ignore
/// use esim_gateway::ProvisioningService;
/// use std::time::Duration;
///
/// let service = ProvisioningService::builder(provider)
///     .max_attempts(15)
///     .poll_interval(Duration::from_secs(1))
///     .on_stage(|stage| println!("stage: {stage}"))
///     .build();
/// ```
pub struct ProvisioningServiceBuilder<P: Provider> {
    provider: P,
    config_builder: ProvisioningServiceConfigBuilder,
    qr_encoder: Option<Arc<dyn QrEncoder>>,
    on_stage: Option<OnStageCallback>,
}

impl<P: Provider> ProvisioningServiceBuilder<P> {
    /// Create a new builder with the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config_builder: ProvisioningServiceConfigBuilder::default(),
            qr_encoder: default_qr_encoder(),
            on_stage: None,
        }
    }

    /// Set the number of status checks per activation transaction.
    ///
    /// Default: 10
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config_builder = self.config_builder.max_attempts(max_attempts);
        self
    }

    /// Set the pause between two status checks.
    ///
    /// Default: 2 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config_builder = self.config_builder.poll_interval(interval);
        self
    }

    /// Set the full configuration.
    pub fn config(mut self, config: ProvisioningServiceConfig) -> Self {
        self.config_builder = ProvisioningServiceConfigBuilder {
            poll_policy: config.poll_policy,
            license_cli_fields: config.license_cli_fields,
            iccid_fields: config.iccid_fields,
            provisioning_fields: config.provisioning_fields,
            with_products: config.with_products,
        };
        self
    }

    /// Set the QR encoder.
    pub fn qr_encoder(mut self, encoder: impl QrEncoder + 'static) -> Self {
        self.qr_encoder = Some(Arc::new(encoder));
        self
    }

    /// Set the stage callback.
    pub fn on_stage<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProvisioningStage) + Send + Sync + 'static,
    {
        self.on_stage = Some(Arc::new(callback));
        self
    }

    /// Build the ProvisioningService.
    pub fn build(self) -> ProvisioningService<P> {
        ProvisioningService {
            provider: self.provider,
            config: self.config_builder.build(),
            qr_encoder: self.qr_encoder,
            on_stage: self.on_stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::testing::{MockError, MockProvider};
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedEncoder;

    impl QrEncoder for FixedEncoder {
        fn encode(&self, payload: &str) -> Result<EncodedQr, QrError> {
            Ok(EncodedQr {
                png: payload.as_bytes().to_vec(),
            })
        }
    }

    fn request() -> ProvisioningRequest {
        ProvisioningRequest::new("Ada Lovelace", "ada@example.com", "P1")
    }

    fn happy_mock() -> MockProvider {
        MockProvider::new()
            .license(Ok("L1"))
            .status("L1", Ok(json!({ "activation_status": "PENDING" })))
            .status("L1", Ok(json!({ "activation_status": "OK", "license_cli": "CLI1" })))
            .esim(Ok("E1"))
            .status(
                "E1",
                Ok(json!({ "activation_status": "OK", "iccid": "8988000000000001" })),
            )
            .detail(Ok(json!({
                "data": { "simcard_details": {
                    "qr_code": "LPA:1$x$y",
                    "smdp_address": "smdp.example.com",
                    "matching_id": "y"
                } }
            })))
    }

    fn service(mock: &MockProvider) -> ProvisioningService<MockProvider> {
        ProvisioningService::builder(mock.clone())
            .poll_interval(Duration::from_millis(1))
            .qr_encoder(FixedEncoder)
            .build()
    }

    #[tokio::test]
    async fn test_full_workflow() {
        let mock = happy_mock();
        let esim = service(&mock).provision_esim(&request()).await.unwrap();

        assert_eq!(esim.iccid.as_str(), "8988000000000001");
        assert_eq!(esim.license_cli.as_str(), "CLI1");
        assert_eq!(esim.provisioning_string.as_str(), "LPA:1$x$y");
        assert_eq!(esim.diagnostics.smdp_address.as_deref(), Some("smdp.example.com"));
        assert_eq!(esim.diagnostics.qr_code_image, None);

        let sent = mock.last_esim_request().unwrap();
        assert_eq!(sent.license_cli.as_str(), "CLI1");
        assert_eq!(sent.product_id.as_str(), "P1");
        assert_eq!(mock.total_calls(), 6);
    }

    #[tokio::test]
    async fn test_provision_and_encode_uses_provisioning_string() {
        let mock = happy_mock();
        let result = service(&mock).provision_and_encode(&request()).await.unwrap();
        assert_eq!(result.qr.png, b"LPA:1$x$y".to_vec());
        assert_eq!(result.esim.iccid.as_str(), "8988000000000001");
    }

    #[tokio::test]
    async fn test_stage_callback_reports_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mock = happy_mock();
        let service = service(&mock).with_on_stage(move |stage| sink.lock().unwrap().push(stage));

        service.provision_esim(&request()).await.unwrap();

        assert_eq!(seen.lock().unwrap().last(), Some(&ProvisioningStage::Done));
        assert_eq!(seen.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_failure_marks_run_failed_and_stops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mock = MockProvider::new()
            .license(Ok("L1"))
            .status("L1", Ok(json!({ "activation_status": "OK", "license_cli": "CLI1" })))
            .esim(Err(MockError::provider(422, json!({ "message": "unknown product" }))));
        let service = service(&mock).with_on_stage(move |stage| sink.lock().unwrap().push(stage));

        let err = service.provision_esim(&request()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.http_status(), Some(422));
        assert_eq!(mock.calls("get_simcard_detail"), 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ProvisioningStage::LicensePending,
                ProvisioningStage::LicenseReady,
                ProvisioningStage::EsimPending,
                ProvisioningStage::Failed,
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_license_cli() {
        let mock = MockProvider::new()
            .license(Ok("L1"))
            .status("L1", Ok(json!({ "activation_status": "OK" })));

        let err = service(&mock).provision_esim(&request()).await.unwrap_err();

        match err {
            ProvisioningError::MissingField { field, payload } => {
                assert_eq!(field, "license_cli");
                assert_eq!(payload, json!({ "activation_status": "OK" }));
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
        assert_eq!(mock.calls("add_esim"), 0);
    }

    #[tokio::test]
    async fn test_iccid_fallback_and_ambiguity() {
        let fallback = json!({ "activation_status": "OK", "simcard_iccid": 8988000000000002u64 });
        assert_eq!(
            resolve_iccid(&ProvisioningServiceConfig::default().iccid_fields, &fallback).unwrap(),
            "8988000000000002"
        );

        let nested = json!({ "simcard_details": { "iccid": "8988000000000003" } });
        assert_eq!(
            resolve_iccid(&ProvisioningServiceConfig::default().iccid_fields, &nested).unwrap(),
            "8988000000000003"
        );

        let mock = MockProvider::new()
            .license(Ok("L1"))
            .status("L1", Ok(json!({ "activation_status": "OK", "license_cli": "CLI1" })))
            .esim(Ok("E1"))
            .status("E1", Ok(json!({ "activation_status": "OK", "msisdn": "123" })));

        let err = service(&mock).provision_esim(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousProviderResponse);
        assert_eq!(
            err.raw_payload(),
            Some(&json!({ "activation_status": "OK", "msisdn": "123" }))
        );
        assert_eq!(mock.calls("get_simcard_detail"), 0);
    }

    #[test]
    fn test_empty_iccid_is_invalid_not_missing() {
        let payload = json!({ "iccid": "", "simcard_iccid": "8988" });
        match resolve_iccid(&ProvisioningServiceConfig::default().iccid_fields, &payload) {
            Err(ProvisioningError::InvalidField { field, .. }) => assert_eq!(field, "iccid"),
            other => panic!("expected InvalidField, got {other:?}"),
        }

        let payload = json!({ "iccid": null, "simcard_iccid": "8988" });
        match resolve_iccid(&ProvisioningServiceConfig::default().iccid_fields, &payload) {
            Err(ProvisioningError::InvalidField { field, .. }) => assert_eq!(field, "iccid"),
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wide_numeric_iccid_never_reaches_detail() {
        let status: Value =
            serde_json::from_str(r#"{"activation_status": "OK", "iccid": 89882390000012345678}"#)
                .unwrap();
        let mock = MockProvider::new()
            .license(Ok("L1"))
            .status("L1", Ok(json!({ "activation_status": "OK", "license_cli": "CLI1" })))
            .esim(Ok("E1"))
            .status("E1", Ok(status.clone()));

        let err = service(&mock).provision_esim(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
        assert_eq!(err.raw_payload(), Some(&status));
        assert_eq!(mock.calls("get_simcard_detail"), 0);
    }

    #[test]
    fn test_provisioning_string_chain() {
        let chain = ProvisioningServiceConfig::default().provisioning_fields;

        let ios_only = json!({ "data": { "simcard_details": {
            "ios_universal_installation_link": "https://esimsetup.apple.com/x"
        } } });
        assert_eq!(
            resolve_provisioning_string(&chain, &ios_only).unwrap(),
            "https://esimsetup.apple.com/x"
        );

        let neither = json!({ "data": { "simcard_details": { "smdp_address": "s" } } });
        match resolve_provisioning_string(&chain, &neither) {
            Err(ProvisioningError::MissingProvisioningData { payload }) => {
                assert_eq!(payload, neither)
            }
            other => panic!("expected MissingProvisioningData, got {other:?}"),
        }

        let blank = json!({ "data": { "simcard_details": { "qr_code": "  " } } });
        assert!(matches!(
            resolve_provisioning_string(&chain, &blank),
            Err(ProvisioningError::InvalidField { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_run_makes_no_calls() {
        let mock = happy_mock();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service(&mock)
            .provision_esim_cancellable(&request(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_polling() {
        let mock = MockProvider::new().license(Ok("L1"));
        let service = ProvisioningService::builder(mock.clone())
            .poll_interval(Duration::from_secs(60))
            .build();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = service
            .provision_esim_cancellable(&request(), &cancel)
            .await
            .unwrap_err();

        match err {
            ProvisioningError::Cancelled { transaction } => {
                assert_eq!(transaction.map(|t| t.to_string()), Some("L1".to_string()))
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        assert_eq!(mock.calls("get_activation_status"), 1);
    }
}
