//! End-to-end provisioning against a mocked BNESIM API.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use esim_gateway::bnesim::{BnesimClient, BnesimProvider};
use esim_gateway::{
    ErrorKind, EsimRetryableProvider, Provider, ProvisioningError, ProvisioningRequest,
    ProvisioningService, ProvisioningServiceTrait, RetryConfig,
};
use serde_json::{Value, json};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN: &str = "/v2.0/login";
const CREATE_LICENSE: &str = "/v2.0/enterprise/license/activation";
const ADD_ESIM: &str = "/v2.0/enterprise/simcard/add-esim";
const GET_STATUS: &str = "/v2.0/enterprise/activation-transaction/get-status";
const GET_DETAIL: &str = "/v2.0/enterprise/simcard/get-detail";
const GET_PRODUCTS: &str = "/v2.0/enterprise/products/get-products";

fn jwt_expiring_in(secs: u64) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + secs;
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": "operator", "exp": exp }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{claims}.c2lnbmF0dXJl")
}

async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_json(server: &MockServer, route: &str, body_part: &str, response: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_string_contains(body_part))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(times)
        .mount(server)
        .await;
}

/// Status responses served in order, one per call.
async fn mount_status_sequence(server: &MockServer, transaction: &str, statuses: &[Value]) {
    for (i, status) in statuses.iter().enumerate() {
        Mock::given(method("POST"))
            .and(path(GET_STATUS))
            .and(body_string_contains(format!("activationTransaction={transaction}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(status.clone()))
            .up_to_n_times(1)
            .with_priority(u8::try_from(i + 1).unwrap())
            .expect(1)
            .mount(server)
            .await;
    }
}

fn provider(server: &MockServer) -> BnesimProvider {
    BnesimProvider::new(BnesimClient::new(server.uri(), "operator-key", "operator-secret").unwrap())
}

fn service(server: &MockServer) -> ProvisioningService<BnesimProvider> {
    ProvisioningService::builder(provider(server))
        .poll_interval(Duration::from_millis(1))
        .build()
}

fn request() -> ProvisioningRequest {
    ProvisioningRequest::new("Ada Lovelace", "ada@example.com", "P1")
}

/// License L1 ready with CLI1 and eSIM transaction E1 started.
async fn mount_license_and_esim(server: &MockServer) {
    mount_json(server, CREATE_LICENSE, "email=ada%40example.com", json!({ "activationTransaction": "L1" }), 1).await;
    mount_status_sequence(
        server,
        "L1",
        &[
            json!({ "activation_status": "PENDING" }),
            json!({ "activation_status": "OK", "license_cli": "CLI1" }),
        ],
    )
    .await;
    mount_json(server, ADD_ESIM, "license_cli=CLI1", json!({ "activationTransaction": "E1" }), 1).await;
}

#[tokio::test]
async fn test_end_to_end_provisioning() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_license_and_esim(&server).await;
    mount_status_sequence(
        &server,
        "E1",
        &[json!({ "activation_status": "OK", "iccid": "8988000000000001" })],
    )
    .await;
    mount_json(
        &server,
        GET_DETAIL,
        "iccid=8988000000000001",
        json!({ "data": { "simcard_details": {
            "qr_code": "LPA:1$x$y",
            "qr_code_image": "https://img.example.com/qr.png",
            "ios_universal_installation_link": "https://esimsetup.apple.com/x"
        } } }),
        1,
    )
    .await;

    let result = service(&server).provision_and_encode(&request()).await.unwrap();

    assert_eq!(result.esim.iccid.as_str(), "8988000000000001");
    assert_eq!(result.esim.license_cli.as_str(), "CLI1");
    assert_eq!(result.esim.provisioning_string.as_str(), "LPA:1$x$y");
    assert_eq!(
        result.esim.diagnostics.qr_code_image.as_deref(),
        Some("https://img.example.com/qr.png")
    );
    assert!(result.qr.to_data_url().starts_with("data:image/png;base64,iVBOR"));
}

#[tokio::test]
async fn test_non_200_halts_the_run() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_json(&server, CREATE_LICENSE, "name=", json!({ "activationTransaction": "L1" }), 1).await;
    Mock::given(method("POST"))
        .and(path(GET_STATUS))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "unknown transaction" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADD_ESIM))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GET_DETAIL))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server).provision_esim(&request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Provider);
    assert_eq!(err.http_status(), Some(404));
    assert_eq!(err.raw_payload(), Some(&json!({ "message": "unknown transaction" })));
}

#[tokio::test]
async fn test_iccid_from_simcard_iccid() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_license_and_esim(&server).await;
    mount_status_sequence(
        &server,
        "E1",
        &[json!({ "activation_status": "OK", "simcard_iccid": "8988000000000009" })],
    )
    .await;
    mount_json(
        &server,
        GET_DETAIL,
        "iccid=8988000000000009",
        json!({ "data": { "simcard_details": { "qr_code": "LPA:1$a$b" } } }),
        1,
    )
    .await;

    let esim = service(&server).provision_esim(&request()).await.unwrap();
    assert_eq!(esim.iccid.as_str(), "8988000000000009");
}

#[tokio::test]
async fn test_missing_iccid_is_ambiguous_with_raw_payload() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_license_and_esim(&server).await;
    let terminal = json!({ "activation_status": "OK", "msisdn": "+447700900000" });
    mount_status_sequence(&server, "E1", std::slice::from_ref(&terminal)).await;
    Mock::given(method("POST"))
        .and(path(GET_DETAIL))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server).provision_esim(&request()).await.unwrap_err();

    match &err {
        ProvisioningError::AmbiguousProviderResponse { candidates, payload } => {
            assert_eq!(candidates, "iccid | simcard_iccid | simcard_details.iccid");
            assert_eq!(payload, &terminal);
        }
        other => panic!("expected AmbiguousProviderResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_provisioning_string() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_license_and_esim(&server).await;
    mount_status_sequence(
        &server,
        "E1",
        &[json!({ "activation_status": "OK", "iccid": "8988000000000001" })],
    )
    .await;
    let detail = json!({ "data": { "simcard_details": { "smdp_address": "smdp.example.com" } } });
    mount_json(&server, GET_DETAIL, "iccid=", detail.clone(), 1).await;

    let err = service(&server).provision_esim(&request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingProvisioningData);
    assert_eq!(err.raw_payload(), Some(&detail));
}

#[tokio::test]
async fn test_poll_timeout_after_max_attempts() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_json(&server, CREATE_LICENSE, "name=", json!({ "activationTransaction": 77 }), 1).await;
    mount_json(
        &server,
        GET_STATUS,
        "activationTransaction=77",
        json!({ "activation_status": "PENDING" }),
        5,
    )
    .await;

    let service = ProvisioningService::builder(provider(&server))
        .max_attempts(5)
        .poll_interval(Duration::from_millis(1))
        .build();

    match service.provision_esim(&request()).await {
        Err(ProvisioningError::PollTimeout {
            transaction,
            attempts,
            ..
        }) => {
            assert_eq!(transaction.as_str(), "77");
            assert_eq!(attempts, 5);
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_activation_is_not_polled_again() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_json(&server, CREATE_LICENSE, "name=", json!({ "activationTransaction": "L1" }), 1).await;
    mount_json(
        &server,
        GET_STATUS,
        "activationTransaction=L1",
        json!({ "activation_status": "FAILED", "error": "quota exceeded" }),
        1,
    )
    .await;

    let err = service(&server).provision_esim(&request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActivationFailed);
    assert_eq!(err.raw_payload().unwrap()["error"], "quota exceeded");
}

#[tokio::test]
async fn test_cached_token_is_shared_across_runs() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    mount_json(&server, GET_PRODUCTS, "area=europe", json!({ "products": [] }), 3).await;

    let provider = provider(&server);
    let cloned = provider.clone();
    provider.get_products(Some("europe")).await.unwrap();
    provider.get_products(Some("europe")).await.unwrap();
    cloned.get_products(Some("europe")).await.unwrap();
}

#[tokio::test]
async fn test_near_expiry_token_is_refreshed_each_time() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(30), 2).await;
    mount_json(&server, GET_PRODUCTS, "", json!({ "products": [] }), 2).await;

    let provider = provider(&server);
    provider.get_products(None).await.unwrap();
    provider.get_products(None).await.unwrap();
}

#[tokio::test]
async fn test_retry_wrapper_recovers_transient_status_error() {
    let server = MockServer::start().await;
    mount_login(&server, &jwt_expiring_in(3600), 1).await;
    Mock::given(method("POST"))
        .and(path(GET_STATUS))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        GET_STATUS,
        "activationTransaction=E1",
        json!({ "activation_status": "OK", "iccid": "8988" }),
        1,
    )
    .await;

    let retry = RetryConfig::default()
        .with_min_delay(Duration::from_millis(1))
        .with_jitter(false);
    let provider = EsimRetryableProvider::with_config(provider(&server), retry);

    let payload = provider
        .get_activation_status(&"E1".into())
        .await
        .unwrap();
    assert_eq!(payload.as_json()["iccid"], "8988");
}
