//! HTTP routes.

use crate::state::AppState;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use esim_gateway::{ErrorKind, ProductId, ProvisioningError, ProvisioningRequest};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

/// Error body shared by every route: `{ ok: false, error, kind? }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    kind: Option<ErrorKind>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            kind: None,
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(error: ProvisioningError) -> Self {
        let report = error.report();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: report.message,
            kind: Some(report.kind),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "ok": false, "error": self.message });
        if let Some(kind) = self.kind {
            body["kind"] = json!(kind);
        }
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/bnesim/login-test", get(login_test))
        .route("/bnesim/products", get(products))
        .route("/create-and-qr", post(create_and_qr))
        .with_state(state)
}

async fn root() -> &'static str {
    "OK"
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Forces a token fetch; the token itself is never echoed.
async fn login_test(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.service.authenticate().await?;
    Ok(Json(json!({ "ok": true, "token": "***" })))
}

#[derive(Debug, Deserialize)]
struct ProductsQuery {
    area: Option<String>,
}

async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Value>, ApiError> {
    let area = query.area.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let products = state.service.list_products(area).await?;
    Ok(Json(json!({ "ok": true, "products": products })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAndQrBody {
    customer_email: Option<String>,
    customer_name: Option<String>,
    product_id: Option<String>,
    plan_code: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateAndQrBody {
    /// Apply defaults and validate. The name falls back to the email.
    fn into_request(self, default_product: Option<&ProductId>) -> Result<ProvisioningRequest, ApiError> {
        let email = non_blank(self.customer_email)
            .ok_or_else(|| ApiError::bad_request("customerEmail is required"))?;
        let name = non_blank(self.customer_name).unwrap_or_else(|| email.clone());
        let product = non_blank(self.product_id)
            .or_else(|| non_blank(self.plan_code))
            .map(ProductId::from)
            .or_else(|| default_product.cloned())
            .ok_or_else(|| ApiError::bad_request("productId is required"))?;

        let request = ProvisioningRequest::new(name, email, product);
        request
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(request)
    }
}

async fn create_and_qr(
    State(state): State<AppState>,
    body: Result<Json<CreateAndQrBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = body.into_request(state.default_product_id.as_ref())?;

    info!(product_id = %request.product_id, "Provisioning request accepted");

    let cancel = state.shutdown.child_token();
    let result = state
        .service
        .provision_and_encode_cancellable(&request, &cancel)
        .await
        .inspect_err(|e| warn!(kind = %e.kind(), error = %e, "Provisioning request failed"))?;

    Ok(Json(json!({
        "ok": true,
        "iccid": result.esim.iccid,
        "lpaString": result.esim.provisioning_string,
        "qrPngBase64": result.qr.to_base64(),
    })))
}
