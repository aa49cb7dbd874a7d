//! Scripted in-memory provider for unit tests.

use crate::errors::{ErrorKind, ProviderFailure, RetryableError};
use crate::providers::traits::Provider;
use crate::types::{ActivationTransaction, EsimRequest, Iccid, LicenseRequest, StatusPayload};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("mock {kind} failure")]
pub(crate) struct MockError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub retryable: bool,
    pub raw: Option<Value>,
}

impl MockError {
    pub fn provider(status: u16, raw: Value) -> Self {
        Self {
            kind: ErrorKind::Provider,
            status: Some(status),
            retryable: status == 429 || status >= 500,
            raw: Some(raw),
        }
    }

    pub fn transport() -> Self {
        Self {
            kind: ErrorKind::Transport,
            status: None,
            retryable: true,
            raw: None,
        }
    }
}

impl RetryableError for MockError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl ProviderFailure for MockError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn http_status(&self) -> Option<u16> {
        self.status
    }

    fn raw_payload(&self) -> Option<Value> {
        self.raw.clone()
    }
}

type Scripted<T> = VecDeque<Result<T, MockError>>;

#[derive(Default)]
struct MockState {
    licenses: Scripted<ActivationTransaction>,
    esims: Scripted<ActivationTransaction>,
    statuses: HashMap<String, Scripted<Value>>,
    details: Scripted<Value>,
    products: Scripted<Value>,
    calls: Vec<&'static str>,
    last_esim_request: Option<EsimRequest>,
}

/// Provider answering from per-operation queues.
///
/// An exhausted status queue answers `PENDING`; other exhausted queues answer
/// a transport error.
#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn license(self, result: Result<&str, MockError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .licenses
            .push_back(result.map(ActivationTransaction::from));
        self
    }

    pub fn esim(self, result: Result<&str, MockError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .esims
            .push_back(result.map(ActivationTransaction::from));
        self
    }

    pub fn status(self, transaction: &str, result: Result<Value, MockError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .entry(transaction.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn detail(self, result: Result<Value, MockError>) -> Self {
        self.state.lock().unwrap().details.push_back(result);
        self
    }

    pub fn products(self, result: Result<Value, MockError>) -> Self {
        self.state.lock().unwrap().products.push_back(result);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn last_esim_request(&self) -> Option<EsimRequest> {
        self.state.lock().unwrap().last_esim_request.clone()
    }

    fn record(&self, operation: &'static str) {
        self.state.lock().unwrap().calls.push(operation);
    }
}

fn next<T>(queue: &mut Scripted<T>) -> Result<T, MockError> {
    queue.pop_front().unwrap_or_else(|| Err(MockError::transport()))
}

impl Provider for MockProvider {
    type Error = MockError;

    async fn authenticate(&self) -> Result<(), MockError> {
        self.record("authenticate");
        Ok(())
    }

    async fn create_license(
        &self,
        _request: &LicenseRequest,
    ) -> Result<ActivationTransaction, MockError> {
        self.record("create_license");
        next(&mut self.state.lock().unwrap().licenses)
    }

    async fn add_esim(&self, request: &EsimRequest) -> Result<ActivationTransaction, MockError> {
        self.record("add_esim");
        let mut state = self.state.lock().unwrap();
        state.last_esim_request = Some(request.clone());
        next(&mut state.esims)
    }

    async fn get_activation_status(
        &self,
        transaction: &ActivationTransaction,
    ) -> Result<StatusPayload, MockError> {
        self.record("get_activation_status");
        let mut state = self.state.lock().unwrap();
        let queue = state.statuses.entry(transaction.to_string()).or_default();
        queue
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "activation_status": "PENDING" })))
            .map(StatusPayload::new)
    }

    async fn get_simcard_detail(
        &self,
        _iccid: &Iccid,
        _with_products: bool,
    ) -> Result<Value, MockError> {
        self.record("get_simcard_detail");
        next(&mut self.state.lock().unwrap().details)
    }

    async fn get_products(&self, _area: Option<&str>) -> Result<Value, MockError> {
        self.record("get_products");
        next(&mut self.state.lock().unwrap().products)
    }
}
