#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Notify};

use scenewright::client::{Endpoint, Transport};
use scenewright::{Candidate, CandidateType, TransportError};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture");
    serde_json::from_str(&raw).expect("Fixture is not valid JSON")
}

pub fn ack() -> Value {
    json!({ "status": "success" })
}

pub fn failure(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

pub fn block(id: u64, kind: CandidateType) -> Candidate {
    Candidate {
        id,
        text: format!("block {}", id),
        kind,
        relevance: 0.5,
        attributes: Default::default(),
        selected: false,
        user_rating: 0.0,
        user_adopted: None,
    }
}

/// In-memory transport that records every call in order and replays queued
/// responses per endpoint.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<(Endpoint, Value)>>,
    responses: Mutex<HashMap<Endpoint, VecDeque<Result<Value, TransportError>>>>,
    holds: Mutex<HashMap<Endpoint, oneshot::Receiver<()>>>,
    /// Signalled when a held call has been recorded and is waiting.
    pub entered: Notify,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: Endpoint, body: Value) {
        self.push(endpoint, Ok(body));
    }

    pub fn fail(&self, endpoint: Endpoint, err: TransportError) {
        self.push(endpoint, Err(err));
    }

    fn push(&self, endpoint: Endpoint, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(response);
    }

    /// Block the next call to `endpoint` until the returned sender fires.
    pub fn hold(&self, endpoint: Endpoint) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert(endpoint, rx);
        tx
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|(e, _)| e).collect()
    }

    async fn handle(&self, endpoint: Endpoint, body: Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((endpoint, body));

        let hold = self.holds.lock().unwrap().remove(&endpoint);
        if let Some(rx) = hold {
            self.entered.notify_one();
            let _ = rx.await;
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| {
                Err(TransportError::Request(format!(
                    "no mock response queued for {}",
                    endpoint.path()
                )))
            })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, TransportError> {
        self.handle(endpoint, body).await
    }

    async fn post_file(
        &self,
        endpoint: Endpoint,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, TransportError> {
        let body = json!({ "file_name": file_name, "size": bytes.len() });
        self.handle(endpoint, body).await
    }
}
