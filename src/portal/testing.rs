//! In-memory transport that replays canned portal responses

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{PortalRequest, PortalResponse, Transport, TransportError};

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<PortalResponse, TransportError>>>,
    requests: Mutex<Vec<PortalRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: PortalResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(PortalResponse::new(status, body.to_string()));
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Connection(message.to_string())));
    }

    pub fn requests(&self) -> Vec<PortalRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Request paths without the shared `/edenred-customer/api` prefix
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                r.url
                    .path()
                    .trim_start_matches("/edenred-customer/api")
                    .to_string()
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no canned response".to_string())))
    }
}
