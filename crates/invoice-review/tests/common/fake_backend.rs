//! Scripted stand-in for the extraction and order service.
//!
//! Answers are given as raw `(http_status, body)` pairs and decoded with the
//! same envelope rules the HTTP backend applies, so tests exercise the wire
//! contract without a server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use invoice_review::api::{interpret_ack, interpret_extraction};
use invoice_review::{ApiError, ExtractedRecord, OrderBackend, OrderId, SelectedFile};

/// A request the backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Extract { file_name: String, mime_type: String },
    Update { id: String, body: Value },
    Delete { id: String },
}

#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
}

enum Scripted {
    Http(u16, String),
    Unreachable(String),
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next answer, consumed by whichever request comes first.
    pub fn respond(&self, http_status: u16, body: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Http(http_status, body.into()));
        self
    }

    pub fn respond_success(&self) -> &Self {
        self.respond(200, r#"{"status": "success"}"#)
    }

    pub fn respond_record(&self, record: &ExtractedRecord) -> &Self {
        let body = serde_json::json!({ "status": "success", "data": record });
        self.respond(200, body.to_string())
    }

    /// Queues a transport failure (connection refused, timeout).
    pub fn fail_transport(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Unreachable(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer(&self, endpoint: &str, call: Call) -> Result<(u16, String), ApiError> {
        self.calls.lock().unwrap().push(call);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Http(status, body)) => Ok((status, body)),
            Some(Scripted::Unreachable(message)) => Err(ApiError::Transport {
                endpoint: endpoint.to_string(),
                message,
            }),
            None => panic!("no scripted response left for {}", endpoint),
        }
    }
}

#[async_trait]
impl OrderBackend for FakeBackend {
    async fn extract(&self, file: &SelectedFile) -> Result<ExtractedRecord, ApiError> {
        let endpoint = "POST /api/upload";
        let (status, body) = self.answer(
            endpoint,
            Call::Extract {
                file_name: file.name().to_string(),
                mime_type: file.mime_type().to_string(),
            },
        )?;
        interpret_extraction(endpoint, status, &body)
    }

    async fn update(&self, id: &OrderId, record: &ExtractedRecord) -> Result<(), ApiError> {
        let endpoint = format!("PUT /api/sales_order/{}", id);
        let body = serde_json::to_value(record).expect("record should encode");
        let (status, response) = self.answer(
            &endpoint,
            Call::Update {
                id: id.to_string(),
                body,
            },
        )?;
        interpret_ack(&endpoint, status, &response)
    }

    async fn delete(&self, id: &OrderId) -> Result<(), ApiError> {
        let endpoint = format!("DELETE /api/sales_order/{}", id);
        let (status, response) = self.answer(&endpoint, Call::Delete { id: id.to_string() })?;
        interpret_ack(&endpoint, status, &response)
    }
}
