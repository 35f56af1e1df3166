//! Wire contract of the extraction and order endpoints.
//!
//! Every endpoint answers with the same envelope:
//! `{"status": "success" | "error", "data"?: ..., "error"?: "...", "message"?: "..."}`.
//! Only `status == "success"` together with a 2xx HTTP status counts as success.

pub mod http;

use async_trait::async_trait;
use log::debug;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{ExtractedRecord, OrderId};
use crate::upload::SelectedFile;

pub use http::HttpBackend;

pub const UPLOAD_PATH: [&str; 2] = ["api", "upload"];
pub const SALES_ORDER_PATH: [&str; 2] = ["api", "sales_order"];

/// Status value that marks a successful envelope.
const STATUS_SUCCESS: &str = "success";

/// Maximum length for server error bodies quoted in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Remote collaborator that extracts, updates and deletes orders.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Submits an image and returns the record the service extracted.
    async fn extract(&self, file: &SelectedFile) -> Result<ExtractedRecord, ApiError>;

    /// Replaces the stored order with `record`.
    async fn update(&self, id: &OrderId, record: &ExtractedRecord) -> Result<(), ApiError>;

    /// Removes the stored order.
    async fn delete(&self, id: &OrderId) -> Result<(), ApiError>;
}

/// Response body shared by all endpoints. Every field may be absent.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<String>,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

/// Truncates a response body so it can be quoted in an error.
pub(crate) fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = trimmed.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        trimmed.to_string()
    }
}

/// Interprets a response as the envelope and returns its payload on success.
///
/// Non-2xx answers and envelopes without `status: "success"` become
/// [`ApiError::Rejected`] carrying the server's error string. A body that is not
/// an envelope at all is [`ApiError::Decode`] for 2xx answers, and a rejection
/// quoting the body otherwise.
pub fn interpret_response<T: DeserializeOwned>(
    endpoint: &str,
    http_status: u16,
    body: &str,
) -> Result<Option<T>, ApiError> {
    let http_ok = (200..300).contains(&http_status);

    let envelope: ApiEnvelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if http_ok => {
            return Err(ApiError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ApiError::Rejected {
                endpoint: endpoint.to_string(),
                http_status,
                message: truncate_body(body),
            })
        }
    };

    if http_ok && envelope.is_success() {
        if let Some(message) = &envelope.message {
            debug!("{}: {}", endpoint, message);
        }
        return Ok(envelope.data);
    }

    let message = envelope
        .error
        .or(envelope.message)
        .unwrap_or_else(|| match envelope.status {
            Some(status) => format!("status '{}'", status),
            None => "no status in response".to_string(),
        });

    Err(ApiError::Rejected {
        endpoint: endpoint.to_string(),
        http_status,
        message,
    })
}

/// Like [`interpret_response`] for endpoints whose success carries no payload.
pub fn interpret_ack(endpoint: &str, http_status: u16, body: &str) -> Result<(), ApiError> {
    interpret_response::<IgnoredAny>(endpoint, http_status, body).map(|_| ())
}

/// Like [`interpret_response`] for the extraction endpoint, where a success
/// without `data` is malformed.
pub fn interpret_extraction(
    endpoint: &str,
    http_status: u16,
    body: &str,
) -> Result<ExtractedRecord, ApiError> {
    interpret_response::<ExtractedRecord>(endpoint, http_status, body)?.ok_or_else(|| {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: "success response without data".to_string(),
        }
    })
}
