//! reqwest implementation of [`OrderBackend`].

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};

use super::{interpret_ack, interpret_extraction, OrderBackend, SALES_ORDER_PATH, UPLOAD_PATH};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{ExtractedRecord, OrderId};
use crate::upload::SelectedFile;

/// Multipart field name the extraction endpoint reads the image from.
const UPLOAD_FIELD: &str = "file";

/// HTTP client for the order backend.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::Client(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Client(format!("Base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn order_url(&self, id: &OrderId) -> Result<Url, ApiError> {
        let [api, resource] = SALES_ORDER_PATH;
        self.endpoint_url(&[api, resource, id.as_str()])
    }

    /// Reads status and body of a response.
    async fn read(endpoint: &str, response: Response) -> Result<(u16, String), ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;
        debug!("{} answered {} ({} bytes)", endpoint, status, body.len());
        Ok((status, body))
    }
}

fn transport_error(endpoint: &str, error: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    async fn extract(&self, file: &SelectedFile) -> Result<ExtractedRecord, ApiError> {
        let endpoint = "POST /api/upload";
        let url = self.endpoint_url(&UPLOAD_PATH)?;

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| ApiError::Client(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            "Uploading '{}' ({} bytes, {}) for extraction",
            file.name(),
            file.len(),
            file.mime_type()
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        let (status, body) = Self::read(endpoint, response).await?;
        interpret_extraction(endpoint, status, &body)
    }

    async fn update(&self, id: &OrderId, record: &ExtractedRecord) -> Result<(), ApiError> {
        let endpoint = format!("PUT /api/sales_order/{}", id);
        let url = self.order_url(id)?;

        let response = self
            .client
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        let (status, body) = Self::read(&endpoint, response).await?;
        interpret_ack(&endpoint, status, &body)
    }

    async fn delete(&self, id: &OrderId) -> Result<(), ApiError> {
        let endpoint = format!("DELETE /api/sales_order/{}", id);
        let url = self.order_url(id)?;

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        let (status, body) = Self::read(&endpoint, response).await?;
        interpret_ack(&endpoint, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        HttpBackend::new(&config).expect("should build backend")
    }

    #[test]
    fn test_upload_url() {
        let backend = backend("http://127.0.0.1:5000");
        assert_eq!(
            backend.endpoint_url(&UPLOAD_PATH).unwrap().as_str(),
            "http://127.0.0.1:5000/api/upload"
        );
    }

    #[test]
    fn test_order_url_keeps_base_path() {
        let backend = backend("https://orders.example.com/v2/");
        let id = crate::model::ExtractedRecord::new(
            [(
                crate::model::ORDER_ID_KEY.to_string(),
                crate::model::FieldValue::from(71774_i64),
            )]
            .into_iter()
            .collect(),
            vec![],
            "",
            "",
            "",
        )
        .order_id()
        .unwrap();

        assert_eq!(
            backend.order_url(&id).unwrap().as_str(),
            "https://orders.example.com/v2/api/sales_order/71774"
        );
    }

    #[test]
    fn test_order_id_is_percent_encoded() {
        let backend = backend("http://localhost:5000");
        let record = crate::model::ExtractedRecord::new(
            [(
                crate::model::ORDER_ID_KEY.to_string(),
                crate::model::FieldValue::from("a/b c"),
            )]
            .into_iter()
            .collect(),
            vec![],
            "",
            "",
            "",
        );
        let url = backend.order_url(&record.order_id().unwrap()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/sales_order/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(ApiError::Client(_))
        ));
    }
}
