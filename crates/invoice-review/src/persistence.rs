//! Save and delete requests for an extracted record.

use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::api::OrderBackend;
use crate::error::ApiError;
use crate::model::ExtractedRecord;
use crate::outcome::{Outcome, Skip};

/// Question put to the user before a delete request is sent.
pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this order? This action cannot be undone.";

/// Asks the user to confirm a destructive action.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Sends whole records to the order backend.
pub struct PersistenceClient {
    backend: Arc<dyn OrderBackend>,
    coerce_numbers: bool,
}

impl PersistenceClient {
    pub fn new(backend: Arc<dyn OrderBackend>) -> Self {
        Self {
            backend,
            coerce_numbers: false,
        }
    }

    /// Send entered amounts as JSON numbers instead of the raw text.
    pub fn with_number_coercion(mut self, enabled: bool) -> Self {
        self.coerce_numbers = enabled;
        self
    }

    /// Replaces the stored order with `record`. Nothing is sent when the record
    /// has no `SalesOrderID`.
    pub async fn save(&self, record: &ExtractedRecord) -> Outcome<ApiError> {
        let Some(id) = record.order_id() else {
            debug!("Save skipped: record has no SalesOrderID");
            return Outcome::Skipped(Skip::MissingOrderId);
        };

        let body = self.outgoing(record);
        match self.backend.update(&id, &body).await {
            Ok(()) => {
                info!("Order {} saved", id);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Failed to save order {}: {}", id, e);
                Outcome::Failed(e)
            }
        }
    }

    /// Deletes the stored order once the user confirmed. Nothing is sent when
    /// the record has no `SalesOrderID` or the prompt is declined.
    pub async fn delete(
        &self,
        record: &ExtractedRecord,
        prompt: &dyn ConfirmPrompt,
    ) -> Outcome<ApiError> {
        let Some(id) = record.order_id() else {
            debug!("Delete skipped: record has no SalesOrderID");
            return Outcome::Skipped(Skip::MissingOrderId);
        };
        if !prompt.confirm(DELETE_CONFIRMATION) {
            debug!("Delete of order {} not confirmed", id);
            return Outcome::Skipped(Skip::NotConfirmed);
        }

        match self.backend.delete(&id).await {
            Ok(()) => {
                info!("Order {} deleted", id);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Failed to delete order {}: {}", id, e);
                Outcome::Failed(e)
            }
        }
    }

    fn outgoing<'a>(&self, record: &'a ExtractedRecord) -> Cow<'a, ExtractedRecord> {
        if !self.coerce_numbers {
            return Cow::Borrowed(record);
        }
        let (coerced, unparsed) = record.with_coerced_numbers();
        if !unparsed.is_empty() {
            warn!(
                "Sending unparsable amounts as entered: {}",
                unparsed.join(", ")
            );
        }
        Cow::Owned(coerced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldEdit, FieldValue, Header, LineItem, LineItemField, OrderId};
    use crate::upload::SelectedFile;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        updates: Mutex<Vec<(String, serde_json::Value)>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OrderBackend for RecordingBackend {
        async fn extract(&self, _file: &SelectedFile) -> Result<ExtractedRecord, ApiError> {
            unreachable!("persistence tests never extract")
        }

        async fn update(&self, id: &OrderId, record: &ExtractedRecord) -> Result<(), ApiError> {
            let body = serde_json::to_value(record).expect("record should encode");
            self.updates.lock().unwrap().push((id.to_string(), body));
            Ok(())
        }

        async fn delete(&self, id: &OrderId) -> Result<(), ApiError> {
            self.deletes.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    fn record_with_id(id: Option<&str>) -> ExtractedRecord {
        let mut header = Header::new();
        if let Some(id) = id {
            header.insert("SalesOrderID".to_string(), FieldValue::from(id));
        }
        let mut item = LineItem::new("P1");
        item.set(LineItemField::OrderQty, FieldValue::from(1_i64));
        ExtractedRecord::new(header, vec![item], "", "", "")
    }

    #[tokio::test]
    async fn test_save_without_id_sends_nothing() {
        let backend = Arc::new(RecordingBackend::default());
        let client = PersistenceClient::new(backend.clone());

        let outcome = client.save(&record_with_id(None)).await;

        assert_eq!(outcome.skip_reason(), Some(Skip::MissingOrderId));
        assert!(backend.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let backend = Arc::new(RecordingBackend::default());
        let client = PersistenceClient::new(backend.clone());
        let record = record_with_id(Some("42"));

        let declined = client.delete(&record, &|_: &str| false).await;
        assert_eq!(declined.skip_reason(), Some(Skip::NotConfirmed));
        assert!(backend.deletes.lock().unwrap().is_empty());

        let asked = Mutex::new(String::new());
        let confirmed = client
            .delete(&record, &|message: &str| {
                *asked.lock().unwrap() = message.to_string();
                true
            })
            .await;
        assert!(confirmed.is_applied());
        assert_eq!(*asked.lock().unwrap(), DELETE_CONFIRMATION);
        assert_eq!(*backend.deletes.lock().unwrap(), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_save_sends_entered_text_by_default() {
        let backend = Arc::new(RecordingBackend::default());
        let client = PersistenceClient::new(backend.clone());
        let record = record_with_id(Some("42"))
            .apply(&FieldEdit::LineItem {
                index: 0,
                field: LineItemField::OrderQty,
                value: FieldValue::from("5"),
            })
            .unwrap();

        assert!(client.save(&record).await.is_applied());

        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates[0].0, "42");
        assert_eq!(
            updates[0].1["SalesOrderDetail"][0]["OrderQty"],
            serde_json::json!("5")
        );
    }

    #[tokio::test]
    async fn test_save_with_coercion_sends_numbers() {
        let backend = Arc::new(RecordingBackend::default());
        let client = PersistenceClient::new(backend.clone()).with_number_coercion(true);
        let record = record_with_id(Some("42"))
            .apply(&FieldEdit::LineItem {
                index: 0,
                field: LineItemField::OrderQty,
                value: FieldValue::from("5"),
            })
            .unwrap();

        assert!(client.save(&record).await.is_applied());

        let updates = backend.updates.lock().unwrap();
        assert_eq!(
            updates[0].1["SalesOrderDetail"][0]["OrderQty"],
            serde_json::json!(5)
        );
    }
}
