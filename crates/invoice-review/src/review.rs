//! The whole review workflow for one invoice at a time.

use std::sync::Arc;

use log::debug;
use tracing::{info_span, Instrument};

use crate::api::{HttpBackend, OrderBackend};
use crate::config::Config;
use crate::error::{ApiError, EditError, Result};
use crate::model::{ExtractedRecord, FieldEdit, FieldValue};
use crate::notice::{LogNotifier, Notice, Notifier};
use crate::outcome::{Outcome, Skip};
use crate::persistence::{ConfirmPrompt, PersistenceClient};
use crate::session::EditSession;
use crate::upload::{SelectedFile, UploadController};

/// Where the session stands, derived from its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    Empty,
    FileSelected,
    Extracting,
    Viewing,
    Editing,
}

/// Composes upload, edit mode and persistence behind one state machine.
///
/// `Empty -> FileSelected -> Extracting -> Viewing <-> Editing`; cancel and a
/// successful delete go back to `Empty`, a failed extraction back to
/// `FileSelected`. Extraction is skipped while a record is loaded.
pub struct ReviewSession {
    upload: UploadController,
    edit: EditSession,
    persistence: PersistenceClient,
    backend: Arc<dyn OrderBackend>,
    notifier: Arc<dyn Notifier>,
}

impl ReviewSession {
    pub fn new(backend: Arc<dyn OrderBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            upload: UploadController::new(),
            edit: EditSession::new(),
            persistence: PersistenceClient::new(backend.clone()),
            backend,
            notifier,
        }
    }

    /// HTTP backend and log notices, as configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = HttpBackend::new(&config.api)?;
        let session = Self::new(Arc::new(backend), Arc::new(LogNotifier))
            .with_number_coercion(config.editing.coerce_numbers_on_save);
        Ok(session)
    }

    pub fn with_number_coercion(mut self, enabled: bool) -> Self {
        self.persistence =
            PersistenceClient::new(self.backend.clone()).with_number_coercion(enabled);
        self
    }

    pub fn phase(&self) -> ReviewPhase {
        if self.upload.is_loading() {
            ReviewPhase::Extracting
        } else if self.upload.record().is_some() {
            if self.edit.is_editing() {
                ReviewPhase::Editing
            } else {
                ReviewPhase::Viewing
            }
        } else if self.upload.selected_file().is_some() {
            ReviewPhase::FileSelected
        } else {
            ReviewPhase::Empty
        }
    }

    pub fn record(&self) -> Option<&ExtractedRecord> {
        self.upload.record()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.upload.selected_file()
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_editing()
    }

    pub fn is_loading(&self) -> bool {
        self.upload.is_loading()
    }

    /// Whether the loaded record differs from what was last extracted or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.upload
            .record()
            .is_some_and(|record| self.edit.has_unsaved_changes(record))
    }

    /// Replaces the selection and drops any record along with its edit state.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.upload.select_file(file);
        self.edit.reset();
    }

    pub async fn extract(&mut self) -> Outcome<ApiError> {
        let file_name = self.upload.selected_file().map(|f| f.name().to_string());
        let span = info_span!(
            "review.extract",
            file = file_name.as_deref().unwrap_or_default()
        );
        let outcome = self
            .upload
            .extract(self.backend.as_ref())
            .instrument(span)
            .await;

        let file_name = file_name.unwrap_or_default();
        match &outcome {
            Outcome::Applied => {
                let order_number = self.upload.record().and_then(|r| r.order_number());
                if let Some(record) = self.upload.record() {
                    self.edit.load(record);
                }
                self.notifier.notify(Notice::Extracted {
                    file_name,
                    order_number,
                });
            }
            Outcome::Failed(e) => {
                self.edit.reset();
                self.notifier.notify(Notice::ExtractionFailed {
                    file_name,
                    error: e.message().to_string(),
                });
            }
            Outcome::Skipped(_) => {}
        }
        outcome
    }

    /// Back to `Empty`.
    pub fn cancel(&mut self) {
        self.upload.cancel();
        self.edit.reset();
    }

    pub fn enter_edit(&mut self) -> std::result::Result<(), EditError> {
        if self.upload.record().is_none() {
            return Err(EditError::NoRecord);
        }
        self.edit.enter_edit();
        Ok(())
    }

    /// Applies one field mutation addressed the way a form addresses it.
    ///
    /// `index` selects the line item for the `lineItems` section and is
    /// ignored otherwise.
    pub fn set_field(
        &mut self,
        section: &str,
        key: &str,
        value: impl Into<FieldValue>,
        index: Option<usize>,
    ) -> std::result::Result<&ExtractedRecord, EditError> {
        let edit = FieldEdit::parse(section, key, value, index)?;
        self.apply_edit(&edit)
    }

    pub fn apply_edit(
        &mut self,
        edit: &FieldEdit,
    ) -> std::result::Result<&ExtractedRecord, EditError> {
        let current = self.upload.record().ok_or(EditError::NoRecord)?;
        let next = self.edit.apply(current, edit)?;
        self.upload.replace_record(next);
        self.upload.record().ok_or(EditError::NoRecord)
    }

    /// Stores the current record; leaves edit mode on success.
    pub async fn save(&mut self) -> Outcome<ApiError> {
        let Some(record) = self.upload.record().cloned() else {
            debug!("Save skipped: no record loaded");
            return Outcome::Skipped(Skip::NoRecord);
        };
        let order_id = record.order_id().map(|id| id.to_string());
        let span = info_span!(
            "review.save",
            order_id = order_id.as_deref().unwrap_or_default()
        );
        let outcome = self.persistence.save(&record).instrument(span).await;

        let order_id = order_id.unwrap_or_default();
        match &outcome {
            Outcome::Applied => {
                self.edit.finish_edit(&record);
                self.notifier.notify(Notice::Saved { order_id });
            }
            Outcome::Failed(e) => self.notifier.notify(Notice::SaveFailed {
                order_id,
                error: e.message().to_string(),
            }),
            Outcome::Skipped(_) => {}
        }
        outcome
    }

    /// Deletes the stored order after `prompt` confirms, then returns to
    /// `Empty`. A failed delete changes nothing.
    pub async fn delete(&mut self, prompt: &dyn ConfirmPrompt) -> Outcome<ApiError> {
        let Some(record) = self.upload.record().cloned() else {
            debug!("Delete skipped: no record loaded");
            return Outcome::Skipped(Skip::NoRecord);
        };
        let order_id = record.order_id().map(|id| id.to_string());
        let span = info_span!(
            "review.delete",
            order_id = order_id.as_deref().unwrap_or_default()
        );
        let outcome = self
            .persistence
            .delete(&record, prompt)
            .instrument(span)
            .await;

        let order_id = order_id.unwrap_or_default();
        match &outcome {
            Outcome::Applied => {
                self.cancel();
                self.notifier.notify(Notice::Deleted { order_id });
            }
            Outcome::Failed(e) => self.notifier.notify(Notice::DeleteFailed {
                order_id,
                error: e.message().to_string(),
            }),
            Outcome::Skipped(_) => {}
        }
        outcome
    }
}
