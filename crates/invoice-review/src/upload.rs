//! Selected-file state and the extraction request.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::api::OrderBackend;
use crate::error::{ApiError, ReviewError};
use crate::model::ExtractedRecord;
use crate::outcome::{Outcome, Skip};

/// Fallback when the file name gives no hint.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file chosen for extraction. Cloning shares the bytes.
#[derive(Clone)]
pub struct SelectedFile {
    name: String,
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl SelectedFile {
    /// Wraps in-memory bytes; the MIME type is guessed from `name`.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let bytes: Vec<u8> = bytes.into();
        let mime_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Self {
            name,
            bytes: Arc::from(bytes),
            mime_type,
        }
    }

    /// Reads a file from disk.
    pub async fn from_path(path: &Path) -> Result<Self, ReviewError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ReviewError::ReadUpload {
                path: path.to_path_buf(),
                source: e,
            })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let file = Self::new(name, bytes);
        if !file.is_image() {
            warn!(
                "'{}' does not look like an image ({}); the extraction service may reject it",
                file.name, file.mime_type
            );
        }
        Ok(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Clears the loading flag when dropped, so it is reset on every exit path,
/// including a dropped future.
struct LoadingFlag<'a>(&'a mut bool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Holds the selected file and, after a successful extraction, the record.
#[derive(Debug, Default)]
pub struct UploadController {
    selected_file: Option<SelectedFile>,
    is_loading: bool,
    extracted_record: Option<ExtractedRecord>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn record(&self) -> Option<&ExtractedRecord> {
        self.extracted_record.as_ref()
    }

    /// Replaces the selection. Any extracted record is discarded.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!("Selected '{}' ({} bytes)", file.name(), file.len());
        self.selected_file = Some(file);
        self.extracted_record = None;
    }

    /// Sends the selected file to the extraction service. Only runs while no
    /// record is loaded; every upload creates an order on the backend.
    ///
    /// On success the returned record replaces the current one. On failure no
    /// record is kept and the selected file stays, so the user can retry.
    pub async fn extract(&mut self, backend: &dyn OrderBackend) -> Outcome<ApiError> {
        let Some(file) = self.selected_file.clone() else {
            debug!("Extraction skipped: no file selected");
            return Outcome::Skipped(Skip::NoFileSelected);
        };
        if self.is_loading {
            debug!("Extraction skipped: already in progress");
            return Outcome::Skipped(Skip::InProgress);
        }
        if self.extracted_record.is_some() {
            debug!("Extraction skipped: '{}' is already extracted", file.name());
            return Outcome::Skipped(Skip::RecordLoaded);
        }

        let result = {
            let _loading = LoadingFlag::raise(&mut self.is_loading);
            backend.extract(&file).await
        };

        match result {
            Ok(record) => {
                info!(
                    "Extracted order {} from '{}' ({} line items)",
                    record.order_number().as_deref().unwrap_or("<unnumbered>"),
                    file.name(),
                    record.line_items().len()
                );
                self.extracted_record = Some(record);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Extraction of '{}' failed: {}", file.name(), e);
                self.extracted_record = None;
                Outcome::Failed(e)
            }
        }
    }

    /// Installs an edited snapshot. Ignored when no record is loaded, since a
    /// record only ever comes from an extraction.
    pub(crate) fn replace_record(&mut self, record: ExtractedRecord) {
        if self.extracted_record.is_some() {
            self.extracted_record = Some(record);
        }
    }

    /// Back to the initial empty state.
    pub fn cancel(&mut self) {
        self.selected_file = None;
        self.extracted_record = None;
    }
}
