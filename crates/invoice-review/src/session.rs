//! Edit mode and record mutation.

use log::debug;

use crate::error::EditError;
use crate::model::{ExtractedRecord, FieldEdit};

/// Tracks whether the loaded record may be edited, and the last snapshot known
/// to match the backend.
#[derive(Debug, Default)]
pub struct EditSession {
    editing: bool,
    baseline: Option<ExtractedRecord>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Starts tracking a freshly extracted record, read-only.
    pub fn load(&mut self, record: &ExtractedRecord) {
        self.editing = false;
        self.baseline = Some(record.clone());
    }

    /// Forgets the record; used on cancel, new selection and delete.
    pub fn reset(&mut self) {
        self.editing = false;
        self.baseline = None;
    }

    pub fn enter_edit(&mut self) {
        self.editing = true;
    }

    /// Leaves edit mode after `record` was stored by the backend.
    pub fn finish_edit(&mut self, record: &ExtractedRecord) {
        self.editing = false;
        self.baseline = Some(record.clone());
    }

    /// Applies one edit to `record` and returns the new snapshot.
    ///
    /// Refused outside edit mode. `record` itself is never modified.
    pub fn apply(
        &self,
        record: &ExtractedRecord,
        edit: &FieldEdit,
    ) -> Result<ExtractedRecord, EditError> {
        if !self.editing {
            return Err(EditError::NotEditing);
        }
        let next = record.apply(edit)?;
        debug!("Applied {:?} edit", edit.section());
        Ok(next)
    }

    /// Whether `current` differs from the last extracted or saved snapshot.
    pub fn has_unsaved_changes(&self, current: &ExtractedRecord) -> bool {
        self.baseline.as_ref() != Some(current)
    }
}
