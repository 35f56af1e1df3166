use log::{info, warn};

/// Outcome of a network operation, addressed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Extracted {
        file_name: String,
        order_number: Option<String>,
    },
    ExtractionFailed {
        file_name: String,
        error: String,
    },
    Saved {
        order_id: String,
    },
    SaveFailed {
        order_id: String,
        error: String,
    },
    Deleted {
        order_id: String,
    },
    DeleteFailed {
        order_id: String,
        error: String,
    },
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notice::ExtractionFailed { .. }
                | Notice::SaveFailed { .. }
                | Notice::DeleteFailed { .. }
        )
    }

    /// One-line text suitable for a toast or status bar.
    pub fn message(&self) -> String {
        match self {
            Notice::Extracted {
                file_name,
                order_number: Some(number),
            } => format!("Extracted order {} from {}", number, file_name),
            Notice::Extracted { file_name, .. } => format!("Extracted data from {}", file_name),
            Notice::ExtractionFailed { file_name, error } => {
                format!("Could not extract {}: {}", file_name, error)
            }
            Notice::Saved { order_id } => format!("Order {} saved", order_id),
            Notice::SaveFailed { order_id, error } => {
                format!("Could not save order {}: {}", order_id, error)
            }
            Notice::Deleted { order_id } => format!("Order {} deleted", order_id),
            Notice::DeleteFailed { order_id, error } => {
                format!("Could not delete order {}: {}", order_id, error)
            }
        }
    }
}

/// Receives notices; the presentation layer plugs in its own.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            warn!("{}", notice.message());
        } else {
            info!("{}", notice.message());
        }
    }
}

/// No-op notifier for unit tests.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let notice = Notice::Extracted {
            file_name: "invoice1.png".to_string(),
            order_number: Some("SO-42".to_string()),
        };
        assert_eq!(notice.message(), "Extracted order SO-42 from invoice1.png");
        assert!(!notice.is_failure());

        let notice = Notice::SaveFailed {
            order_id: "42".to_string(),
            error: "timeout".to_string(),
        };
        assert_eq!(notice.message(), "Could not save order 42: timeout");
        assert!(notice.is_failure());
    }
}
