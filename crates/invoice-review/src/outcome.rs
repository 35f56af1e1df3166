use std::fmt;

/// Why an operation was not attempted. No request was sent and no state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoFileSelected,
    InProgress,
    RecordLoaded,
    NoRecord,
    MissingOrderId,
    NotConfirmed,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Skip::NoFileSelected => "no file selected",
            Skip::InProgress => "a request is already in progress",
            Skip::RecordLoaded => "a record is already loaded; cancel or select a new file first",
            Skip::NoRecord => "no record loaded",
            Skip::MissingOrderId => "record has no SalesOrderID",
            Skip::NotConfirmed => "not confirmed",
        };
        f.write_str(reason)
    }
}

/// Result of a network-backed operation.
///
/// Failures are reported, not propagated: the session is already back in its
/// pre-call state when `Failed` is returned.
#[must_use]
#[derive(Debug)]
pub enum Outcome<E> {
    Applied,
    Skipped(Skip),
    Failed(E),
}

impl<E> Outcome<E> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn skip_reason(&self) -> Option<Skip> {
        match self {
            Outcome::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
