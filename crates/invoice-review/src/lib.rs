pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod notice;
pub mod outcome;
pub mod persistence;
pub mod review;
pub mod session;
pub mod telemetry;
pub mod upload;

pub use api::{HttpBackend, OrderBackend};
pub use config::{load_config, Config};
pub use error::{ApiError, ConfigError, EditError, Result, ReviewError};
pub use model::{ExtractedRecord, FieldEdit, FieldValue, LineItem, LineItemField, OrderId, Section};
pub use notice::{LogNotifier, NoopNotifier, Notice, Notifier};
pub use outcome::{Outcome, Skip};
pub use persistence::{ConfirmPrompt, PersistenceClient, DELETE_CONFIRMATION};
pub use review::{ReviewPhase, ReviewSession};
pub use session::EditSession;
pub use telemetry::init_logging;
pub use upload::{SelectedFile, UploadController};
