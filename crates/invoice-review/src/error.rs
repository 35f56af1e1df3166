use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Failed to read upload '{path}': {source}")]
    ReadUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failures talking to the extraction or order endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// A response arrived but its body was not the expected envelope.
    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The server answered with a non-success status.
    #[error("{endpoint} rejected the request ({http_status}): {message}")]
    Rejected {
        endpoint: String,
        http_status: u16,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Server-provided (or transport) message, without the endpoint prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport { message, .. }
            | ApiError::Decode { message, .. }
            | ApiError::Rejected { message, .. } => message,
            ApiError::Client(message) => message,
        }
    }
}

/// Reasons a field mutation was refused. The record is never touched when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No record is loaded")]
    NoRecord,

    #[error("Record is read-only; enter edit mode first")]
    NotEditing,

    #[error("Unknown section '{0}'")]
    UnknownSection(String),

    #[error("Header has no field '{0}'")]
    UnknownHeaderKey(String),

    #[error("Line items have no field '{0}'")]
    UnknownLineItemField(String),

    #[error("A line item index is required")]
    MissingIndex,

    #[error("Line item {index} does not exist (record has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ReviewError>;
