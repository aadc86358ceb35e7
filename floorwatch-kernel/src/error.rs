//! Error taxonomy for the kernel.
//!
//! Transport, status and payload failures are caught at the ingestion
//! boundary and handed to the caller. A single unparseable field is never an
//! error: it degrades to a missing value inside the record.

/// Failures while turning raw text (JSON or CSV) into records
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Unexpected payload shape: {0}")]
    Shape(String),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while fetching from the remote machines API
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid API url: {0}")]
    Url(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("Malformed payload: {0}")]
    Payload(#[from] IngestError),
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Errors in the static area table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Duplicate area {id} on floor {floor}")]
    DuplicateArea { id: u32, floor: u32 },
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
