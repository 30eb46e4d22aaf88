//! Error types.
//!
//! The optimizer itself is infallible: it always produces a best-effort
//! order. Errors come from the edges around it (roster ingestion,
//! configuration, working-set edits and the execution boundary).

use thiserror::Error;

/// Roster ingestion errors.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed roster CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("roster line {line}: missing required field '{field}'")]
    MissingField { line: u64, field: &'static str },
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}

/// Errors from edits on a [`Show`](crate::models::Show).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShowError {
    #[error("no entity named '{0}'")]
    UnknownEntity(String),

    #[error("slot {slot} is out of range for {included} included entities")]
    PositionOutOfRange { slot: usize, included: usize },

    #[error("entity '{0}' is not included in the show")]
    NotIncluded(String),

    #[error("minimum gap must be at least 1")]
    InvalidMinGap,
}

/// Execution-boundary faults.
///
/// None of these leave partial results behind: the caller's state is only
/// touched when a response is delivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("optimizer worker has been shut down")]
    Unavailable,

    #[error("optimizer worker crashed: {0}")]
    WorkerCrashed(String),

    #[error("optimization timed out after {0} ms")]
    TimedOut(u64),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Show(#[from] ShowError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type Result<T> = std::result::Result<T, Error>;
