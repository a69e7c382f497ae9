use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A CIDR line that could not be turned into an address range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRange {
    #[error("'{input}' has no prefix length")]
    MissingPrefix { input: String },
    #[error("'{input}' does not start with a valid IPv4 or IPv6 address")]
    InvalidAddress { input: String },
    #[error("'{input}' has an invalid prefix length")]
    InvalidPrefix { input: String },
}

/// Why a single connection attempt produced no measurement.
///
/// These are expected and frequent; callers treat them as data.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection attempt timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(#[from] io::Error),
}

/// Failure to load one of the static inputs (range lists, location table).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path} contains no usable entries")]
    Empty { path: PathBuf },
}

/// Fewer phase-1 survivors than a meaningful stability test wants.
///
/// A warning value: the run continues with whatever candidates exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("only {found} candidates passed the latency threshold (wanted at least {wanted})")]
pub struct InsufficientCandidates {
    pub found: usize,
    pub wanted: usize,
}
