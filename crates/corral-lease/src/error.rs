//! Error types for lease operations.

use corral_core::KeyValueStoreError;
use snafu::Snafu;

/// Hard faults from lease operations.
///
/// Expected admission outcomes (pool full, contention, duplicate id) are not
/// errors; they come back inside [`crate::AcquireDecision`]. Everything here
/// means the operation could not be decided and the caller should treat the
/// store as unavailable.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LeaseError {
    /// Underlying storage error.
    #[snafu(display("storage error: {source}"))]
    Storage {
        /// The underlying error.
        source: KeyValueStoreError,
    },

    /// JSON serialization/deserialization error.
    #[snafu(display("serialization error: {source}"))]
    Serialization {
        /// The underlying error.
        source: serde_json::Error,
    },

    /// Data in storage is corrupted or unparseable.
    #[snafu(display("corrupted lease record in key '{key}': {reason}"))]
    CorruptedData {
        /// The key with corrupted data.
        key: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Maximum retries exceeded.
    #[snafu(display("max retries exceeded for {operation}: {attempts} attempts"))]
    MaxRetriesExceeded {
        /// Description of the operation.
        operation: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Too many physical entries in one lease set record.
    #[snafu(display("too many holders in scope '{scope}': {count} (max: {max})"))]
    TooManyHolders {
        /// Scope key.
        scope: String,
        /// Current physical entry count.
        count: u32,
        /// Maximum allowed entries.
        max: u32,
    },

    /// Invalid lease configuration.
    #[snafu(display("invalid lease config: {reason}"))]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// Malformed request from a caller.
    #[snafu(display("invalid request: {reason}"))]
    InvalidRequest {
        /// What was wrong with the request.
        reason: String,
    },
}

impl From<KeyValueStoreError> for LeaseError {
    fn from(source: KeyValueStoreError) -> Self {
        LeaseError::Storage { source }
    }
}

impl From<serde_json::Error> for LeaseError {
    fn from(source: serde_json::Error) -> Self {
        LeaseError::Serialization { source }
    }
}
