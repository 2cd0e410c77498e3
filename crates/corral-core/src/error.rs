//! Error types for key-value store operations.

use snafu::Snafu;

/// Errors from a key-value store backend.
///
/// `CompareAndSwapFailed` is a recoverable optimistic-lock rejection, not an
/// infrastructure fault; callers are expected to re-read and retry. All other
/// variants indicate the backend could not serve the request.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum KeyValueStoreError {
    /// Key does not exist in the store.
    #[snafu(display("key '{key}' not found"))]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// Backend could not complete the operation.
    #[snafu(display("operation failed: {reason}"))]
    Failed {
        /// Description of the failure.
        reason: String,
    },

    /// Backend did not respond in time.
    #[snafu(display("operation timed out after {duration_ms}ms"))]
    Timeout {
        /// How long we waited.
        duration_ms: u64,
    },

    /// Conditional write rejected because the stored value changed.
    #[snafu(display("compare-and-swap failed for key '{key}': expected {expected:?}, found {actual:?}"))]
    CompareAndSwapFailed {
        /// The contested key.
        key: String,
        /// Value the writer observed at read time (None = expected absent).
        expected: Option<String>,
        /// Value actually stored at write time.
        actual: Option<String>,
    },

    /// Keys must be non-empty.
    #[snafu(display("key cannot be empty"))]
    EmptyKey,

    /// Key exceeds the fixed size bound.
    #[snafu(display("key size {size} exceeds maximum of {max} bytes"))]
    KeyTooLarge {
        /// Actual key size.
        size: u32,
        /// Allowed maximum.
        max: u32,
    },

    /// Value exceeds the fixed size bound.
    #[snafu(display("value size {size} exceeds maximum of {max} bytes"))]
    ValueTooLarge {
        /// Actual value size.
        size: u32,
        /// Allowed maximum.
        max: u32,
    },
}
