//! Centralized constants for corral.
//!
//! Constants are fixed and immutable, enforced at compile time. Each constant
//! has explicit bounds to prevent unbounded resource allocation.

/// Maximum number of compare-and-swap attempts before an operation gives up.
///
/// Each failed attempt means another writer committed first; the retry
/// re-reads and re-evaluates against the post-write state. Exceeding this
/// bound is surfaced to the caller, never hidden.
pub const MAX_CAS_RETRIES: u32 = 10;

/// Initial backoff between compare-and-swap retries (milliseconds).
pub const CAS_RETRY_INITIAL_BACKOFF_MS: u64 = 10;

/// Maximum backoff between compare-and-swap retries (milliseconds).
pub const CAS_RETRY_MAX_BACKOFF_MS: u64 = 500;

/// Maximum physical entries in a single lease set record.
///
/// Bounds record growth from dead entries in scopes that stop receiving
/// traffic, and caps the serialized record size independently of
/// `max_concurrent`.
pub const MAX_LEASE_HOLDERS: u32 = 1024;

/// Maximum key size in bytes.
pub const MAX_KEY_SIZE: u32 = 1024;

/// Maximum value size in bytes.
pub const MAX_VALUE_SIZE: u32 = 1_000_000;

/// Default number of results returned by a scan when no limit is given.
pub const DEFAULT_SCAN_LIMIT: u32 = 100;

/// Maximum number of results a single scan may return.
pub const MAX_SCAN_RESULTS: u32 = 1000;
