//! Store contract for corral's distributed concurrency leases.
//!
//! This crate defines the thin key-value interface the lease algorithms run
//! against: read by key, conditional write (compare-and-swap), delete, and
//! prefix scan. Any backend offering these four operations can host lease
//! state; the crate also ships a deterministic in-memory backend for tests.
//!
//! # Key Components
//!
//! - **Traits**: [`KeyValueStore`]
//! - **Types**: [`WriteCommand`], [`ReadRequest`], [`ScanRequest`], etc.
//! - **Errors**: [`KeyValueStoreError`]
//! - **Constants**: fixed resource bounds in [`constants`]
//! - **Testing**: [`inmemory::DeterministicKeyValueStore`]
//!
//! The adapter performs no retries and holds no policy: conflict handling and
//! reclamation belong to the lease algorithms so they can interleave their own
//! logic between attempts.

pub mod constants;
pub mod error;
pub mod inmemory;
pub mod kv;
pub mod traits;

pub use constants::CAS_RETRY_INITIAL_BACKOFF_MS;
pub use constants::CAS_RETRY_MAX_BACKOFF_MS;
pub use constants::DEFAULT_SCAN_LIMIT;
pub use constants::MAX_CAS_RETRIES;
pub use constants::MAX_KEY_SIZE;
pub use constants::MAX_LEASE_HOLDERS;
pub use constants::MAX_SCAN_RESULTS;
pub use constants::MAX_VALUE_SIZE;
pub use error::KeyValueStoreError;
pub use kv::DeleteRequest;
pub use kv::DeleteResult;
pub use kv::KeyValueWithRevision;
pub use kv::ReadRequest;
pub use kv::ReadResult;
pub use kv::ScanRequest;
pub use kv::ScanResult;
pub use kv::WriteCommand;
pub use kv::WriteRequest;
pub use kv::WriteResult;
pub use kv::validate_write_command;
pub use traits::KeyValueStore;
