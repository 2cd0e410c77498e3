//! Lease request handler for corral.
//!
//! This crate defines the external wire contract for the lease service and a
//! handler that dispatches it onto a [`LeaseManager`](corral_lease::LeaseManager).
//!
//! Handles lease operations:
//! - Acquire: admit one unit of work, or tell the caller to wait
//! - Release: return a slot to the pool (idempotent)
//!
//! Requests are tagged by `action`, responses by `status`, so the same JSON
//! shapes work for any transport the embedding server speaks.

mod handler;
mod protocol;

pub use handler::LeaseHandler;
pub use protocol::LeaseRequest;
pub use protocol::LeaseResponse;
pub use protocol::WaitReason;
