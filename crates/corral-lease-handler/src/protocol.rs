//! Wire types for the lease service.

use serde::Deserialize;
use serde::Serialize;

/// A lease operation requested by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LeaseRequest {
    /// Request admission for one unit of work in a scope.
    Acquire {
        /// Capacity pool the work belongs to.
        scope_key: String,
        /// Caller-chosen identity for the unit of work. Supplying one makes
        /// the acquire idempotent across caller-side retries; omitting it
        /// lets the service mint a unique lease id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resource_id: Option<String>,
    },
    /// Return a previously granted lease to its pool.
    Release {
        scope_key: String,
        lease_id: String,
    },
}

/// Outcome of a lease operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeaseResponse {
    /// Admission succeeded; the caller owns a slot until it releases the
    /// lease or `expires_at_ms` passes.
    Granted { lease_id: String, expires_at_ms: u64 },
    /// The pool cannot admit the caller right now; retry later.
    Wait { reason: WaitReason },
    /// The supplied `resource_id` already holds a live lease. Distinct from
    /// `wait`: retrying will not help until the surviving grant ends.
    DuplicateLease { lease_id: String, expires_at_ms: u64 },
    /// Release acknowledged (idempotent: also returned when the lease was
    /// already gone).
    Released { lease_id: String },
}

/// Why an acquire was turned away. Both values mean "not now"; the
/// distinction is informational.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaitReason {
    /// Every slot in the pool is held by a live lease.
    AtCapacity,
    /// Write contention outlasted the retry budget.
    ContentionExhausted,
}
