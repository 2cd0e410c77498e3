//! Lease record model and admission decisions.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::pure;

/// Lease set record stored in the key-value store, one per scope.
///
/// Serialized as JSON for human readability and debugging. The record is the
/// unit of atomic coordination: admission and release mutate it only through
/// compare-and-swap, and `version` increases on every committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseSet {
    /// Scope identity (also part of the record's store key).
    pub scope_key: String,
    /// Map of lease id to absolute expiry (Unix milliseconds). Entries past
    /// their expiry are logically dead regardless of physical presence.
    pub holders: BTreeMap<String, u64>,
    /// Optimistic-concurrency token; strictly increases per committed write.
    pub version: u64,
}

impl LeaseSet {
    /// An empty record for a scope seen for the first time.
    pub fn empty(scope_key: impl Into<String>) -> Self {
        Self {
            scope_key: scope_key.into(),
            holders: BTreeMap::new(),
            version: 0,
        }
    }

    /// Number of live holders at `now_ms`.
    pub fn live_count(&self, now_ms: u64) -> u32 {
        pure::count_live(self.holders.values(), now_ms)
    }

    /// Live entries projected as inspection rows, in lease-id order.
    pub fn live_holders(&self, now_ms: u64) -> Vec<LeaseHolder> {
        self.holders
            .iter()
            .filter(|(_, expires_at_ms)| !pure::is_entry_expired(**expires_at_ms, now_ms))
            .map(|(lease_id, expires_at_ms)| LeaseHolder {
                lease_id: lease_id.clone(),
                expires_at_ms: *expires_at_ms,
            })
            .collect()
    }
}

/// One live lease entry, projected for inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseHolder {
    /// Opaque unique lease identifier.
    pub lease_id: String,
    /// Absolute expiry (Unix milliseconds).
    pub expires_at_ms: u64,
}

/// Outcome of a single-shot admission attempt.
///
/// Denials are expected outcomes, not errors: the caller-side loop backs off
/// and retries. Hard faults surface as [`crate::LeaseError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireDecision {
    /// Capacity reserved; the caller now holds a lease until it releases or
    /// the expiry passes.
    Granted {
        /// Identifier to present on release.
        lease_id: String,
        /// Absolute expiry of the grant (Unix milliseconds).
        expires_at_ms: u64,
    },
    /// No lease was written.
    Denied {
        /// Why admission was refused.
        reason: DenialReason,
    },
}

/// Why an admission attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// The pool is full; retry after backoff.
    AtCapacity,
    /// The compare-and-swap retry bound was exhausted under write contention.
    /// Callers treat this exactly like `AtCapacity`: not now.
    ContentionExhausted,
    /// The same lease id is already held and still live. The caller should
    /// reuse the surviving grant or choose a new identifier; no capacity was
    /// consumed.
    DuplicateLease {
        /// The contested identifier.
        lease_id: String,
        /// Expiry of the surviving grant (Unix milliseconds).
        expires_at_ms: u64,
    },
}
