//! Lease admission and release over a key-value store.
//!
//! All coordination state lives in one versioned record per scope. Admission
//! and release read the record, recompute liveness from absolute expiries,
//! and commit their change with a compare-and-swap; a failed swap means
//! another writer committed first, so the loser re-reads and re-decides
//! against the post-write state. Capacity can therefore never be overshot:
//! a stale decision is never applied.

use std::sync::Arc;
use std::time::Duration;

use corral_core::CAS_RETRY_INITIAL_BACKOFF_MS;
use corral_core::CAS_RETRY_MAX_BACKOFF_MS;
use corral_core::KeyValueStore;
use corral_core::KeyValueStoreError;
use corral_core::MAX_CAS_RETRIES;
use corral_core::MAX_LEASE_HOLDERS;
use corral_core::ReadRequest;
use corral_core::WriteCommand;
use corral_core::WriteRequest;
use corral_time::SystemTimeProvider;
use corral_time::TimeProvider;
use tracing::debug;
use tracing::warn;
use uuid::Uuid;

use crate::config::LeaseConfig;
use crate::error::LeaseError;
use crate::pure;
use crate::types::AcquireDecision;
use crate::types::DenialReason;
use crate::types::LeaseHolder;
use crate::types::LeaseSet;

/// Manager for one scope family of concurrency leases.
///
/// Stateless between calls: every operation is a short read/decide/swap
/// round against the store, so any number of manager instances (across
/// processes) coordinate correctly through the same backend.
pub struct LeaseManager<S: KeyValueStore + ?Sized, T: TimeProvider = SystemTimeProvider> {
    store: Arc<S>,
    time: T,
    config: LeaseConfig,
}

impl<S: KeyValueStore + ?Sized> LeaseManager<S, SystemTimeProvider> {
    /// Create a manager using the system clock.
    pub fn new(store: Arc<S>, config: LeaseConfig) -> Self {
        Self::with_time(store, config, SystemTimeProvider)
    }
}

impl<S: KeyValueStore + ?Sized, T: TimeProvider> LeaseManager<S, T> {
    /// Create a manager with an injected time source.
    pub fn with_time(store: Arc<S>, config: LeaseConfig, time: T) -> Self {
        Self { store, time, config }
    }

    /// The pool configuration this manager enforces.
    pub fn config(&self) -> &LeaseConfig {
        &self.config
    }

    /// Attempt to acquire one lease; single-shot decision.
    ///
    /// When `resource_id` is supplied it becomes the lease id, which makes
    /// the call idempotent: retrying after a transient caller-side failure
    /// while the original grant is still live yields
    /// [`DenialReason::DuplicateLease`] with the surviving expiry instead of
    /// a second slot. Without a `resource_id` a fresh unique id is generated.
    ///
    /// Denials write nothing; the wait/backoff cadence between attempts
    /// belongs to the caller.
    pub async fn try_acquire(
        &self,
        scope_key: &str,
        resource_id: Option<&str>,
    ) -> Result<AcquireDecision, LeaseError> {
        let key = pure::lease_set_key(scope_key);
        let lease_id = match resource_id {
            Some(id) => id.to_string(),
            None => format!("lease-{}", Uuid::new_v4()),
        };

        let mut attempt = 0u32;
        let mut backoff_ms = CAS_RETRY_INITIAL_BACKOFF_MS;

        loop {
            let now_ms = self.time.now_unix_ms();
            // A missing record is an empty pool; creation races resolve in
            // the CAS below (expected: None means create-if-absent).
            let (observed, expected) = self.read_set(&key, scope_key).await?;

            if let Some(expires_at_ms) = observed.holders.get(&lease_id) {
                if !pure::is_entry_expired(*expires_at_ms, now_ms) {
                    debug!(scope_key, %lease_id, "duplicate lease id, grant still live");
                    return Ok(AcquireDecision::Denied {
                        reason: DenialReason::DuplicateLease {
                            lease_id,
                            expires_at_ms: *expires_at_ms,
                        },
                    });
                }
            }

            // Reclamation: dead entries are excluded here and dropped from
            // the record we write, so every grant also prunes.
            let mut holders = pure::prune_expired(&observed.holders, now_ms);
            let live = holders.len() as u32;

            if !pure::has_capacity(live, self.config.max_concurrent) {
                debug!(scope_key, live, max_concurrent = self.config.max_concurrent, "lease pool at capacity");
                return Ok(AcquireDecision::Denied {
                    reason: DenialReason::AtCapacity,
                });
            }
            if live >= MAX_LEASE_HOLDERS {
                return Err(LeaseError::TooManyHolders {
                    scope: scope_key.to_string(),
                    count: live,
                    max: MAX_LEASE_HOLDERS,
                });
            }

            let expires_at_ms = pure::compute_expiry(now_ms, self.config.lease_ttl_ms());
            holders.insert(lease_id.clone(), expires_at_ms);
            let next = LeaseSet {
                scope_key: observed.scope_key.clone(),
                holders,
                version: observed.version + 1,
            };
            let new_json = serde_json::to_string(&next)?;

            match self
                .store
                .write(WriteRequest {
                    command: WriteCommand::CompareAndSwap {
                        key: key.clone(),
                        expected,
                        new_value: new_json,
                    },
                })
                .await
            {
                Ok(_) => {
                    debug!(scope_key, %lease_id, expires_at_ms, live = live + 1, "lease granted");
                    return Ok(AcquireDecision::Granted { lease_id, expires_at_ms });
                }
                Err(KeyValueStoreError::CompareAndSwapFailed { .. }) => {
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        warn!(scope_key, attempts = attempt, "lease admission contention exhausted");
                        return Ok(AcquireDecision::Denied {
                            reason: DenialReason::ContentionExhausted,
                        });
                    }
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(CAS_RETRY_MAX_BACKOFF_MS);
                }
                Err(e) => return Err(LeaseError::Storage { source: e }),
            }
        }
    }

    /// Release a lease; idempotent by construction.
    ///
    /// Releasing an id that is absent (already released, or expired and
    /// pruned) succeeds without writing: a caller must never fail solely
    /// because it raced the TTL. Store faults and retry exhaustion are the
    /// only errors.
    pub async fn release(&self, scope_key: &str, lease_id: &str) -> Result<(), LeaseError> {
        let key = pure::lease_set_key(scope_key);

        let mut attempt = 0u32;
        let mut backoff_ms = CAS_RETRY_INITIAL_BACKOFF_MS;

        loop {
            let (observed, expected) = self.read_set(&key, scope_key).await?;
            if !observed.holders.contains_key(lease_id) {
                debug!(scope_key, lease_id, "lease already absent on release");
                return Ok(());
            }

            let now_ms = self.time.now_unix_ms();
            let mut holders = pure::prune_expired(&observed.holders, now_ms);
            holders.remove(lease_id);
            let next = LeaseSet {
                scope_key: observed.scope_key.clone(),
                holders,
                version: observed.version + 1,
            };
            let new_json = serde_json::to_string(&next)?;

            match self
                .store
                .write(WriteRequest {
                    command: WriteCommand::CompareAndSwap {
                        key: key.clone(),
                        expected,
                        new_value: new_json,
                    },
                })
                .await
            {
                Ok(_) => {
                    debug!(scope_key, lease_id, "lease released");
                    return Ok(());
                }
                Err(KeyValueStoreError::CompareAndSwapFailed { .. }) => {
                    attempt += 1;
                    if attempt >= MAX_CAS_RETRIES {
                        return Err(LeaseError::MaxRetriesExceeded {
                            operation: "lease release".to_string(),
                            attempts: attempt,
                        });
                    }
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(CAS_RETRY_MAX_BACKOFF_MS);
                }
                Err(e) => return Err(LeaseError::Storage { source: e }),
            }
        }
    }

    /// Current pool usage: `(live, max_concurrent)`.
    pub async fn status(&self, scope_key: &str) -> Result<(u32, u32), LeaseError> {
        let key = pure::lease_set_key(scope_key);
        let (observed, _) = self.read_set(&key, scope_key).await?;
        let live = observed.live_count(self.time.now_unix_ms());
        Ok((live, self.config.max_concurrent))
    }

    /// Live lease entries projected as inspection rows.
    pub async fn holders(&self, scope_key: &str) -> Result<Vec<LeaseHolder>, LeaseError> {
        let key = pure::lease_set_key(scope_key);
        let (observed, _) = self.read_set(&key, scope_key).await?;
        Ok(observed.live_holders(self.time.now_unix_ms()))
    }

    /// Read a scope's record along with the raw stored string.
    ///
    /// The raw string is what the next compare-and-swap passes as its
    /// expected value, so the conditional write keys off the exact stored
    /// bytes rather than a re-serialization. A missing key maps to an empty
    /// pool with `None` expected (create-if-absent); a key that exists but
    /// holds an unparseable value (including the empty string, which a
    /// create-if-absent CAS could never swap against) is corrupted.
    async fn read_set(
        &self,
        key: &str,
        scope_key: &str,
    ) -> Result<(LeaseSet, Option<String>), LeaseError> {
        match self.store.read(ReadRequest::new(key.to_string())).await {
            Ok(result) => match result.kv {
                Some(kv) => {
                    let set = serde_json::from_str(&kv.value).map_err(|e| {
                        LeaseError::CorruptedData {
                            key: key.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    Ok((set, Some(kv.value)))
                }
                None => Ok((LeaseSet::empty(scope_key), None)),
            },
            Err(KeyValueStoreError::NotFound { .. }) => Ok((LeaseSet::empty(scope_key), None)),
            Err(e) => Err(LeaseError::Storage { source: e }),
        }
    }
}
