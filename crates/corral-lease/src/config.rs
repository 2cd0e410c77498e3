//! Lease pool configuration.

use serde::Deserialize;
use serde::Serialize;

use crate::error::LeaseError;

/// Configuration for one scope's capacity pool.
///
/// Supplied by the embedding application and immutable for the scope's
/// lifetime. Every grant carries a finite TTL: a holder that crashes before
/// releasing is reclaimed once its expiry passes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseConfig {
    /// Maximum number of concurrently live leases.
    pub max_concurrent: u32,
    /// Time-to-live for each grant, in seconds.
    pub lease_ttl_secs: u32,
}

impl LeaseConfig {
    /// Create a validated configuration.
    pub fn new(max_concurrent: u32, lease_ttl_secs: u32) -> Result<Self, LeaseError> {
        if max_concurrent == 0 {
            return Err(LeaseError::InvalidConfig {
                reason: "max_concurrent must be positive".to_string(),
            });
        }
        if lease_ttl_secs == 0 {
            return Err(LeaseError::InvalidConfig {
                reason: "lease_ttl_secs must be positive".to_string(),
            });
        }
        Ok(Self {
            max_concurrent,
            lease_ttl_secs,
        })
    }

    /// TTL in milliseconds, the unit used for stored timestamps.
    pub fn lease_ttl_ms(&self) -> u64 {
        u64::from(self.lease_ttl_secs).saturating_mul(1000)
    }
}
