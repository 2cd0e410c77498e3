//! Pure lease decision functions.
//!
//! Deterministic, side-effect-free helpers used by the manager. Time is
//! passed explicitly so behavior is reproducible in tests and property
//! checks; all arithmetic saturates.

use std::collections::BTreeMap;

/// Key prefix for lease set records.
pub const LEASE_PREFIX: &str = "__lease:";

/// Generate the store key for a scope's lease set.
#[inline]
pub fn lease_set_key(scope_key: &str) -> String {
    format!("{}{}", LEASE_PREFIX, scope_key)
}

/// Check whether a holder entry is expired.
///
/// An entry is live only while `expires_at_ms` is strictly in the future;
/// at the boundary it is already dead.
#[inline]
pub fn is_entry_expired(expires_at_ms: u64, now_ms: u64) -> bool {
    expires_at_ms <= now_ms
}

/// Count live entries among `(lease_id, expires_at_ms)` holders.
#[inline]
pub fn count_live<'a, I>(holders: I, now_ms: u64) -> u32
where I: IntoIterator<Item = &'a u64> {
    holders.into_iter().filter(|expires_at_ms| !is_entry_expired(**expires_at_ms, now_ms)).count() as u32
}

/// Return the holders map with expired entries dropped.
///
/// This is the reclamation step: every successful write stores the pruned
/// map, so dead entries disappear as a side effect of normal traffic.
pub fn prune_expired(holders: &BTreeMap<String, u64>, now_ms: u64) -> BTreeMap<String, u64> {
    holders
        .iter()
        .filter(|(_, expires_at_ms)| !is_entry_expired(**expires_at_ms, now_ms))
        .map(|(id, expires_at_ms)| (id.clone(), *expires_at_ms))
        .collect()
}

/// Check whether a pool with `live` holders can admit one more.
#[inline]
pub fn has_capacity(live: u32, max_concurrent: u32) -> bool {
    live < max_concurrent
}

/// Compute the expiry timestamp for a new grant.
#[inline]
pub fn compute_expiry(now_ms: u64, ttl_ms: u64) -> u64 {
    now_ms.saturating_add(ttl_ms)
}
