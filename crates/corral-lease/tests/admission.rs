//! End-to-end admission behavior against the deterministic in-memory store.
//!
//! The clock is simulated so expiry scenarios advance time explicitly instead
//! of sleeping through real TTLs.

use std::sync::Arc;

use corral_core::KeyValueStore;
use corral_core::ReadRequest;
use corral_core::inmemory::DeterministicKeyValueStore;
use corral_lease::AcquireDecision;
use corral_lease::DenialReason;
use corral_lease::LeaseConfig;
use corral_lease::LeaseManager;
use corral_lease::LeaseSet;
use corral_lease::pure;
use corral_time::SimulatedTimeProvider;

const SCOPE: &str = "LEASES";

fn simulated_manager(
    max_concurrent: u32,
    lease_ttl_secs: u32,
) -> (
    LeaseManager<DeterministicKeyValueStore, SimulatedTimeProvider>,
    SimulatedTimeProvider,
    Arc<DeterministicKeyValueStore>,
) {
    let store = DeterministicKeyValueStore::new();
    let clock = SimulatedTimeProvider::new(1_000_000);
    let config = LeaseConfig::new(max_concurrent, lease_ttl_secs).unwrap();
    let manager = LeaseManager::with_time(Arc::clone(&store), config, clock.clone());
    (manager, clock, store)
}

fn grant(decision: AcquireDecision) -> (String, u64) {
    match decision {
        AcquireDecision::Granted { lease_id, expires_at_ms } => (lease_id, expires_at_ms),
        other => panic!("expected grant, got {other:?}"),
    }
}

async fn stored_set(store: &DeterministicKeyValueStore) -> Option<LeaseSet> {
    let result = store
        .read(ReadRequest::new(pure::lease_set_key(SCOPE)))
        .await
        .unwrap();
    result.kv.map(|kv| serde_json::from_str(&kv.value).unwrap())
}

#[tokio::test]
async fn third_caller_waits_until_a_slot_frees() {
    let (manager, _clock, _store) = simulated_manager(2, 10);

    let (id_a, _) = grant(manager.try_acquire(SCOPE, Some("a")).await.unwrap());
    grant(manager.try_acquire(SCOPE, Some("b")).await.unwrap());

    // Pool is full: the third caller is told to wait, not errored.
    let denied = manager.try_acquire(SCOPE, Some("c")).await.unwrap();
    assert_eq!(
        denied,
        AcquireDecision::Denied {
            reason: DenialReason::AtCapacity
        }
    );

    manager.release(SCOPE, &id_a).await.unwrap();

    // Retrying after the release succeeds.
    let (id_c, _) = grant(manager.try_acquire(SCOPE, Some("c")).await.unwrap());
    assert_eq!(id_c, "c");

    let (live, max) = manager.status(SCOPE).await.unwrap();
    assert_eq!((live, max), (2, 2));
}

#[tokio::test]
async fn expired_leases_free_capacity_without_a_reaper() {
    let (manager, clock, _store) = simulated_manager(1, 10);

    grant(manager.try_acquire(SCOPE, Some("crashed-caller")).await.unwrap());

    // While the grant is live the pool stays full.
    clock.advance_secs(9);
    assert!(matches!(
        manager.try_acquire(SCOPE, Some("next")).await.unwrap(),
        AcquireDecision::Denied {
            reason: DenialReason::AtCapacity
        }
    ));

    // Past the TTL the dead entry no longer counts and a new caller gets in,
    // even though the holder never released.
    clock.advance_secs(2);
    let (id, _) = grant(manager.try_acquire(SCOPE, Some("next")).await.unwrap());
    assert_eq!(id, "next");

    let (live, _) = manager.status(SCOPE).await.unwrap();
    assert_eq!(live, 1);
}

#[tokio::test]
async fn grant_physically_prunes_expired_entries() {
    let (manager, clock, store) = simulated_manager(4, 10);

    grant(manager.try_acquire(SCOPE, Some("old-1")).await.unwrap());
    grant(manager.try_acquire(SCOPE, Some("old-2")).await.unwrap());
    clock.advance_secs(11);

    grant(manager.try_acquire(SCOPE, Some("fresh")).await.unwrap());

    // The winning write rewrote the record without the dead entries.
    let set = stored_set(&store).await.unwrap();
    assert_eq!(set.holders.len(), 1);
    assert!(set.holders.contains_key("fresh"));
}

#[tokio::test]
async fn expiry_boundary_is_exclusive() {
    let (manager, clock, _store) = simulated_manager(1, 10);

    let (_, expires_at_ms) = grant(manager.try_acquire(SCOPE, Some("a")).await.unwrap());

    // At exactly expires_at_ms the lease is dead and the slot reusable.
    clock.set_ms(expires_at_ms);
    grant(manager.try_acquire(SCOPE, Some("b")).await.unwrap());
}

#[tokio::test]
async fn release_is_idempotent() {
    let (manager, _clock, store) = simulated_manager(2, 10);

    let (id, _) = grant(manager.try_acquire(SCOPE, None).await.unwrap());
    manager.release(SCOPE, &id).await.unwrap();

    let version_after_first = stored_set(&store).await.unwrap().version;

    // Second release of the same id succeeds and writes nothing.
    manager.release(SCOPE, &id).await.unwrap();
    assert_eq!(stored_set(&store).await.unwrap().version, version_after_first);
}

#[tokio::test]
async fn release_of_expired_lease_succeeds_and_prunes() {
    let (manager, clock, store) = simulated_manager(2, 10);

    let (id, _) = grant(manager.try_acquire(SCOPE, Some("a")).await.unwrap());
    clock.advance_secs(11);

    // The entry is expired but still physically present; release still
    // succeeds and drops it from the record.
    manager.release(SCOPE, &id).await.unwrap();
    assert!(stored_set(&store).await.unwrap().holders.is_empty());
}

#[tokio::test]
async fn duplicate_acquire_returns_surviving_expiry() {
    let (manager, clock, _store) = simulated_manager(4, 10);

    let (_, first_expiry) = grant(manager.try_acquire(SCOPE, Some("branch-7")).await.unwrap());
    clock.advance_secs(3);

    match manager.try_acquire(SCOPE, Some("branch-7")).await.unwrap() {
        AcquireDecision::Denied {
            reason: DenialReason::DuplicateLease { lease_id, expires_at_ms },
        } => {
            assert_eq!(lease_id, "branch-7");
            // The original expiry survives; the retry does not extend it.
            assert_eq!(expires_at_ms, first_expiry);
        }
        other => panic!("expected duplicate denial, got {other:?}"),
    }

    let (live, _) = manager.status(SCOPE).await.unwrap();
    assert_eq!(live, 1);
}

#[tokio::test]
async fn duplicate_id_reusable_after_expiry() {
    let (manager, clock, _store) = simulated_manager(4, 10);

    let (_, first_expiry) = grant(manager.try_acquire(SCOPE, Some("branch-7")).await.unwrap());
    clock.advance_secs(11);

    // The old grant is dead, so the same id acquires fresh.
    let (id, new_expiry) = grant(manager.try_acquire(SCOPE, Some("branch-7")).await.unwrap());
    assert_eq!(id, "branch-7");
    assert!(new_expiry > first_expiry);
}

#[tokio::test]
async fn version_increases_monotonically_across_writes() {
    let (manager, _clock, store) = simulated_manager(4, 10);

    let (id_a, _) = grant(manager.try_acquire(SCOPE, Some("a")).await.unwrap());
    assert_eq!(stored_set(&store).await.unwrap().version, 1);

    grant(manager.try_acquire(SCOPE, Some("b")).await.unwrap());
    assert_eq!(stored_set(&store).await.unwrap().version, 2);

    manager.release(SCOPE, &id_a).await.unwrap();
    assert_eq!(stored_set(&store).await.unwrap().version, 3);
}

#[tokio::test]
async fn holders_reports_only_live_entries() {
    let (manager, clock, _store) = simulated_manager(4, 10);

    grant(manager.try_acquire(SCOPE, Some("old")).await.unwrap());
    clock.advance_secs(11);
    grant(manager.try_acquire(SCOPE, Some("new")).await.unwrap());

    let rows = manager.holders(SCOPE).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].lease_id, "new");
}

#[tokio::test]
async fn concurrent_burst_grants_exactly_capacity() {
    use tokio::task::JoinSet;

    let store = DeterministicKeyValueStore::new();
    let config = LeaseConfig::new(4, 60).unwrap();
    let manager = Arc::new(LeaseManager::new(store, config));

    let mut tasks = JoinSet::new();
    for i in 0..16 {
        let mgr = Arc::clone(&manager);
        tasks.spawn(async move {
            let id = format!("worker-{i}");
            mgr.try_acquire(SCOPE, Some(&id)).await
        });
    }

    let mut grants = Vec::new();
    while let Some(result) = tasks.join_next().await {
        if let AcquireDecision::Granted { lease_id, .. } = result.unwrap().unwrap() {
            grants.push(lease_id);
        }
    }
    assert_eq!(grants.len(), 4);

    // Releasing all grants drains the pool completely.
    for id in &grants {
        manager.release(SCOPE, id).await.unwrap();
    }
    let (live, _) = manager.status(SCOPE).await.unwrap();
    assert_eq!(live, 0);
}

#[tokio::test]
async fn concurrent_acquire_and_release_stay_within_bounds() {
    use tokio::task::JoinSet;

    let store = DeterministicKeyValueStore::new();
    let config = LeaseConfig::new(2, 60).unwrap();
    let manager = Arc::new(LeaseManager::new(store, config));

    let mut tasks = JoinSet::new();
    for i in 0..12 {
        let mgr = Arc::clone(&manager);
        tasks.spawn(async move {
            let id = format!("cycle-{i}");
            match mgr.try_acquire(SCOPE, Some(&id)).await.unwrap() {
                AcquireDecision::Granted { lease_id, .. } => {
                    mgr.release(SCOPE, &lease_id).await.unwrap();
                    true
                }
                AcquireDecision::Denied { .. } => false,
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    // Every grant was paired with a release, so nothing remains live.
    let (live, _) = manager.status(SCOPE).await.unwrap();
    assert_eq!(live, 0);
}
