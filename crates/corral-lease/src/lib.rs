//! Bounded-admission concurrency leases over a shared key-value store.
//!
//! A lease is a time-bounded admission ticket consumed by one unit of
//! concurrent work. Each scope is an independent capacity pool holding at
//! most `max_concurrent` live leases; all of a scope's state lives in one
//! versioned record, mutated only by compare-and-swap, so many stateless
//! callers can throttle themselves through the store with no lock service
//! and no background reaper.
//!
//! # Architecture
//!
//! ```text
//! caller --> LeaseManager::try_acquire --> read record
//!                |                           |
//!                |            prune expired, check capacity
//!                |                           |
//!                |                 compare-and-swap write
//!                |                           |
//!                +-- Granted / Denied <------+
//!
//! caller holds work ... --> LeaseManager::release (idempotent)
//! ```
//!
//! # Key Concepts
//!
//! - **Scope**: an independent capacity pool; leases in different scopes
//!   never contend.
//! - **Optimistic admission**: racing writers serialize through CAS; the
//!   loser re-reads and re-evaluates, so capacity is never overshot.
//! - **Lazy reclamation**: entries past their expiry are dead at decision
//!   time and physically pruned by the next successful write.
//!
//! # Example
//!
//! ```ignore
//! use corral_lease::{LeaseConfig, LeaseManager, AcquireDecision};
//!
//! let config = LeaseConfig::new(8, 300)?;
//! let manager = LeaseManager::new(store, config);
//!
//! match manager.try_acquire("LEASES", Some("branch-42")).await? {
//!     AcquireDecision::Granted { lease_id, .. } => {
//!         // do the work, then:
//!         manager.release("LEASES", &lease_id).await?;
//!     }
//!     AcquireDecision::Denied { .. } => {
//!         // back off and try again later
//!     }
//! }
//! ```

mod config;
mod error;
mod manager;
pub mod pure;
mod types;

pub use config::LeaseConfig;
pub use error::LeaseError;
pub use manager::LeaseManager;
pub use types::AcquireDecision;
pub use types::DenialReason;
pub use types::LeaseHolder;
pub use types::LeaseSet;
