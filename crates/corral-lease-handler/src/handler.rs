//! Dispatch from wire requests onto the lease manager.

use corral_core::KeyValueStore;
use corral_lease::AcquireDecision;
use corral_lease::DenialReason;
use corral_lease::LeaseError;
use corral_lease::LeaseManager;
use corral_time::SystemTimeProvider;
use corral_time::TimeProvider;
use tracing::debug;

use crate::protocol::LeaseRequest;
use crate::protocol::LeaseResponse;
use crate::protocol::WaitReason;

/// Handler mapping [`LeaseRequest`]s to [`LeaseResponse`]s.
///
/// Denials are responses, not errors: a full pool answers `wait`. Only hard
/// faults (store failures, corrupted records) surface as [`LeaseError`], for
/// the embedding server to map onto its transport's failure shape.
pub struct LeaseHandler<S: KeyValueStore + ?Sized, T: TimeProvider = SystemTimeProvider> {
    manager: LeaseManager<S, T>,
}

impl<S: KeyValueStore + ?Sized, T: TimeProvider> LeaseHandler<S, T> {
    /// Wrap a manager as a request handler.
    pub fn new(manager: LeaseManager<S, T>) -> Self {
        Self { manager }
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: LeaseRequest) -> Result<LeaseResponse, LeaseError> {
        match request {
            LeaseRequest::Acquire {
                scope_key,
                resource_id,
            } => {
                let decision = self
                    .manager
                    .try_acquire(&scope_key, resource_id.as_deref())
                    .await?;
                Ok(match decision {
                    AcquireDecision::Granted { lease_id, expires_at_ms } => {
                        LeaseResponse::Granted { lease_id, expires_at_ms }
                    }
                    AcquireDecision::Denied { reason } => match reason {
                        DenialReason::AtCapacity => LeaseResponse::Wait {
                            reason: WaitReason::AtCapacity,
                        },
                        DenialReason::ContentionExhausted => LeaseResponse::Wait {
                            reason: WaitReason::ContentionExhausted,
                        },
                        DenialReason::DuplicateLease { lease_id, expires_at_ms } => {
                            LeaseResponse::DuplicateLease { lease_id, expires_at_ms }
                        }
                    },
                })
            }
            LeaseRequest::Release { scope_key, lease_id } => {
                self.manager.release(&scope_key, &lease_id).await?;
                debug!(scope_key, %lease_id, "release acknowledged");
                Ok(LeaseResponse::Released { lease_id })
            }
        }
    }

    /// Dispatch a JSON-encoded request and JSON-encode the response.
    ///
    /// Malformed request bodies are a caller fault and map to
    /// [`LeaseError::InvalidRequest`] rather than panicking the transport.
    pub async fn handle_json(&self, body: &str) -> Result<String, LeaseError> {
        let request: LeaseRequest =
            serde_json::from_str(body).map_err(|e| LeaseError::InvalidRequest {
                reason: e.to_string(),
            })?;
        let response = self.handle(request).await?;
        Ok(serde_json::to_string(&response)?)
    }
}
