//! Deterministic in-memory key-value store for testing.
//!
//! Thread-safe implementation of [`KeyValueStore`] with full compare-and-swap
//! semantics and predictable behavior. Not intended for production use; the
//! lease algorithms are tested against this backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::constants::DEFAULT_SCAN_LIMIT;
use crate::constants::MAX_SCAN_RESULTS;
use crate::error::KeyValueStoreError;
use crate::kv::DeleteRequest;
use crate::kv::DeleteResult;
use crate::kv::KeyValueWithRevision;
use crate::kv::ReadRequest;
use crate::kv::ReadResult;
use crate::kv::ScanRequest;
use crate::kv::ScanResult;
use crate::kv::WriteCommand;
use crate::kv::WriteRequest;
use crate::kv::WriteResult;
use crate::kv::validate_write_command;
use crate::traits::KeyValueStore;

/// Versioned value for tracking revisions.
#[derive(Clone)]
struct VersionedValue {
    value: String,
    version: u64,
    create_revision: u64,
    mod_revision: u64,
}

/// A deterministic in-memory key-value store.
///
/// All mutations go through a single write lock, so a compare-and-swap is
/// atomic with respect to concurrent writers exactly as the trait requires.
pub struct DeterministicKeyValueStore {
    data: RwLock<BTreeMap<String, VersionedValue>>,
    revision: RwLock<u64>,
}

impl Default for DeterministicKeyValueStore {
    fn default() -> Self {
        Self::new_inner()
    }
}

impl DeterministicKeyValueStore {
    /// Create a new deterministic store wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::new_inner())
    }

    fn new_inner() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            revision: RwLock::new(0),
        }
    }

    async fn next_revision(&self) -> u64 {
        let mut rev = self.revision.write().await;
        *rev += 1;
        *rev
    }
}

#[async_trait]
impl KeyValueStore for DeterministicKeyValueStore {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        validate_write_command(&request.command)?;
        let revision = self.next_revision().await;
        let mut data = self.data.write().await;

        match &request.command {
            WriteCommand::Set { key, value } => {
                match data.get_mut(key) {
                    Some(existing) => {
                        existing.value = value.clone();
                        existing.version += 1;
                        existing.mod_revision = revision;
                    }
                    None => {
                        data.insert(key.clone(), VersionedValue {
                            value: value.clone(),
                            version: 1,
                            create_revision: revision,
                            mod_revision: revision,
                        });
                    }
                }
            }
            WriteCommand::Delete { key } => {
                data.remove(key);
            }
            WriteCommand::CompareAndSwap {
                key,
                expected,
                new_value,
            } => {
                let current = data.get(key).map(|v| v.value.clone());
                if current.as_ref() != expected.as_ref() {
                    return Err(KeyValueStoreError::CompareAndSwapFailed {
                        key: key.clone(),
                        expected: expected.clone(),
                        actual: current,
                    });
                }
                match data.get_mut(key) {
                    Some(existing) => {
                        existing.value = new_value.clone();
                        existing.version += 1;
                        existing.mod_revision = revision;
                    }
                    None => {
                        data.insert(key.clone(), VersionedValue {
                            value: new_value.clone(),
                            version: 1,
                            create_revision: revision,
                            mod_revision: revision,
                        });
                    }
                }
            }
        }

        Ok(WriteResult {
            revision: Some(revision),
        })
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        let data = self.data.read().await;
        match data.get(&request.key) {
            Some(versioned) => Ok(ReadResult {
                kv: Some(KeyValueWithRevision {
                    key: request.key,
                    value: versioned.value.clone(),
                    version: versioned.version,
                    create_revision: versioned.create_revision,
                    mod_revision: versioned.mod_revision,
                }),
            }),
            None => Ok(ReadResult { kv: None }),
        }
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        let _revision = self.next_revision().await;
        let mut data = self.data.write().await;
        let deleted = data.remove(&request.key).is_some();
        Ok(DeleteResult {
            key: request.key,
            deleted,
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        let data = self.data.read().await;

        // Caller limits are capped at the fixed scan bound.
        let limit = request.limit.unwrap_or(DEFAULT_SCAN_LIMIT).min(MAX_SCAN_RESULTS) as usize;
        let entries: Vec<_> = data
            .iter()
            .filter(|(k, _)| k.starts_with(&request.prefix))
            .filter(|(k, _)| match &request.continuation_token {
                Some(token) => k.as_str() > token.as_str(),
                None => true,
            })
            .take(limit + 1)
            .map(|(k, v)| KeyValueWithRevision {
                key: k.clone(),
                value: v.value.clone(),
                version: v.version,
                create_revision: v.create_revision,
                mod_revision: v.mod_revision,
            })
            .collect();

        let is_truncated = entries.len() > limit;
        let entries = if is_truncated { entries[..limit].to_vec() } else { entries };
        // The last returned key resumes the scan: keys sort after it.
        let continuation_token = if is_truncated {
            entries.last().map(|e| e.key.clone())
        } else {
            None
        };

        Ok(ScanResult {
            count: entries.len() as u32,
            entries,
            is_truncated,
            continuation_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_read() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("k", "v")).await.unwrap();

        let result = store.read(ReadRequest::new("k")).await.unwrap();
        let kv = result.kv.unwrap();
        assert_eq!(kv.value, "v");
        assert_eq!(kv.version, 1);
    }

    #[tokio::test]
    async fn read_missing_returns_none() {
        let store = DeterministicKeyValueStore::new();
        let result = store.read(ReadRequest::new("missing")).await.unwrap();
        assert!(result.kv.is_none());
    }

    #[tokio::test]
    async fn cas_create_if_absent() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::compare_and_swap("k", None, "v1")).await.unwrap();

        // Second create-if-absent must lose.
        let err = store.write(WriteRequest::compare_and_swap("k", None, "v2")).await.unwrap_err();
        assert!(matches!(err, KeyValueStoreError::CompareAndSwapFailed { .. }));

        let kv = store.read(ReadRequest::new("k")).await.unwrap().kv.unwrap();
        assert_eq!(kv.value, "v1");
    }

    #[tokio::test]
    async fn cas_rejects_stale_expected() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("k", "v1")).await.unwrap();
        store
            .write(WriteRequest::compare_and_swap("k", Some("v1".into()), "v2"))
            .await
            .unwrap();

        let err = store
            .write(WriteRequest::compare_and_swap("k", Some("v1".into()), "v3"))
            .await
            .unwrap_err();
        match err {
            KeyValueStoreError::CompareAndSwapFailed { actual, .. } => {
                assert_eq!(actual, Some("v2".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn cas_bumps_version() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::compare_and_swap("k", None, "v1")).await.unwrap();
        store
            .write(WriteRequest::compare_and_swap("k", Some("v1".into()), "v2"))
            .await
            .unwrap();

        let kv = store.read(ReadRequest::new("k")).await.unwrap().kv.unwrap();
        assert_eq!(kv.version, 2);
        assert!(kv.mod_revision > kv.create_revision);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("k", "v")).await.unwrap();

        let first = store.delete(DeleteRequest::new("k")).await.unwrap();
        assert!(first.deleted);
        let second = store.delete(DeleteRequest::new("k")).await.unwrap();
        assert!(!second.deleted);
    }

    #[tokio::test]
    async fn scan_filters_by_prefix() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("a:1", "1")).await.unwrap();
        store.write(WriteRequest::set("a:2", "2")).await.unwrap();
        store.write(WriteRequest::set("b:1", "3")).await.unwrap();

        let result = store.scan(ScanRequest::new("a:")).await.unwrap();
        assert_eq!(result.count, 2);
        assert!(!result.is_truncated);
        assert!(result.entries.iter().all(|e| e.key.starts_with("a:")));
    }

    #[tokio::test]
    async fn scan_respects_limit() {
        let store = DeterministicKeyValueStore::new();
        for i in 0..5 {
            store.write(WriteRequest::set(format!("k:{i}"), "v")).await.unwrap();
        }

        let result = store
            .scan(ScanRequest {
                prefix: "k:".into(),
                limit: Some(3),
                continuation_token: None,
            })
            .await
            .unwrap();
        assert_eq!(result.count, 3);
        assert!(result.is_truncated);
    }

    #[tokio::test]
    async fn scan_caps_caller_limit_at_fixed_bound() {
        let store = DeterministicKeyValueStore::new();
        for i in 0..(MAX_SCAN_RESULTS + 5) {
            store.write(WriteRequest::set(format!("k:{i:05}"), "v")).await.unwrap();
        }

        let result = store
            .scan(ScanRequest {
                prefix: "k:".into(),
                limit: Some(MAX_SCAN_RESULTS + 100),
                continuation_token: None,
            })
            .await
            .unwrap();
        assert_eq!(result.count, MAX_SCAN_RESULTS);
        assert!(result.is_truncated);
    }

    #[tokio::test]
    async fn scan_resumes_from_continuation_token() {
        let store = DeterministicKeyValueStore::new();
        for i in 0..5 {
            store.write(WriteRequest::set(format!("k:{i}"), "v")).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let result = store
                .scan(ScanRequest {
                    prefix: "k:".into(),
                    limit: Some(2),
                    continuation_token: token,
                })
                .await
                .unwrap();
            seen.extend(result.entries.iter().map(|e| e.key.clone()));
            if !result.is_truncated {
                break;
            }
            // Truncation always hands back a resumable position.
            assert!(result.continuation_token.is_some());
            token = result.continuation_token;
        }

        assert_eq!(seen, vec!["k:0", "k:1", "k:2", "k:3", "k:4"]);
    }
}
