// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Registry client abstraction.
//!
//! The distributed key-value registry backing the whole cluster is an
//! external collaborator; this module defines the narrow interface the
//! schema engine consumes: point read, prefix read, single put/delete, and
//! an atomic multi-operation commit.
//!
//! # Integration
//!
//! To back the engine with a real registry (etcd or similar), implement the
//! `RegistryClient` trait:
//!
//! ```ignore
//! #[async_trait]
//! impl RegistryClient for EtcdRegistry {
//!     async fn commit(&self, ops: Vec<RegistryOp>) -> Result<(), RegistryError> {
//!         // Map to a single etcd transaction...
//!     }
//!     // ...
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SchemaDocument
// ---------------------------------------------------------------------------

/// An API-contract document declared by a microservice.
///
/// `content` is the raw contract text; `summary` is a short digest of the
/// content used for cheap identity checks. Either field may be empty
/// depending on which store projection produced the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema id, unique within the owning service.
    pub schema_id: String,
    /// Raw contract text.
    pub content: String,
    /// Digest of `content`, supplied by the caller.
    pub summary: String,
}

impl SchemaDocument {
    /// Convenience constructor used throughout the tests.
    pub fn new(schema_id: &str, content: &str, summary: &str) -> Self {
        Self {
            schema_id: schema_id.to_string(),
            content: content.to_string(),
            summary: summary.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Faults raised by the registry client or by decoding its values.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry could not be reached or rejected the connection.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The atomic batch was submitted but did not apply.
    #[error("commit failed: {0}")]
    Commit(String),

    /// A stored value could not be decoded.
    #[error("corrupt value under {key}: {reason}")]
    Decode { key: String, reason: String },
}

// ---------------------------------------------------------------------------
// RegistryClient
// ---------------------------------------------------------------------------

/// One operation inside an atomic commit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOp {
    /// Write `value` under `key`.
    Put { key: String, value: Vec<u8> },
    /// Remove `key` if present.
    Delete { key: String },
}

impl RegistryOp {
    /// Key this operation touches.
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Narrow interface over the distributed key-value registry.
///
/// The engine relies on exactly one guarantee beyond plain reads and writes:
/// `commit` applies its whole batch or none of it. Concurrent use from many
/// in-flight requests must be safe; the client is shared process-wide.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Point read. `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError>;

    /// Prefix read, returning `(key, value)` pairs in key order.
    async fn get_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, RegistryError>;

    /// Single-key write.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), RegistryError>;

    /// Single-key delete. Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, RegistryError>;

    /// Atomic multi-operation commit: the batch fully applies or not at all.
    async fn commit(&self, ops: Vec<RegistryOp>) -> Result<(), RegistryError>;
}

// ===========================================================================
// In-memory implementation
// ===========================================================================

/// In-memory `RegistryClient` used in tests and embedded deployments.
///
/// Failure injection: `inject_commit_failure` makes the next `commit` fail
/// without applying anything, `inject_scan_failure` makes the next
/// `get_prefix` fail. Both reset after firing.
pub struct MemoryRegistry {
    kv: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_next_commit: AtomicBool,
    fail_next_scan: AtomicBool,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            kv: Mutex::new(BTreeMap::new()),
            fail_next_commit: AtomicBool::new(false),
            fail_next_scan: AtomicBool::new(false),
        }
    }

    /// Arrange for the next `commit` to fail atomically.
    pub fn inject_commit_failure(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Arrange for the next `get_prefix` to fail.
    pub fn inject_scan_failure(&self) {
        self.fail_next_scan.store(true, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        match self.kv.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryClient for MemoryRegistry {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn get_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, RegistryError> {
        if self.fail_next_scan.swap(false, Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("injected scan failure".into()));
        }
        Ok(self
            .lock()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), RegistryError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RegistryError> {
        Ok(self.lock().remove(key).is_some())
    }

    async fn commit(&self, ops: Vec<RegistryOp>) -> Result<(), RegistryError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(RegistryError::Commit("injected commit failure".into()));
        }
        // Single lock over the whole batch keeps it indivisible.
        let mut kv = self.lock();
        for op in ops {
            match op {
                RegistryOp::Put { key, value } => {
                    kv.insert(key, value);
                }
                RegistryOp::Delete { key } => {
                    kv.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let reg = MemoryRegistry::new();
        reg.put("/a", b"one".to_vec()).await.unwrap();

        assert_eq!(reg.get("/a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(reg.get("/missing").await.unwrap(), None);

        assert!(reg.delete("/a").await.unwrap());
        assert!(!reg.delete("/a").await.unwrap());
        assert_eq!(reg.get("/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prefix_scan_is_ordered_and_bounded() {
        let reg = MemoryRegistry::new();
        reg.put("/x/b", b"2".to_vec()).await.unwrap();
        reg.put("/x/a", b"1".to_vec()).await.unwrap();
        reg.put("/y/a", b"3".to_vec()).await.unwrap();

        let items = reg.get_prefix("/x/").await.unwrap();
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["/x/a", "/x/b"]);
    }

    #[tokio::test]
    async fn commit_applies_whole_batch() {
        let reg = MemoryRegistry::new();
        reg.put("/doomed", b"old".to_vec()).await.unwrap();

        reg.commit(vec![
            RegistryOp::Put {
                key: "/new".into(),
                value: b"v".to_vec(),
            },
            RegistryOp::Delete {
                key: "/doomed".into(),
            },
        ])
        .await
        .unwrap();

        assert_eq!(reg.get("/new").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(reg.get("/doomed").await.unwrap(), None);
    }

    #[tokio::test]
    async fn injected_commit_failure_applies_nothing() {
        let reg = MemoryRegistry::new();
        reg.put("/kept", b"v".to_vec()).await.unwrap();
        reg.inject_commit_failure();

        let err = reg
            .commit(vec![
                RegistryOp::Put {
                    key: "/half".into(),
                    value: b"x".to_vec(),
                },
                RegistryOp::Delete { key: "/kept".into() },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Commit(_)));

        // Nothing from the failed batch landed.
        assert_eq!(reg.get("/half").await.unwrap(), None);
        assert_eq!(reg.get("/kept").await.unwrap(), Some(b"v".to_vec()));

        // The failure only fires once.
        reg.commit(vec![RegistryOp::Put {
            key: "/half".into(),
            value: b"x".to_vec(),
        }])
        .await
        .unwrap();
        assert_eq!(reg.get("/half").await.unwrap(), Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn injected_scan_failure_fires_once() {
        let reg = MemoryRegistry::new();
        reg.inject_scan_failure();
        assert!(reg.get_prefix("/").await.is_err());
        assert!(reg.get_prefix("/").await.is_ok());
    }
}
