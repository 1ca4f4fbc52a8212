// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Translating a reconciliation delta into one atomic registry batch.
//!
//! Invariant: a schema document and its summary always travel together.
//! Every add/update contributes a put pair, every delete a delete pair, and
//! the whole request is a single commit; the two writes for one schema id
//! are never split across top-level commits.

use crate::differ::SchemaDelta;
use crate::error::SchemaError;
use crate::keyspace;
use crate::store::{RegistryClient, RegistryOp};

/// Build the ordered operation list for a delta.
pub fn plan(tenant: &str, service_id: &str, delta: &SchemaDelta) -> Vec<RegistryOp> {
    let mut ops = Vec::with_capacity(2 * (delta.to_add.len() + delta.to_update.len() + delta.to_delete.len()));

    for schema in delta.to_update.iter().chain(delta.to_add.iter()) {
        tracing::debug!(schema_id = %schema.schema_id, "planning schema write");
        ops.push(RegistryOp::Put {
            key: keyspace::document_key(tenant, service_id, &schema.schema_id),
            value: schema.content.clone().into_bytes(),
        });
        ops.push(RegistryOp::Put {
            key: keyspace::summary_key(tenant, service_id, &schema.schema_id),
            value: schema.summary.clone().into_bytes(),
        });
    }

    for schema in &delta.to_delete {
        tracing::debug!(schema_id = %schema.schema_id, "planning schema removal");
        ops.push(RegistryOp::Delete {
            key: keyspace::document_key(tenant, service_id, &schema.schema_id),
        });
        ops.push(RegistryOp::Delete {
            key: keyspace::summary_key(tenant, service_id, &schema.schema_id),
        });
    }

    ops
}

/// Submit a planned batch as one atomic commit.
///
/// An empty batch reports success without touching the registry, so
/// reconciling an already-consistent state never errors.
pub async fn submit<R: RegistryClient + ?Sized>(
    registry: &R,
    ops: Vec<RegistryOp>,
) -> Result<(), SchemaError> {
    if ops.is_empty() {
        return Ok(());
    }
    registry.commit(ops).await.map_err(SchemaError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRegistry, SchemaDocument};

    fn doc(id: &str) -> SchemaDocument {
        SchemaDocument::new(id, &format!("content-{id}"), &format!("sum-{id}"))
    }

    #[test]
    fn each_schema_id_yields_a_key_pair() {
        let delta = SchemaDelta {
            to_add: vec![doc("new")],
            to_update: vec![doc("changed")],
            to_delete: vec![doc("gone")],
        };

        let ops = plan("t", "svc", &delta);
        assert_eq!(ops.len(), 6);

        let keys: Vec<&str> = ops.iter().map(|op| op.key()).collect();
        assert!(keys.contains(&"/schema-doc/t/svc/new"));
        assert!(keys.contains(&"/schema-summary/t/svc/new"));
        assert!(keys.contains(&"/schema-doc/t/svc/changed"));
        assert!(keys.contains(&"/schema-summary/t/svc/changed"));
        assert!(keys.contains(&"/schema-doc/t/svc/gone"));
        assert!(keys.contains(&"/schema-summary/t/svc/gone"));

        let deletes = ops
            .iter()
            .filter(|op| matches!(op, RegistryOp::Delete { .. }))
            .count();
        assert_eq!(deletes, 2);
    }

    #[test]
    fn empty_delta_plans_nothing() {
        assert!(plan("t", "svc", &SchemaDelta::default()).is_empty());
    }

    #[tokio::test]
    async fn empty_submit_is_a_noop_success() {
        let registry = MemoryRegistry::new();
        // Even a registry primed to fail is never reached.
        registry.inject_commit_failure();
        submit(&registry, Vec::new()).await.unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn submit_failure_is_internal() {
        let registry = MemoryRegistry::new();
        registry.inject_commit_failure();

        let delta = SchemaDelta {
            to_add: vec![doc("a")],
            ..Default::default()
        };
        let err = submit(&registry, plan("t", "svc", &delta)).await.unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
        assert!(err.is_retryable());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn submitted_pairs_land_together() {
        let registry = MemoryRegistry::new();
        let delta = SchemaDelta {
            to_add: vec![doc("a"), doc("b")],
            ..Default::default()
        };

        submit(&registry, plan("t", "svc", &delta)).await.unwrap();
        assert_eq!(
            registry.keys(),
            vec![
                "/schema-doc/t/svc/a",
                "/schema-doc/t/svc/b",
                "/schema-summary/t/svc/a",
                "/schema-summary/t/svc/b",
            ]
        );
    }
}
