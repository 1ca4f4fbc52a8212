// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Loading persisted schema state for one service.
//!
//! Documents and summaries live in two disjoint key ranges; both loaders
//! prefix-scan their range and decode each key's trailing segment as the
//! schema id. A service with no schemas yields an empty list, never an
//! error. Registry faults and undecodable values abort the enclosing
//! operation as internal errors.

use crate::error::SchemaError;
use crate::keyspace;
use crate::store::{RegistryClient, RegistryError, SchemaDocument};

/// Load every persisted schema document for a service.
pub async fn load_documents<R: RegistryClient + ?Sized>(
    registry: &R,
    tenant: &str,
    service_id: &str,
) -> Result<Vec<SchemaDocument>, SchemaError> {
    let prefix = keyspace::document_prefix(tenant, service_id);
    tracing::debug!(%prefix, "scanning schema documents");
    let items = registry.get_prefix(&prefix).await?;

    let mut documents = Vec::with_capacity(items.len());
    for (key, value) in items {
        let Some(schema_id) = keyspace::schema_id_from_key(&key) else {
            continue;
        };
        documents.push(SchemaDocument {
            schema_id: schema_id.to_string(),
            content: decode_utf8(&key, value)?,
            summary: String::new(),
        });
    }
    Ok(documents)
}

/// Load the summary projection of every persisted schema for a service.
pub async fn load_summaries<R: RegistryClient + ?Sized>(
    registry: &R,
    tenant: &str,
    service_id: &str,
) -> Result<Vec<SchemaDocument>, SchemaError> {
    let prefix = keyspace::summary_prefix(tenant, service_id);
    tracing::debug!(%prefix, "scanning schema summaries");
    let items = registry.get_prefix(&prefix).await?;

    let mut summaries = Vec::with_capacity(items.len());
    for (key, value) in items {
        let Some(schema_id) = keyspace::schema_id_from_key(&key) else {
            continue;
        };
        summaries.push(SchemaDocument {
            schema_id: schema_id.to_string(),
            content: String::new(),
            summary: decode_utf8(&key, value)?,
        });
    }
    Ok(summaries)
}

/// Point lookup of one schema's persisted content.
pub async fn document_of<R: RegistryClient + ?Sized>(
    registry: &R,
    tenant: &str,
    service_id: &str,
    schema_id: &str,
) -> Result<Option<String>, SchemaError> {
    let key = keyspace::document_key(tenant, service_id, schema_id);
    match registry.get(&key).await? {
        Some(value) => Ok(Some(decode_utf8(&key, value)?)),
        None => Ok(None),
    }
}

/// Point lookup of one schema's persisted summary.
pub async fn summary_of<R: RegistryClient + ?Sized>(
    registry: &R,
    tenant: &str,
    service_id: &str,
    schema_id: &str,
) -> Result<Option<String>, SchemaError> {
    let key = keyspace::summary_key(tenant, service_id, schema_id);
    match registry.get(&key).await? {
        Some(value) => Ok(Some(decode_utf8(&key, value)?)),
        None => Ok(None),
    }
}

/// Whether a document is persisted for the given schema id.
///
/// Probes the document key only; a stray summary without a document does not
/// count as existing.
pub async fn document_exists<R: RegistryClient + ?Sized>(
    registry: &R,
    tenant: &str,
    service_id: &str,
    schema_id: &str,
) -> Result<bool, SchemaError> {
    let key = keyspace::document_key(tenant, service_id, schema_id);
    Ok(registry.get(&key).await?.is_some())
}

fn decode_utf8(key: &str, value: Vec<u8>) -> Result<String, SchemaError> {
    String::from_utf8(value).map_err(|e| {
        SchemaError::Internal(RegistryError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRegistry;

    async fn seed(registry: &MemoryRegistry, tenant: &str, service_id: &str, id: &str) {
        registry
            .put(
                &keyspace::document_key(tenant, service_id, id),
                format!("content-{id}").into_bytes(),
            )
            .await
            .unwrap();
        registry
            .put(
                &keyspace::summary_key(tenant, service_id, id),
                format!("sum-{id}").into_bytes(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_service_loads_empty() {
        let registry = MemoryRegistry::new();
        assert!(load_documents(&registry, "t", "svc").await.unwrap().is_empty());
        assert!(load_summaries(&registry, "t", "svc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_are_scoped_to_one_service() {
        let registry = MemoryRegistry::new();
        seed(&registry, "t", "svc", "orders.v1").await;
        seed(&registry, "t", "svc", "orders.v2").await;
        seed(&registry, "t", "neighbor", "other.v1").await;

        let docs = load_documents(&registry, "t", "svc").await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.schema_id.as_str()).collect();
        assert_eq!(ids, vec!["orders.v1", "orders.v2"]);
        assert_eq!(docs[0].content, "content-orders.v1");
        assert!(docs[0].summary.is_empty());
    }

    #[tokio::test]
    async fn summary_projection_carries_no_content() {
        let registry = MemoryRegistry::new();
        seed(&registry, "t", "svc", "orders.v1").await;

        let summaries = load_summaries(&registry, "t", "svc").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].summary, "sum-orders.v1");
        assert!(summaries[0].content.is_empty());
    }

    #[tokio::test]
    async fn scan_fault_is_internal_not_empty() {
        let registry = MemoryRegistry::new();
        registry.inject_scan_failure();

        let err = load_documents(&registry, "t", "svc").await.unwrap_err();
        assert!(matches!(err, SchemaError::Internal(_)));
    }

    #[tokio::test]
    async fn undecodable_value_is_internal() {
        let registry = MemoryRegistry::new();
        registry
            .put(
                &keyspace::document_key("t", "svc", "bad"),
                vec![0xff, 0xfe, 0x80],
            )
            .await
            .unwrap();

        let err = load_documents(&registry, "t", "svc").await.unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
    }

    #[tokio::test]
    async fn point_lookups() {
        let registry = MemoryRegistry::new();
        seed(&registry, "t", "svc", "orders.v1").await;

        assert_eq!(
            document_of(&registry, "t", "svc", "orders.v1").await.unwrap(),
            Some("content-orders.v1".to_string())
        );
        assert_eq!(
            summary_of(&registry, "t", "svc", "orders.v1").await.unwrap(),
            Some("sum-orders.v1".to_string())
        );
        assert_eq!(document_of(&registry, "t", "svc", "gone").await.unwrap(), None);
        assert_eq!(summary_of(&registry, "t", "svc", "gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn existence_probe_ignores_summaries() {
        let registry = MemoryRegistry::new();
        registry
            .put(&keyspace::summary_key("t", "svc", "s"), b"sum".to_vec())
            .await
            .unwrap();

        assert!(!document_exists(&registry, "t", "svc", "s").await.unwrap());

        registry
            .put(&keyspace::document_key("t", "svc", "s"), b"doc".to_vec())
            .await
            .unwrap();
        assert!(document_exists(&registry, "t", "svc", "s").await.unwrap());
    }
}
