// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Service directory abstraction.
//!
//! The service-registration subsystem owns service records; the schema
//! engine only reads them. A record's declared schema-id list is the
//! authoritative membership set: a schema id absent from it can never be
//! written, regardless of what a request carries.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::store::RegistryError;

// ---------------------------------------------------------------------------
// ServiceRecord
// ---------------------------------------------------------------------------

/// A registered microservice, as seen by the schema engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Service id, unique within a tenant.
    pub service_id: String,
    /// Authoritative, ordered list of schema ids this service may persist.
    pub declared_schema_ids: Vec<String>,
}

impl ServiceRecord {
    /// Create a record declaring the given schema ids.
    pub fn new(service_id: &str, declared_schema_ids: &[&str]) -> Self {
        Self {
            service_id: service_id.to_string(),
            declared_schema_ids: declared_schema_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether `schema_id` is in the declared set.
    pub fn declares(&self, schema_id: &str) -> bool {
        self.declared_schema_ids.iter().any(|id| id == schema_id)
    }
}

// ---------------------------------------------------------------------------
// ServiceDirectory
// ---------------------------------------------------------------------------

/// Read-only lookup of service records.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Fetch a service record. `None` when the service is not registered.
    async fn get_service(
        &self,
        tenant: &str,
        service_id: &str,
    ) -> Result<Option<ServiceRecord>, RegistryError>;
}

// ===========================================================================
// In-memory implementation
// ===========================================================================

/// In-memory `ServiceDirectory` for tests and embedded deployments.
pub struct MemoryDirectory {
    services: Mutex<HashMap<(String, String), ServiceRecord>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            services: Mutex::new(HashMap::new()),
        }
    }

    /// Register or replace a service record.
    pub fn insert(&self, tenant: &str, record: ServiceRecord) {
        let mut services = match self.services.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        services.insert((tenant.to_string(), record.service_id.clone()), record);
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceDirectory for MemoryDirectory {
    async fn get_service(
        &self,
        tenant: &str,
        service_id: &str,
    ) -> Result<Option<ServiceRecord>, RegistryError> {
        let services = match self.services.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(services
            .get(&(tenant.to_string(), service_id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_scoped_by_tenant() {
        let dir = MemoryDirectory::new();
        dir.insert("tenant-a", ServiceRecord::new("svc", &["s1"]));

        let found = dir.get_service("tenant-a", "svc").await.unwrap();
        assert_eq!(found.unwrap().declared_schema_ids, vec!["s1"]);

        assert!(dir.get_service("tenant-b", "svc").await.unwrap().is_none());
        assert!(dir.get_service("tenant-a", "other").await.unwrap().is_none());
    }

    #[test]
    fn declares_checks_membership() {
        let record = ServiceRecord::new("svc", &["orders.v1", "orders.v2"]);
        assert!(record.declares("orders.v1"));
        assert!(!record.declares("payments.v1"));
    }
}
