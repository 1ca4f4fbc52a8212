// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Schema operations exposed to the registry server's request handlers.
//!
//! `SchemaService` owns no state of its own; everything lives in the
//! external registry. Each operation is an independent unit of work whose
//! read-decide-commit sequence relies on the registry's atomic batch for
//! correctness. Dropping an operation's future before the commit step
//! leaves no partial state behind.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::differ::{self, SchemaDelta};
use crate::directory::{ServiceDirectory, ServiceRecord};
use crate::error::SchemaError;
use crate::keyspace;
use crate::planner;
use crate::policy::ConsistencyPolicy;
use crate::quota::QuotaEnforcer;
use crate::reader;
use crate::store::{RegistryClient, SchemaDocument};

// ---------------------------------------------------------------------------
// BatchSummary
// ---------------------------------------------------------------------------

/// What a batch reconciliation actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents written for the first time.
    pub added: usize,
    /// Documents overwritten.
    pub updated: usize,
    /// Documents reclaimed (permissive mode only).
    pub deleted: usize,
}

impl BatchSummary {
    fn of(delta: &SchemaDelta) -> Self {
        Self {
            added: delta.to_add.len(),
            updated: delta.to_update.len(),
            deleted: delta.to_delete.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaService
// ---------------------------------------------------------------------------

/// Schema reconciliation engine over the three collaborator seams.
///
/// # Type Parameters
///
/// - `R` -- registry client (atomic key-value commits)
/// - `D` -- service directory (read-only service records)
/// - `Q` -- quota enforcer (advisory reservations)
pub struct SchemaService<R, D, Q> {
    registry: Arc<R>,
    directory: Arc<D>,
    quota: Arc<Q>,
    policy: Box<dyn ConsistencyPolicy>,
}

impl<R, D, Q> SchemaService<R, D, Q>
where
    R: RegistryClient,
    D: ServiceDirectory,
    Q: QuotaEnforcer,
{
    /// Create a service with an explicitly injected consistency policy.
    pub fn new(
        registry: Arc<R>,
        directory: Arc<D>,
        quota: Arc<Q>,
        policy: Box<dyn ConsistencyPolicy>,
    ) -> Self {
        Self {
            registry,
            directory,
            quota,
            policy,
        }
    }

    /// Active policy name (`"permissive"` or `"strict"`).
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Fetch one persisted schema document.
    ///
    /// Distinguishes a missing service (`ServiceNotFound`) from a declared
    /// but never-written schema (`NotFound`). The returned document carries
    /// the persisted summary when one exists.
    pub async fn get_schema(
        &self,
        tenant: &str,
        service_id: &str,
        schema_id: &str,
    ) -> Result<SchemaDocument, SchemaError> {
        require_identifier(tenant, "tenant")?;
        require_identifier(service_id, "service id")?;
        require_identifier(schema_id, "schema id")?;
        self.require_service(tenant, service_id).await?;

        let Some(content) =
            reader::document_of(self.registry.as_ref(), tenant, service_id, schema_id).await?
        else {
            return Err(SchemaError::NotFound(schema_id.to_string()));
        };
        let summary = reader::summary_of(self.registry.as_ref(), tenant, service_id, schema_id)
            .await?
            .unwrap_or_default();

        Ok(SchemaDocument {
            schema_id: schema_id.to_string(),
            content,
            summary,
        })
    }

    /// Fetch one schema's persisted summary, if any.
    pub async fn schema_summary(
        &self,
        tenant: &str,
        service_id: &str,
        schema_id: &str,
    ) -> Result<Option<String>, SchemaError> {
        require_identifier(tenant, "tenant")?;
        require_identifier(service_id, "service id")?;
        require_identifier(schema_id, "schema id")?;
        reader::summary_of(self.registry.as_ref(), tenant, service_id, schema_id).await
    }

    /// Delete one schema document.
    ///
    /// Existence is probed via the document key; deleting an absent schema
    /// is `NotFound`, not a silent success. Only the document key is
    /// removed; summary cleanup belongs to the batch path.
    pub async fn delete_schema(
        &self,
        tenant: &str,
        service_id: &str,
        schema_id: &str,
    ) -> Result<(), SchemaError> {
        require_identifier(tenant, "tenant")?;
        require_identifier(service_id, "service id")?;
        require_identifier(schema_id, "schema id")?;
        self.require_service(tenant, service_id).await?;

        if !reader::document_exists(self.registry.as_ref(), tenant, service_id, schema_id).await? {
            return Err(SchemaError::NotFound(schema_id.to_string()));
        }

        let key = keyspace::document_key(tenant, service_id, schema_id);
        self.registry.delete(&key).await?;
        info!(service_id, schema_id, "deleted schema document");
        Ok(())
    }

    /// Write one schema document under the active policy's rules.
    ///
    /// The single-id path shares the batch path's add/update semantics: an
    /// undeclared id is rejected, an add reserves one quota unit first, and
    /// in strict mode an already-summarized schema cannot change.
    pub async fn put_schema(
        &self,
        tenant: &str,
        service_id: &str,
        schema: SchemaDocument,
    ) -> Result<(), SchemaError> {
        require_identifier(tenant, "tenant")?;
        require_identifier(service_id, "service id")?;
        require_identifier(&schema.schema_id, "schema id")?;

        let service = self.require_service(tenant, service_id).await?;
        if !service.declares(&schema.schema_id) {
            warn!(service_id, schema_id = %schema.schema_id, "rejected undeclared schema id");
            return Err(SchemaError::UnknownSchemaId(schema.schema_id));
        }

        let is_update =
            reader::document_exists(self.registry.as_ref(), tenant, service_id, &schema.schema_id)
                .await?;

        if is_update && self.policy.guards_updates() {
            let mut summarized = HashSet::new();
            if reader::summary_of(self.registry.as_ref(), tenant, service_id, &schema.schema_id)
                .await?
                .is_some()
            {
                summarized.insert(schema.schema_id.clone());
            }
            self.policy
                .check_updates(std::slice::from_ref(&schema), &summarized)?;
        }

        if !is_update {
            self.reserve(tenant, service_id, 1).await?;
        }

        let delta = if is_update {
            SchemaDelta {
                to_update: vec![schema.clone()],
                ..Default::default()
            }
        } else {
            SchemaDelta {
                to_add: vec![schema.clone()],
                ..Default::default()
            }
        };
        planner::submit(self.registry.as_ref(), planner::plan(tenant, service_id, &delta)).await?;

        info!(
            service_id,
            schema_id = %schema.schema_id,
            action = if is_update { "update" } else { "add" },
            "wrote schema document"
        );
        Ok(())
    }

    /// Reconcile a service's schema set with an incoming batch.
    ///
    /// The flow is read, diff, policy check, quota, one atomic commit. Two
    /// concurrent reconciliations of the same service may both read the same
    /// stale persisted set; the registry serializes their commits but the
    /// later one wins wholesale (known lost-update limitation, no version
    /// token is taken).
    pub async fn put_schemas(
        &self,
        tenant: &str,
        service_id: &str,
        schemas: Vec<SchemaDocument>,
    ) -> Result<BatchSummary, SchemaError> {
        require_identifier(tenant, "tenant")?;
        require_identifier(service_id, "service id")?;
        require_unique_ids(&schemas)?;

        let service = self.require_service(tenant, service_id).await?;
        let persisted =
            reader::load_documents(self.registry.as_ref(), tenant, service_id).await?;

        let delta = differ::diff(
            &service.declared_schema_ids,
            &persisted,
            &schemas,
            self.policy.reclaims_omitted(),
        )?;

        if self.policy.guards_updates() && !delta.to_update.is_empty() {
            let summarized: HashSet<String> =
                reader::load_summaries(self.registry.as_ref(), tenant, service_id)
                    .await?
                    .into_iter()
                    .map(|d| d.schema_id)
                    .collect();
            self.policy.check_updates(&delta.to_update, &summarized)?;
        }

        let units = self.policy.quota_units(&delta);
        if units > 0 {
            self.reserve(tenant, service_id, units as u32).await?;
        }

        planner::submit(self.registry.as_ref(), planner::plan(tenant, service_id, &delta)).await?;

        let summary = BatchSummary::of(&delta);
        info!(
            service_id,
            mode = self.policy.name(),
            added = summary.added,
            updated = summary.updated,
            deleted = summary.deleted,
            "reconciled schema set"
        );
        Ok(summary)
    }

    async fn require_service(
        &self,
        tenant: &str,
        service_id: &str,
    ) -> Result<ServiceRecord, SchemaError> {
        match self.directory.get_service(tenant, service_id).await? {
            Some(record) => Ok(record),
            None => {
                warn!(service_id, "schema operation against unregistered service");
                Err(SchemaError::ServiceNotFound(service_id.to_string()))
            }
        }
    }

    async fn reserve(
        &self,
        tenant: &str,
        service_id: &str,
        count: u32,
    ) -> Result<(), SchemaError> {
        let granted = self.quota.reserve(tenant, service_id, count).await?;
        if !granted {
            warn!(service_id, requested = count, "schema quota exhausted");
            return Err(SchemaError::QuotaExceeded(service_id.to_string()));
        }
        Ok(())
    }
}

fn require_identifier(value: &str, what: &str) -> Result<(), SchemaError> {
    if value.is_empty() {
        return Err(SchemaError::Validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_unique_ids(schemas: &[SchemaDocument]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for schema in schemas {
        require_identifier(&schema.schema_id, "schema id")?;
        if !seen.insert(schema.schema_id.as_str()) {
            return Err(SchemaError::Validation(format!(
                "duplicate schema id in batch: {}",
                schema.schema_id
            )));
        }
    }
    Ok(())
}
