// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Schema registry subsystem for the servicehub discovery server.
//!
//! Stores, versions, and reconciles the API-contract documents each
//! registered microservice declares, persisting them into the cluster's
//! shared key-value registry.
//!
//! # Features
//!
//! - **Set reconciliation**: diff a service's declared schema-id list and an
//!   incoming batch against persisted state into minimal add/update/delete
//!   sets
//! - **Consistency policies**: permissive (dev, full-set replace) and strict
//!   (prod, append-only with summary-sealed documents), injected as a value
//! - **Quota enforcement**: net new documents reserved with the quota
//!   enforcer before any write is planned
//! - **Atomic commits**: a document and its summary always land or vanish
//!   together, one registry transaction per request
//!
//! # Architecture
//!
//! ```text
//! SchemaService
//! +-- ServiceDirectory   (declared schema-id lists, read-only)
//! +-- reader / differ    (persisted state -> SchemaDelta)
//! +-- ConsistencyPolicy  (permissive | strict)
//! +-- QuotaEnforcer      (advisory reservations)
//! +-- planner            (SchemaDelta -> one atomic RegistryClient commit)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use servicehub_schema::{
//!     Mode, MemoryDirectory, MemoryRegistry, RegistryQuota, SchemaService,
//! };
//!
//! let registry = Arc::new(MemoryRegistry::new());
//! let quota = Arc::new(RegistryQuota::new(Arc::clone(&registry), 100));
//! let service = SchemaService::new(registry, directory, quota, Mode::Strict.policy());
//! service.put_schemas(tenant, service_id, batch).await?;
//! ```

pub mod config;
pub mod differ;
pub mod directory;
pub mod error;
pub mod keyspace;
pub mod planner;
pub mod policy;
pub mod quota;
pub mod reader;
pub mod service;
pub mod store;

pub use config::{Mode, SchemaConfig};
pub use differ::SchemaDelta;
pub use directory::{MemoryDirectory, ServiceDirectory, ServiceRecord};
pub use error::SchemaError;
pub use policy::{ConsistencyPolicy, Permissive, Strict};
pub use quota::{QuotaEnforcer, RegistryQuota, ScriptedQuota, UnlimitedQuota};
pub use service::{BatchSummary, SchemaService};
pub use store::{MemoryRegistry, RegistryClient, RegistryError, RegistryOp, SchemaDocument};
