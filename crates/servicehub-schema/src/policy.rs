// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Consistency policy governing schema mutation.
//!
//! Two deployment philosophies share one reconciliation engine. The policy
//! is an explicit value injected at construction; the engine never consults
//! ambient configuration. Adding a third mode means adding an
//! implementation, not editing a branch.

use std::collections::HashSet;

use crate::differ::SchemaDelta;
use crate::error::SchemaError;
use crate::store::SchemaDocument;

// ---------------------------------------------------------------------------
// ConsistencyPolicy
// ---------------------------------------------------------------------------

/// Per-mode rules applied between diffing and committing.
pub trait ConsistencyPolicy: Send + Sync {
    /// Policy name, used in logs.
    fn name(&self) -> &'static str;

    /// Whether a batch is a full-set replace: persisted ids omitted from the
    /// batch are reclaimed (deleted).
    fn reclaims_omitted(&self) -> bool;

    /// Whether persisted summaries gate updates. When true the engine loads
    /// the summary set and calls `check_updates` before planning writes.
    fn guards_updates(&self) -> bool;

    /// Validate the update set against the ids that already have a persisted
    /// summary. All-or-nothing: one conflicting update fails the request.
    fn check_updates(
        &self,
        updates: &[SchemaDocument],
        summarized: &HashSet<String>,
    ) -> Result<(), SchemaError>;

    /// Net quota units this delta consumes. Only a positive result triggers
    /// a reservation.
    fn quota_units(&self, delta: &SchemaDelta) -> i64;
}

// ---------------------------------------------------------------------------
// Permissive ("dev")
// ---------------------------------------------------------------------------

/// Iterative-development policy: the batch is the complete desired schema
/// set. Omitted ids are reclaimed and anything may be overwritten.
pub struct Permissive;

impl ConsistencyPolicy for Permissive {
    fn name(&self) -> &'static str {
        "permissive"
    }

    fn reclaims_omitted(&self) -> bool {
        true
    }

    fn guards_updates(&self) -> bool {
        false
    }

    fn check_updates(
        &self,
        _updates: &[SchemaDocument],
        _summarized: &HashSet<String>,
    ) -> Result<(), SchemaError> {
        Ok(())
    }

    fn quota_units(&self, delta: &SchemaDelta) -> i64 {
        delta.to_add.len() as i64 - delta.to_delete.len() as i64
    }
}

// ---------------------------------------------------------------------------
// Strict ("prod")
// ---------------------------------------------------------------------------

/// Deployed-contract policy: the schema set may only grow, and a schema id
/// that already has a persisted summary can never be rewritten. A declared
/// id that was never actually written may still be filled in.
pub struct Strict;

impl ConsistencyPolicy for Strict {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn reclaims_omitted(&self) -> bool {
        false
    }

    fn guards_updates(&self) -> bool {
        true
    }

    fn check_updates(
        &self,
        updates: &[SchemaDocument],
        summarized: &HashSet<String>,
    ) -> Result<(), SchemaError> {
        for schema in updates {
            if summarized.contains(&schema.schema_id) {
                return Err(SchemaError::ImmutableSchemaConflict(
                    schema.schema_id.clone(),
                ));
            }
        }
        Ok(())
    }

    fn quota_units(&self, delta: &SchemaDelta) -> i64 {
        delta.to_add.len() as i64
    }
}
