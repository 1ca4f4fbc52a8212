// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Schema set reconciliation.
//!
//! Pure computation of the delta between the persisted schema set and an
//! incoming batch, gated by the service's declared schema-id list.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::store::SchemaDocument;

// ---------------------------------------------------------------------------
// SchemaDelta
// ---------------------------------------------------------------------------

/// Minimal set of changes reconciling an incoming batch with persisted state.
///
/// The three sets are disjoint by schema id. `to_delete` is only populated
/// when the caller asked for omitted ids to be reclaimed (full-set replace).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDelta {
    /// Incoming documents with no persisted counterpart.
    pub to_add: Vec<SchemaDocument>,
    /// Incoming documents that already exist; content equality is not
    /// checked, every one is treated as a potential write.
    pub to_update: Vec<SchemaDocument>,
    /// Persisted documents absent from the incoming batch.
    pub to_delete: Vec<SchemaDocument>,
}

impl SchemaDelta {
    /// True when reconciling would touch nothing.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// Partition `incoming` into add/update/delete sets against `persisted`.
///
/// Fails fast with `UnknownSchemaId` if any incoming document names a schema
/// id outside `declared_ids`; no partial delta is returned. When
/// `reclaim_omitted` is false the delete set stays empty.
pub fn diff(
    declared_ids: &[String],
    persisted: &[SchemaDocument],
    incoming: &[SchemaDocument],
    reclaim_omitted: bool,
) -> Result<SchemaDelta, SchemaError> {
    let declared: HashSet<&str> = declared_ids.iter().map(String::as_str).collect();
    for schema in incoming {
        if !declared.contains(schema.schema_id.as_str()) {
            return Err(SchemaError::UnknownSchemaId(schema.schema_id.clone()));
        }
    }

    let persisted_ids: HashSet<&str> = persisted.iter().map(|d| d.schema_id.as_str()).collect();
    let incoming_ids: HashSet<&str> = incoming.iter().map(|d| d.schema_id.as_str()).collect();

    let mut delta = SchemaDelta::default();
    for schema in incoming {
        if persisted_ids.contains(schema.schema_id.as_str()) {
            delta.to_update.push(schema.clone());
        } else {
            delta.to_add.push(schema.clone());
        }
    }

    if reclaim_omitted {
        for schema in persisted {
            if !incoming_ids.contains(schema.schema_id.as_str()) {
                delta.to_delete.push(schema.clone());
            }
        }
    }

    Ok(delta)
}
