// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Error taxonomy for schema operations.
//!
//! Every failure a caller can see is one of these variants. Business
//! rejections carry the offending identifier and are never retryable;
//! `Internal` wraps a collaborator fault and is the only variant a caller
//! may retry. The wrapped cause stays behind `source()` for logging and is
//! never part of the display message.

use thiserror::Error;

use crate::store::RegistryError;

/// Schema operation errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Malformed or missing required identifiers.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The owning service record does not exist.
    #[error("service does not exist: {0}")]
    ServiceNotFound(String),

    /// Schema id not declared by the owning service.
    #[error("schema id not declared by service: {0}")]
    UnknownSchemaId(String),

    /// The requested document is not persisted.
    #[error("schema not found: {0}")]
    NotFound(String),

    /// Definitive rejection from the quota enforcer.
    #[error("schema quota exhausted for service {0}")]
    QuotaExceeded(String),

    /// Strict-mode rewrite of a schema id that already has a persisted summary.
    #[error("schema {0} is already persisted and cannot change")]
    ImmutableSchemaConflict(String),

    /// Registry or enforcer unreachable, or a stored value failed to decode.
    #[error("registry operation failed")]
    Internal(#[source] RegistryError),
}

impl SchemaError {
    /// Machine-checkable outcome code for the response surface.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            Self::UnknownSchemaId(_) => "UNKNOWN_SCHEMA_ID",
            Self::NotFound(_) => "NOT_FOUND",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::ImmutableSchemaConflict(_) => "IMMUTABLE_SCHEMA_CONFLICT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// True only for `Internal`: the commit batch is atomic, so a failed
    /// request left no partial state behind and retry-from-scratch is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<RegistryError> for SchemaError {
    fn from(e: RegistryError) -> Self {
        Self::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_is_retryable() {
        assert!(SchemaError::Internal(RegistryError::Unavailable("down".into())).is_retryable());
        assert!(!SchemaError::QuotaExceeded("svc".into()).is_retryable());
        assert!(!SchemaError::ImmutableSchemaConflict("s".into()).is_retryable());
        assert!(!SchemaError::NotFound("s".into()).is_retryable());
    }

    #[test]
    fn internal_display_hides_cause() {
        let err = SchemaError::Internal(RegistryError::Unavailable(
            "etcd endpoint 10.0.0.7:2379 refused".into(),
        ));
        assert_eq!(err.to_string(), "registry operation failed");

        use std::error::Error;
        let cause = err.source().expect("cause retained for logging");
        assert!(cause.to_string().contains("10.0.0.7"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(SchemaError::Validation("x".into()).code(), "VALIDATION");
        assert_eq!(
            SchemaError::UnknownSchemaId("x".into()).code(),
            "UNKNOWN_SCHEMA_ID"
        );
        assert_eq!(
            SchemaError::ImmutableSchemaConflict("x".into()).code(),
            "IMMUTABLE_SCHEMA_CONFLICT"
        );
    }
}
