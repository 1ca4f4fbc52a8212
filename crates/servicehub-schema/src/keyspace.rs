// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Key layout for schema documents and summaries.
//!
//! Every key is namespaced by tenant and service:
//!
//! ```text
//! /schema-doc/{tenant}/{service_id}/{schema_id}      -> content bytes
//! /schema-summary/{tenant}/{service_id}/{schema_id}  -> summary bytes
//! ```
//!
//! An empty `schema_id` produces the service prefix, used for prefix scans
//! over all schema ids of one service.

const DOCUMENT_ROOT: &str = "/schema-doc";
const SUMMARY_ROOT: &str = "/schema-summary";

/// Key under which a schema document's content is stored.
pub fn document_key(tenant: &str, service_id: &str, schema_id: &str) -> String {
    format!("{}/{}/{}/{}", DOCUMENT_ROOT, tenant, service_id, schema_id)
}

/// Key under which a schema document's summary is stored.
pub fn summary_key(tenant: &str, service_id: &str, schema_id: &str) -> String {
    format!("{}/{}/{}/{}", SUMMARY_ROOT, tenant, service_id, schema_id)
}

/// Prefix covering every document key of one service.
pub fn document_prefix(tenant: &str, service_id: &str) -> String {
    document_key(tenant, service_id, "")
}

/// Prefix covering every summary key of one service.
pub fn summary_prefix(tenant: &str, service_id: &str) -> String {
    summary_key(tenant, service_id, "")
}

/// Decode the schema id from a stored key's trailing path segment.
///
/// Returns `None` for keys ending in a separator (prefix form).
pub fn schema_id_from_key(key: &str) -> Option<&str> {
    match key.rsplit('/').next() {
        Some("") | None => None,
        Some(tail) => Some(tail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_key_layout() {
        assert_eq!(
            document_key("default/default", "svc-1", "pricing.v1"),
            "/schema-doc/default/default/svc-1/pricing.v1"
        );
    }

    #[test]
    fn summary_key_layout() {
        assert_eq!(
            summary_key("default/default", "svc-1", "pricing.v1"),
            "/schema-summary/default/default/svc-1/pricing.v1"
        );
    }

    #[test]
    fn empty_schema_id_is_prefix_form() {
        let prefix = document_prefix("t", "svc");
        assert_eq!(prefix, "/schema-doc/t/svc/");
        assert_eq!(prefix, document_key("t", "svc", ""));
    }

    #[test]
    fn schema_id_roundtrip() {
        let key = document_key("t", "svc", "orders.v2");
        assert_eq!(schema_id_from_key(&key), Some("orders.v2"));
    }

    #[test]
    fn prefix_key_has_no_schema_id() {
        assert_eq!(schema_id_from_key(&document_prefix("t", "svc")), None);
    }

    #[test]
    fn document_and_summary_ranges_are_disjoint() {
        let doc = document_key("t", "svc", "a");
        let sum = summary_key("t", "svc", "a");
        assert!(!doc.starts_with(SUMMARY_ROOT));
        assert!(!sum.starts_with(DOCUMENT_ROOT));
    }
}
