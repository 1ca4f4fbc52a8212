// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Schema quota enforcement.
//!
//! The enforcer is an external collaborator with one operation: reserve a
//! number of schema units for a service. The engine only calls it when a
//! request's net new-document count is positive; zero or negative nets are
//! granted without a call.
//!
//! A transport fault (`Err`) is distinct from a definitive rejection
//! (`Ok(false)`): the former surfaces as a retryable internal error, the
//! latter as `QuotaExceeded`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::keyspace;
use crate::store::{RegistryClient, RegistryError};

// ---------------------------------------------------------------------------
// QuotaEnforcer
// ---------------------------------------------------------------------------

/// Reservation interface consumed by the schema engine.
#[async_trait]
pub trait QuotaEnforcer: Send + Sync {
    /// Reserve `count` schema units for `(tenant, service_id)`.
    ///
    /// `Ok(true)` grants, `Ok(false)` is a definitive rejection, `Err` means
    /// the enforcer itself faulted. Reservations are advisory: a grant that
    /// goes unused because the later commit fails is not released.
    async fn reserve(
        &self,
        tenant: &str,
        service_id: &str,
        count: u32,
    ) -> Result<bool, RegistryError>;
}

// ---------------------------------------------------------------------------
// UnlimitedQuota
// ---------------------------------------------------------------------------

/// Enforcer that grants every reservation.
pub struct UnlimitedQuota;

#[async_trait]
impl QuotaEnforcer for UnlimitedQuota {
    async fn reserve(
        &self,
        _tenant: &str,
        _service_id: &str,
        _count: u32,
    ) -> Result<bool, RegistryError> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// RegistryQuota
// ---------------------------------------------------------------------------

/// Enforcer that caps the number of persisted documents per service.
///
/// Usage is re-derived from the registry on every call by counting document
/// keys under the service prefix, so nothing is held that would need to be
/// released when a granted batch fails to commit. The count-then-grant
/// window is advisory only; two concurrent reservations can both be granted
/// against the same snapshot.
pub struct RegistryQuota<R> {
    registry: Arc<R>,
    cap: usize,
}

impl<R: RegistryClient> RegistryQuota<R> {
    /// Cap each service at `cap` persisted documents.
    pub fn new(registry: Arc<R>, cap: usize) -> Self {
        Self { registry, cap }
    }
}

#[async_trait]
impl<R: RegistryClient> QuotaEnforcer for RegistryQuota<R> {
    async fn reserve(
        &self,
        tenant: &str,
        service_id: &str,
        count: u32,
    ) -> Result<bool, RegistryError> {
        let prefix = keyspace::document_prefix(tenant, service_id);
        let existing = self.registry.get_prefix(&prefix).await?.len();
        let granted = existing + count as usize <= self.cap;
        if !granted {
            tracing::warn!(
                service_id,
                existing,
                requested = count,
                cap = self.cap,
                "schema quota rejected"
            );
        }
        Ok(granted)
    }
}

// ===========================================================================
// Scripted test double
// ===========================================================================

/// Enforcer returning a scripted sequence of responses, recording each call.
///
/// When the script runs out it grants. Useful for asserting both what the
/// engine asked for and that it asked at all.
pub struct ScriptedQuota {
    script: Mutex<VecDeque<Result<bool, RegistryError>>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<u32>>,
}

impl ScriptedQuota {
    /// Enforcer with no scripted responses (always grants).
    pub fn granting() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Enforcer whose next responses follow `script` in order.
    pub fn with_script(script: Vec<Result<bool, RegistryError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Number of reserve calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counts passed to each reserve call, in order.
    pub fn requested(&self) -> Vec<u32> {
        match self.requested.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl QuotaEnforcer for ScriptedQuota {
    async fn reserve(
        &self,
        _tenant: &str,
        _service_id: &str,
        count: u32,
    ) -> Result<bool, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.requested.lock() {
            Ok(mut guard) => guard.push(count),
            Err(poisoned) => poisoned.into_inner().push(count),
        }
        let mut script = match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        script.pop_front().unwrap_or(Ok(true))
    }
}
