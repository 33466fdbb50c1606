// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table of reconcilers by kind, built once at startup

use crate::reconciler::{
    self, BarrierReconciler, GateReconciler, LeaseReconciler, Reconciler, SemaphoreReconciler,
};
use kord_core::Kind;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Registry {
    reconcilers: BTreeMap<Kind, Arc<dyn Reconciler>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in reconciler. Arrival, LeaseRequest and Job have none.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(reconciler::mutex_reconciler())
            .register(reconciler::rwmutex_reconciler())
            .register(SemaphoreReconciler)
            .register(reconciler::permit_reconciler())
            .register(BarrierReconciler)
            .register(LeaseReconciler)
            .register(GateReconciler)
            .register(reconciler::once_reconciler())
            .register(reconciler::waitgroup_reconciler());
        registry
    }

    /// Add or replace the reconciler for its kind
    pub fn register(&mut self, reconciler: impl Reconciler + 'static) -> &mut Self {
        self.reconcilers
            .insert(reconciler.kind(), Arc::new(reconciler));
        self
    }

    pub fn get(&self, kind: Kind) -> Option<&Arc<dyn Reconciler>> {
        self.reconcilers.get(&kind)
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.reconcilers.contains_key(&kind)
    }

    /// Registered kinds in a stable order
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.reconcilers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.reconcilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reconcilers.is_empty()
    }
}
