// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store wrapper that records calls and injects failures, for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::error::StoreError;
use crate::store::{Store, WatchEvent};
use async_trait::async_trait;
use kord_core::{Kind, LabelSelector, Object, ObjectKey};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Recorded store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get { key: ObjectKey },
    List { kind: Kind, namespace: Option<String> },
    Create { key: ObjectKey },
    UpdateStatus { key: ObjectKey },
    Delete { key: ObjectKey },
    Watch,
}

#[derive(Default)]
struct Faults {
    get: VecDeque<StoreError>,
    list: VecDeque<StoreError>,
    create: VecDeque<StoreError>,
    update_status: VecDeque<StoreError>,
    delete: VecDeque<StoreError>,
}

/// Delegates to an inner store, failing queued calls first.
///
/// Each `fail_*` call queues one error that the next matching operation
/// returns instead of reaching the inner store.
pub struct FaultyStore<S> {
    inner: Arc<S>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    faults: Arc<Mutex<Faults>>,
}

impl<S> Clone for FaultyStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            calls: Arc::clone(&self.calls),
            faults: Arc::clone(&self.faults),
        }
    }
}

impl<S: Store> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of status writes attempted
    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::UpdateStatus { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn fail_get(&self, error: StoreError) {
        self.faults().get.push_back(error);
    }

    pub fn fail_list(&self, error: StoreError) {
        self.faults().list.push_back(error);
    }

    pub fn fail_create(&self, error: StoreError) {
        self.faults().create.push_back(error);
    }

    pub fn fail_update_status(&self, error: StoreError) {
        self.faults().update_status.push_back(error);
    }

    pub fn fail_delete(&self, error: StoreError) {
        self.faults().delete.push_back(error);
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl<S: Store> Store for FaultyStore<S> {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError> {
        self.record(StoreCall::Get { key: key.clone() });
        let fault = self.faults().get.pop_front();
        match fault {
            Some(e) => Err(e),
            None => self.inner.get(key).await,
        }
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>, StoreError> {
        self.record(StoreCall::List {
            kind,
            namespace: namespace.map(str::to_string),
        });
        let fault = self.faults().list.pop_front();
        match fault {
            Some(e) => Err(e),
            None => self.inner.list(kind, namespace, selector).await,
        }
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        self.record(StoreCall::Create { key: object.key() });
        let fault = self.faults().create.pop_front();
        match fault {
            Some(e) => Err(e),
            None => self.inner.create(object).await,
        }
    }

    async fn update_status(&self, object: Object) -> Result<Object, StoreError> {
        self.record(StoreCall::UpdateStatus { key: object.key() });
        let fault = self.faults().update_status.pop_front();
        match fault {
            Some(e) => Err(e),
            None => self.inner.update_status(object).await,
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.record(StoreCall::Delete { key: key.clone() });
        let fault = self.faults().delete.pop_front();
        match fault {
            Some(e) => Err(e),
            None => self.inner.delete(key).await,
        }
    }

    fn watch(&self) -> Result<broadcast::Receiver<WatchEvent>, StoreError> {
        self.record(StoreCall::Watch);
        self.inner.watch()
    }
}

#[cfg(test)]
#[path = "faulty_tests.rs"]
mod tests;
