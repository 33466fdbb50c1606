// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::error::StoreError;
use crate::store::{Store, WatchEvent};
use async_trait::async_trait;
use kord_core::{Kind, LabelSelector, Object, ObjectKey};
use tokio::sync::broadcast;
use tracing::Instrument;

/// Wrapper that adds tracing to any Store
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[async_trait]
impl<S: Store> Store for TracedStore<S> {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError> {
        let result = self.inner.get(key).await;
        tracing::trace!(%key, found = result.is_ok(), "store.get");
        result
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>, StoreError> {
        let result = self.inner.list(kind, namespace, selector).await;
        tracing::trace!(
            %kind,
            namespace,
            selector = ?selector,
            count = result.as_ref().map(Vec::len).ok(),
            "store.list"
        );
        result
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        let span = tracing::info_span!("store.create", key = %object.key());
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.create(object).await;
            match &result {
                Ok(created) => tracing::info!(
                    version = %created.metadata().resource_version,
                    elapsed_ms = elapsed_ms(start),
                    "created"
                ),
                Err(e) if e.is_already_exists() => tracing::debug!(error = %e, "create skipped"),
                Err(e) => tracing::warn!(elapsed_ms = elapsed_ms(start), error = %e, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn update_status(&self, object: Object) -> Result<Object, StoreError> {
        let span = tracing::debug_span!(
            "store.update_status",
            key = %object.key(),
            observed = %object.metadata().resource_version
        );
        async move {
            let result = self.inner.update_status(object).await;
            match &result {
                Ok(updated) => tracing::debug!(
                    version = %updated.metadata().resource_version,
                    phase = updated.phase().as_deref(),
                    "status written"
                ),
                // Conflicts are routine under contention
                Err(e) if e.is_conflict() => tracing::debug!(error = %e, "stale write"),
                Err(e) => tracing::warn!(error = %e, "status write failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", %key);
        async move {
            let result = self.inner.delete(key).await;
            match &result {
                Ok(()) => tracing::info!("deleted"),
                Err(e) if e.is_not_found() => tracing::debug!("already gone"),
                Err(e) => tracing::warn!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn watch(&self) -> Result<broadcast::Receiver<WatchEvent>, StoreError> {
        let result = self.inner.watch();
        if let Err(e) = &result {
            tracing::error!(error = %e, "watch failed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
