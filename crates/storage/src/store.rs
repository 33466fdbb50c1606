// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The object store contract

use crate::error::StoreError;
use async_trait::async_trait;
use kord_core::{Kind, LabelSelector, Object, ObjectKey, Resource, Spec};
use tokio::sync::broadcast;

/// Buffered watch events per subscriber before it is marked lagged
pub const WATCH_CAPACITY: usize = 1024;

/// A change observed in the store
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Added(Object),
    Modified(Object),
    Deleted(Object),
}

impl WatchEvent {
    pub fn object(&self) -> &Object {
        match self {
            WatchEvent::Added(o) | WatchEvent::Modified(o) | WatchEvent::Deleted(o) => o,
        }
    }
}

/// Versioned, watchable storage for resources.
///
/// Writes other than create are conditional: `update_status` succeeds only
/// when the caller's `resourceVersion` matches the stored one. Callers own
/// retrying on [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError>;

    /// Objects of `kind` matching `selector`, in creation order.
    /// `namespace: None` spans every namespace.
    async fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>, StoreError>;

    /// Validate and admit a new object; assigns uid, creation time and version
    async fn create(&self, object: Object) -> Result<Object, StoreError>;

    /// Replace the status of the stored object if versions match
    async fn update_status(&self, object: Object) -> Result<Object, StoreError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    /// Subscribe to changes made after this call
    fn watch(&self) -> Result<broadcast::Receiver<WatchEvent>, StoreError>;
}

/// Fetch an object and view it as the typed resource `S`
pub async fn get_as<S: Spec>(
    store: &dyn Store,
    namespace: &str,
    name: &str,
) -> Result<Resource<S, S::Status>, StoreError> {
    let key = ObjectKey::new(S::KIND, namespace, name);
    let object = store.get(&key).await?;
    object
        .into_resource::<S>()
        .ok_or_else(|| StoreError::Internal(format!("{key} has an unexpected kind")))
}

/// List objects of type `S` in `namespace` matching `selector`
pub async fn list_as<S: Spec>(
    store: &dyn Store,
    namespace: &str,
    selector: &LabelSelector,
) -> Result<Vec<Resource<S, S::Status>>, StoreError> {
    let objects = store.list(S::KIND, Some(namespace), selector).await?;
    Ok(objects
        .into_iter()
        .filter_map(|o| o.into_resource::<S>())
        .collect())
}
