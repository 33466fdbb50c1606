// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store with optional journal persistence

use crate::error::StoreError;
use crate::journal::{Journal, JournalOp};
use crate::state::MaterializedState;
use crate::store::{Store, WatchEvent, WATCH_CAPACITY};
use async_trait::async_trait;
use kord_core::validate::validate;
use kord_core::{
    Clock, IdGen, Kind, LabelSelector, Object, ObjectKey, SystemClock, UuidIdGen,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::broadcast;

struct Inner {
    state: MaterializedState,
    journal: Option<Journal>,
}

impl Inner {
    fn record(&mut self, op: JournalOp) -> Result<(), StoreError> {
        if let Some(journal) = self.journal.as_mut() {
            journal.append(&op)?;
        }
        self.state.apply(&op);
        Ok(())
    }
}

/// The reference [`Store`]: a versioned map guarded by a mutex.
///
/// Each mutation is journaled (when a journal is attached) before it is
/// applied, then broadcast to watchers.
pub struct MemoryStore<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    inner: Mutex<Inner>,
    events: broadcast::Sender<WatchEvent>,
    clock: C,
    ids: I,
}

impl MemoryStore {
    /// A volatile store on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock, UuidIdGen)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, I: IdGen> MemoryStore<C, I> {
    pub fn with_clock(clock: C, ids: I) -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                state: MaterializedState::default(),
                journal: None,
            }),
            events,
            clock,
            ids,
        }
    }

    /// Restore from the journal at `path`, compact it, and keep appending to it
    pub fn open(path: &Path, clock: C, ids: I) -> Result<Self, StoreError> {
        let mut state = MaterializedState::default();
        let ops = Journal::replay(path)?;
        for op in &ops {
            state.apply(op);
        }
        Journal::compact(path, state.objects())?;
        let journal = Journal::open(path)?;
        tracing::info!(
            path = %path.display(),
            replayed = ops.len(),
            objects = state.len(),
            version = %state.last_version(),
            "journal restored"
        );

        let store = Self::with_clock(clock, ids);
        {
            let mut inner = store.lock();
            inner.state = state;
            inner.journal = Some(journal);
        }
        Ok(store)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self, event: WatchEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Object count per kind
    pub fn counts(&self) -> BTreeMap<Kind, usize> {
        self.lock().state.counts()
    }

    /// Every stored object in creation order
    pub fn snapshot(&self) -> Vec<Object> {
        self.lock().state.objects().into_iter().cloned().collect()
    }
}

#[async_trait]
impl<C: Clock, I: IdGen> Store for MemoryStore<C, I> {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError> {
        self.lock()
            .state
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>, StoreError> {
        Ok(self.lock().state.list(kind, namespace, selector))
    }

    async fn create(&self, mut object: Object) -> Result<Object, StoreError> {
        validate(&object)?;
        let key = object.key();
        let created = {
            let mut inner = self.lock();
            if inner.state.contains(&key) {
                return Err(StoreError::AlreadyExists(key.to_string()));
            }
            let version = inner.state.next_version();
            let meta = object.metadata_mut();
            meta.uid = Some(self.ids.next());
            meta.creation_timestamp = Some(self.clock.now());
            meta.resource_version = version;
            inner.record(JournalOp::Create {
                object: object.clone(),
            })?;
            object
        };
        tracing::debug!(%key, version = %created.metadata().resource_version, "created");
        self.notify(WatchEvent::Added(created.clone()));
        Ok(created)
    }

    async fn update_status(&self, object: Object) -> Result<Object, StoreError> {
        let key = object.key();
        let updated = {
            let mut inner = self.lock();
            let Some(current) = inner.state.get(&key) else {
                return Err(StoreError::NotFound(key.to_string()));
            };
            let stored = current.metadata().resource_version;
            let observed = object.metadata().resource_version;
            if stored != observed {
                return Err(StoreError::Conflict(format!(
                    "{key} is at version {stored}, caller observed {observed}"
                )));
            }
            let mut updated = current.clone();
            updated.replace_status(&object);
            updated.metadata_mut().resource_version = inner.state.next_version();
            inner.record(JournalOp::UpdateStatus {
                object: updated.clone(),
            })?;
            updated
        };
        tracing::debug!(%key, version = %updated.metadata().resource_version, "status updated");
        self.notify(WatchEvent::Modified(updated.clone()));
        Ok(updated)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let deleted = {
            let mut inner = self.lock();
            let Some(current) = inner.state.get(key).cloned() else {
                return Err(StoreError::NotFound(key.to_string()));
            };
            inner.record(JournalOp::Delete { key: key.clone() })?;
            current
        };
        tracing::debug!(%key, "deleted");
        self.notify(WatchEvent::Deleted(deleted));
        Ok(())
    }

    fn watch(&self) -> Result<broadcast::Receiver<WatchEvent>, StoreError> {
        Ok(self.events.subscribe())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
