// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace-scoped client over a [`Store`]

use crate::backoff::{Backoff, BackoffConfig};
use crate::barrier::BarrierHandle;
use crate::error::ClientError;
use crate::latches::{GateHandle, JobHandle, OnceHandle, WaitGroupHandle};
use crate::lease::LeaseHandle;
use crate::locks::{MutexHandle, RwMutexHandle};
use crate::semaphore::SemaphoreHandle;
use chrono::{DateTime, Utc};
use kord_core::coordination::Refusal;
use kord_core::{Clock, Kind, LabelSelector, Object, ObjectKey, ObjectMeta, Resource, Spec, SystemClock};
use kord_storage::{get_as, list_as, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Retry and polling behaviour for a [`Client`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Conditional writes attempted before giving up with `Conflict`
    pub conflict_attempts: u32,
    pub conflict_backoff: BackoffConfig,
    pub wait_backoff: BackoffConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            conflict_attempts: 10,
            conflict_backoff: BackoffConfig::new(Duration::from_millis(5), Duration::from_millis(200)),
            wait_backoff: BackoffConfig::new(Duration::from_millis(50), Duration::from_secs(2)),
        }
    }
}

/// Client bound to one namespace.
///
/// Per-primitive operations hang off handles such as [`Client::mutex`].
#[derive(Clone)]
pub struct Client<C: Clock = SystemClock> {
    store: Arc<dyn Store>,
    clock: C,
    namespace: String,
    config: ClientConfig,
}

impl Client {
    pub fn new(store: Arc<dyn Store>, namespace: impl Into<String>) -> Self {
        Self::with_clock(store, namespace, SystemClock)
    }
}

impl<C: Clock> Client<C> {
    pub fn with_clock(store: Arc<dyn Store>, namespace: impl Into<String>, clock: C) -> Self {
        Self {
            store,
            clock,
            namespace: namespace.into(),
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// The same client in another namespace
    pub fn in_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self.clone()
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn key<S: Spec>(&self, name: &str) -> ObjectKey {
        ObjectKey::new(S::KIND, &self.namespace, name)
    }

    pub async fn create<S: Spec>(
        &self,
        name: &str,
        spec: S,
    ) -> Result<Resource<S, S::Status>, ClientError> {
        let resource = Resource::new(ObjectMeta::new(&self.namespace, name), spec);
        self.create_resource(resource).await
    }

    pub(crate) async fn create_resource<S: Spec>(
        &self,
        resource: Resource<S, S::Status>,
    ) -> Result<Resource<S, S::Status>, ClientError> {
        let key = resource.key();
        let created = self.store.create(resource.into_object()).await?;
        typed::<S>(&key, created)
    }

    pub async fn get<S: Spec>(&self, name: &str) -> Result<Resource<S, S::Status>, ClientError> {
        Ok(get_as::<S>(self.store.as_ref(), &self.namespace, name).await?)
    }

    pub async fn list<S: Spec>(
        &self,
        selector: &LabelSelector,
    ) -> Result<Vec<Resource<S, S::Status>>, ClientError> {
        Ok(list_as::<S>(self.store.as_ref(), &self.namespace, selector).await?)
    }

    pub async fn get_object(&self, kind: Kind, name: &str) -> Result<Object, ClientError> {
        let key = ObjectKey::new(kind, &self.namespace, name);
        Ok(self.store.get(&key).await?)
    }

    /// Objects of `kind` in this namespace, or in every namespace when `all`
    pub async fn list_objects(&self, kind: Kind, all: bool) -> Result<Vec<Object>, ClientError> {
        let namespace = (!all).then_some(self.namespace.as_str());
        Ok(self
            .store
            .list(kind, namespace, &LabelSelector::everything())
            .await?)
    }

    pub async fn delete(&self, kind: Kind, name: &str) -> Result<(), ClientError> {
        let key = ObjectKey::new(kind, &self.namespace, name);
        Ok(self.store.delete(&key).await?)
    }

    /// Read, mutate and conditionally write the status of `name`.
    ///
    /// Conflicting writes are retried with jittered backoff up to
    /// `conflict_attempts` times. A refusal from `mutate` aborts without
    /// writing.
    pub async fn update<S, F>(
        &self,
        name: &str,
        mut mutate: F,
    ) -> Result<Resource<S, S::Status>, ClientError>
    where
        S: Spec,
        F: FnMut(&mut Resource<S, S::Status>, DateTime<Utc>) -> Result<(), Refusal>,
    {
        let key = self.key::<S>(name);
        let attempts = self.config.conflict_attempts.max(1);
        let mut backoff = Backoff::new(self.config.conflict_backoff);
        let mut attempt = 1;
        loop {
            let mut resource = self.get::<S>(name).await?;
            mutate(&mut resource, self.now()).map_err(|refusal| ClientError::Refused {
                key: key.clone(),
                refusal,
            })?;
            match self.store.update_status(resource.into_object()).await {
                Ok(updated) => return typed::<S>(&key, updated),
                Err(e) if e.is_conflict() && attempt < attempts => {
                    let delay = backoff.next_delay();
                    tracing::debug!(%key, attempt, ?delay, "status write conflicted, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_conflict() => {
                    return Err(ClientError::Conflict { key, attempts });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Poll `name` until `done` reports true, fails, or `timeout` passes
    pub async fn wait_for<S, F>(
        &self,
        name: &str,
        timeout: Duration,
        mut done: F,
    ) -> Result<Resource<S, S::Status>, ClientError>
    where
        S: Spec,
        F: FnMut(&Resource<S, S::Status>) -> Result<bool, ClientError>,
    {
        let key = self.key::<S>(name);
        let mut waiter = self.waiter(timeout);
        loop {
            let resource = self.get::<S>(name).await?;
            if done(&resource)? {
                return Ok(resource);
            }
            waiter.pause(&key).await?;
        }
    }

    pub(crate) fn waiter(&self, timeout: Duration) -> Waiter {
        Waiter {
            deadline: Instant::now() + timeout,
            timeout,
            backoff: Backoff::new(self.config.wait_backoff),
        }
    }

    pub fn mutex(&self, name: impl Into<String>) -> MutexHandle<'_, C> {
        MutexHandle::new(self, name.into())
    }

    pub fn rwmutex(&self, name: impl Into<String>) -> RwMutexHandle<'_, C> {
        RwMutexHandle::new(self, name.into())
    }

    pub fn semaphore(&self, name: impl Into<String>) -> SemaphoreHandle<'_, C> {
        SemaphoreHandle::new(self, name.into())
    }

    pub fn barrier(&self, name: impl Into<String>) -> BarrierHandle<'_, C> {
        BarrierHandle::new(self, name.into())
    }

    pub fn lease(&self, name: impl Into<String>) -> LeaseHandle<'_, C> {
        LeaseHandle::new(self, name.into())
    }

    pub fn gate(&self, name: impl Into<String>) -> GateHandle<'_, C> {
        GateHandle::new(self, name.into())
    }

    pub fn once(&self, name: impl Into<String>) -> OnceHandle<'_, C> {
        OnceHandle::new(self, name.into())
    }

    pub fn waitgroup(&self, name: impl Into<String>) -> WaitGroupHandle<'_, C> {
        WaitGroupHandle::new(self, name.into())
    }

    pub fn job(&self, name: impl Into<String>) -> JobHandle<'_, C> {
        JobHandle::new(self, name.into())
    }
}

/// Deadline-bounded pacing for polling loops
pub(crate) struct Waiter {
    deadline: Instant,
    timeout: Duration,
    backoff: Backoff,
}

impl Waiter {
    /// Sleep before the next poll; `Timeout` once the deadline has passed
    pub(crate) async fn pause(&mut self, key: &ObjectKey) -> Result<(), ClientError> {
        let now = Instant::now();
        if now >= self.deadline {
            return Err(ClientError::Timeout {
                key: key.clone(),
                timeout: self.timeout,
            });
        }
        let delay = self.backoff.next_delay().min(self.deadline - now);
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

pub(crate) fn typed<S: Spec>(
    key: &ObjectKey,
    object: Object,
) -> Result<Resource<S, S::Status>, ClientError> {
    object.into_resource::<S>().ok_or_else(|| {
        ClientError::Store(kord_storage::StoreError::Internal(format!(
            "{key} came back with an unexpected kind"
        )))
    })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
