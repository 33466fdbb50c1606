// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutex and RWMutex operations

use crate::client::Client;
use crate::error::ClientError;
use kord_core::coordination::{Mutex, MutexSpec, RwMutex, RwMutexSpec};
use kord_core::Clock;
use std::time::Duration;

pub struct MutexHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> MutexHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, ttl: Option<Duration>) -> Result<Mutex, ClientError> {
        self.client.create(&self.name, MutexSpec { ttl }).await
    }

    /// Take the lock once; refused while another live holder has it.
    ///
    /// `ttl` overrides the mutex's own ttl for this hold.
    pub async fn try_lock(&self, holder: &str, ttl: Option<Duration>) -> Result<Mutex, ClientError> {
        let locked = self
            .client
            .update::<MutexSpec, _>(&self.name, |mutex, now| {
                let ttl = ttl.or(mutex.spec.ttl);
                mutex.status.lock(holder, ttl, now)
            })
            .await?;
        tracing::info!(name = %self.name, holder, "mutex locked");
        Ok(locked)
    }

    /// Poll [`Self::try_lock`] until it succeeds or `timeout` passes
    pub async fn lock(
        &self,
        holder: &str,
        ttl: Option<Duration>,
        timeout: Duration,
    ) -> Result<Mutex, ClientError> {
        let key = self.client.key::<MutexSpec>(&self.name);
        let mut waiter = self.client.waiter(timeout);
        loop {
            match self.try_lock(holder, ttl).await {
                Err(ClientError::Refused { .. }) => waiter.pause(&key).await?,
                other => return other,
            }
        }
    }

    pub async fn unlock(&self, holder: &str) -> Result<Mutex, ClientError> {
        self.client
            .update::<MutexSpec, _>(&self.name, |mutex, _| mutex.status.unlock(holder))
            .await
    }
}

pub struct RwMutexHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> RwMutexHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, ttl: Option<Duration>) -> Result<RwMutex, ClientError> {
        self.client.create(&self.name, RwMutexSpec { ttl }).await
    }

    pub async fn try_lock(&self, holder: &str, ttl: Option<Duration>) -> Result<RwMutex, ClientError> {
        self.client
            .update::<RwMutexSpec, _>(&self.name, |rw, now| {
                let ttl = ttl.or(rw.spec.ttl);
                rw.status.lock(holder, ttl, now)
            })
            .await
    }

    pub async fn try_rlock(&self, holder: &str, ttl: Option<Duration>) -> Result<RwMutex, ClientError> {
        self.client
            .update::<RwMutexSpec, _>(&self.name, |rw, now| {
                let ttl = ttl.or(rw.spec.ttl);
                rw.status.rlock(holder, ttl, now)
            })
            .await
    }

    /// Wait for the write lock
    pub async fn lock(
        &self,
        holder: &str,
        ttl: Option<Duration>,
        timeout: Duration,
    ) -> Result<RwMutex, ClientError> {
        let key = self.client.key::<RwMutexSpec>(&self.name);
        let mut waiter = self.client.waiter(timeout);
        loop {
            match self.try_lock(holder, ttl).await {
                Err(ClientError::Refused { .. }) => waiter.pause(&key).await?,
                other => return other,
            }
        }
    }

    /// Wait for a read lock
    pub async fn rlock(
        &self,
        holder: &str,
        ttl: Option<Duration>,
        timeout: Duration,
    ) -> Result<RwMutex, ClientError> {
        let key = self.client.key::<RwMutexSpec>(&self.name);
        let mut waiter = self.client.waiter(timeout);
        loop {
            match self.try_rlock(holder, ttl).await {
                Err(ClientError::Refused { .. }) => waiter.pause(&key).await?,
                other => return other,
            }
        }
    }

    pub async fn unlock(&self, holder: &str) -> Result<RwMutex, ClientError> {
        self.client
            .update::<RwMutexSpec, _>(&self.name, |rw, _| rw.status.unlock(holder))
            .await
    }

    pub async fn runlock(&self, holder: &str) -> Result<RwMutex, ClientError> {
        self.client
            .update::<RwMutexSpec, _>(&self.name, |rw, _| rw.status.runlock(holder))
            .await
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
