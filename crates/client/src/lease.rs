// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease contention through LeaseRequest children
//!
//! Acquiring creates a request and waits for the controller to grant it.
//! The request is consumed once the lease names the caller. A caller that
//! gives up marks its request Denied, deletes it, then fences the lease so a
//! grant computed from the withdrawn request cannot land afterwards.

use crate::client::Client;
use crate::error::ClientError;
use kord_core::coordination::lease::{request, request_name};
use kord_core::coordination::{Lease, LeasePhase, LeaseRequestSpec, LeaseSpec, TieBreak};
use kord_core::{Clock, ObjectKey};
use std::time::Duration;

pub struct LeaseHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> LeaseHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, ttl: Duration, tie_break: Option<TieBreak>) -> Result<Lease, ClientError> {
        self.client
            .create(&self.name, LeaseSpec { ttl, tie_break })
            .await
    }

    /// Request the lease and wait until it is granted to `holder`
    pub async fn acquire(
        &self,
        holder: &str,
        priority: Option<i32>,
        ttl: Option<Duration>,
        timeout: Duration,
    ) -> Result<Lease, ClientError> {
        let request_key = self
            .client
            .key::<LeaseRequestSpec>(&request_name(&self.name, holder));
        let pending = request(self.client.namespace(), &self.name, holder, priority, ttl);
        match self.client.create_resource(pending.clone()).await {
            Err(ClientError::Store(e)) if e.is_already_exists() => {
                tracing::debug!(key = %request_key, "replacing leftover lease request");
                self.discard(&request_key).await?;
                self.client.create_resource(pending).await?;
            }
            other => {
                other?;
            }
        }

        let waited = self
            .client
            .wait_for::<LeaseSpec, _>(&self.name, timeout, |lease| {
                Ok(lease.status.phase == Some(LeasePhase::Held)
                    && lease.status.holder.as_deref() == Some(holder))
            })
            .await;

        match waited {
            Ok(lease) => {
                self.discard(&request_key).await?;
                tracing::info!(lease = %self.name, holder, "lease acquired");
                Ok(lease)
            }
            Err(e) => match self.withdraw(&request_key, holder).await {
                Some(lease) => {
                    tracing::info!(lease = %self.name, holder, "lease granted as the wait ended");
                    Ok(lease)
                }
                None => Err(e),
            },
        }
    }

    /// Extend the hold; `ttl` defaults to the lease's own
    pub async fn renew(&self, holder: &str, ttl: Option<Duration>) -> Result<Lease, ClientError> {
        self.client
            .update::<LeaseSpec, _>(&self.name, |lease, now| {
                let ttl = ttl.unwrap_or(lease.spec.ttl);
                lease.status.renew(holder, ttl, now)
            })
            .await
    }

    pub async fn release(&self, holder: &str) -> Result<Lease, ClientError> {
        self.client
            .update::<LeaseSpec, _>(&self.name, |lease, _| lease.status.release(holder))
            .await
    }

    /// Wait until nobody holds the lease
    pub async fn wait_available(&self, timeout: Duration) -> Result<Lease, ClientError> {
        self.client
            .wait_for::<LeaseSpec, _>(&self.name, timeout, |lease| {
                Ok(lease.status.holder.is_none())
            })
            .await
    }

    /// Retract an abandoned request.
    ///
    /// Returns the lease when it was granted to `holder` before the request
    /// was gone; the caller then holds it.
    async fn withdraw(&self, key: &ObjectKey, holder: &str) -> Option<Lease> {
        let denied = self
            .client
            .update::<LeaseRequestSpec, _>(&key.name, |req, _| {
                req.status.deny(format!("{holder} stopped waiting"))
            })
            .await;
        if let Err(e) = denied {
            tracing::debug!(%key, error = %e, "lease request not marked denied");
        }
        if let Err(e) = self.discard(key).await {
            tracing::warn!(%key, error = %e, "could not delete abandoned lease request");
        }

        // An unchanged write still bumps the version, failing any in-flight grant
        match self.client.update::<LeaseSpec, _>(&self.name, |_, _| Ok(())).await {
            Ok(lease)
                if lease.status.phase == Some(LeasePhase::Held)
                    && lease.status.holder.as_deref() == Some(holder) =>
            {
                Some(lease)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(lease = %self.name, error = %e, "could not fence lease after withdrawal");
                None
            }
        }
    }

    async fn discard(&self, key: &ObjectKey) -> Result<(), ClientError> {
        match self.client.store().delete(key).await {
            Err(e) if !e.is_not_found() => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
