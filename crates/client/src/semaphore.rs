// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore acquire and release through Permit children

use crate::client::Client;
use crate::error::ClientError;
use kord_core::coordination::semaphore::{self, count_live, permit_name};
use kord_core::coordination::{Permit, PermitSpec, Refusal, Semaphore, SemaphoreSpec};
use kord_core::meta::SEMAPHORE_LABEL;
use kord_core::{Clock, LabelSelector, ObjectKey};
use std::time::Duration;

pub struct SemaphoreHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> SemaphoreHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, permits: u32, ttl: Option<Duration>) -> Result<Semaphore, ClientError> {
        self.client
            .create(&self.name, SemaphoreSpec { permits, ttl })
            .await
    }

    async fn permits(&self) -> Result<Vec<Permit>, ClientError> {
        self.client
            .list::<PermitSpec>(&LabelSelector::label(SEMAPHORE_LABEL, &self.name))
            .await
    }

    /// Take one permit for `holder`, or refuse when none are free.
    ///
    /// A live permit already held by `holder` is returned as is. Racing
    /// acquirers can both pass the count; the loser sees the semaphore
    /// oversubscribed after its create, deletes its permit and is refused.
    pub async fn try_acquire(&self, holder: &str, ttl: Option<Duration>) -> Result<Permit, ClientError> {
        let sem = self.client.get::<SemaphoreSpec>(&self.name).await?;
        let permits = self.permits().await?;
        let now = self.client.now();

        let own = permit_name(&self.name, holder);
        let mut others = Vec::with_capacity(permits.len());
        for permit in permits {
            if permit.metadata.name != own {
                others.push(permit);
            } else if permit.is_live(now) {
                return Ok(permit);
            } else {
                self.release_key(&permit.key()).await?;
            }
        }

        let key = sem.key();
        let grant = semaphore::grant(&sem, &others, holder, ttl, now)
            .map_err(|refusal| ClientError::Refused { key: key.clone(), refusal })?;
        let permit = self.client.create_resource(grant).await?;

        let in_use = count_live(&self.permits().await?, self.client.now());
        if in_use > sem.spec.permits {
            tracing::warn!(
                semaphore = %self.name,
                holder,
                in_use,
                permits = sem.spec.permits,
                "oversubscribed, returning permit"
            );
            self.release_key(&permit.key()).await?;
            return Err(ClientError::Refused {
                key,
                refusal: Refusal::Full {
                    in_use: in_use.saturating_sub(1),
                    permits: sem.spec.permits,
                },
            });
        }
        tracing::info!(semaphore = %self.name, holder, "permit granted");
        Ok(permit)
    }

    /// Poll [`Self::try_acquire`] until a permit is free or `timeout` passes
    pub async fn acquire(
        &self,
        holder: &str,
        ttl: Option<Duration>,
        timeout: Duration,
    ) -> Result<Permit, ClientError> {
        let key = self.client.key::<SemaphoreSpec>(&self.name);
        let mut waiter = self.client.waiter(timeout);
        loop {
            match self.try_acquire(holder, ttl).await {
                Err(ClientError::Refused { .. }) => waiter.pause(&key).await?,
                other => return other,
            }
        }
    }

    /// Delete the permit `holder` took
    pub async fn release(&self, holder: &str) -> Result<(), ClientError> {
        let key = self.client.key::<PermitSpec>(&permit_name(&self.name, holder));
        match self.client.store().delete(&key).await {
            Err(e) if e.is_not_found() => Err(ClientError::Refused {
                key: self.client.key::<SemaphoreSpec>(&self.name),
                refusal: Refusal::NotHolder {
                    holder: holder.to_string(),
                },
            }),
            other => Ok(other?),
        }
    }

    async fn release_key(&self, key: &ObjectKey) -> Result<(), ClientError> {
        match self.client.store().delete(key).await {
            Err(e) if !e.is_not_found() => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
