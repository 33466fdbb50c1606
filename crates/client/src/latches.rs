// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate, Once, WaitGroup and Job operations

use crate::client::Client;
use crate::error::ClientError;
use kord_core::coordination::{
    Gate, GateCondition, GatePhase, GateSpec, Job, JobSpec, Once, OnceSpec, Refusal, WaitGroup,
    WaitGroupPhase, WaitGroupSpec,
};
use kord_core::Clock;
use std::time::Duration;

pub struct GateHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> GateHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(
        &self,
        conditions: Vec<GateCondition>,
        timeout: Option<Duration>,
    ) -> Result<Gate, ClientError> {
        self.client
            .create(&self.name, GateSpec { conditions, timeout })
            .await
    }

    /// Wait until the gate opens; a failed gate is an error
    pub async fn wait(&self, timeout: Duration) -> Result<Gate, ClientError> {
        self.client
            .wait_for::<GateSpec, _>(&self.name, timeout, |gate| match gate.status.phase {
                Some(GatePhase::Open) => Ok(true),
                Some(GatePhase::Failed) => {
                    let unmet: Vec<&str> = gate
                        .status
                        .conditions
                        .iter()
                        .filter(|c| !c.met)
                        .map(|c| c.name.as_str())
                        .collect();
                    Err(ClientError::Failed {
                        key: gate.key(),
                        message: format!("timed out with unmet conditions: {}", unmet.join(", ")),
                    })
                }
                _ => Ok(false),
            })
            .await
    }
}

pub struct OnceHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> OnceHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, ttl: Option<Duration>) -> Result<Once, ClientError> {
        self.client.create(&self.name, OnceSpec { ttl }).await
    }

    /// Claim the one execution; true if `executor` won it
    pub async fn mark_executed(&self, executor: &str) -> Result<bool, ClientError> {
        let claimed = self
            .client
            .update::<OnceSpec, _>(&self.name, |once, now| {
                once.status.mark_executed(executor, now)
            })
            .await;
        match claimed {
            Ok(_) => Ok(true),
            Err(ClientError::Refused {
                refusal: Refusal::AlreadyExecuted { .. },
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub struct WaitGroupHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> WaitGroupHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, ttl: Option<Duration>) -> Result<WaitGroup, ClientError> {
        self.client.create(&self.name, WaitGroupSpec { ttl }).await
    }

    pub async fn add(&self, delta: i32) -> Result<WaitGroup, ClientError> {
        self.client
            .update::<WaitGroupSpec, _>(&self.name, |wg, _| {
                wg.status.add(delta);
                Ok(())
            })
            .await
    }

    pub async fn done(&self) -> Result<WaitGroup, ClientError> {
        self.add(-1).await
    }

    /// Wait until the counter drops to zero or below
    pub async fn wait(&self, timeout: Duration) -> Result<WaitGroup, ClientError> {
        self.client
            .wait_for::<WaitGroupSpec, _>(&self.name, timeout, |wg| {
                Ok(WaitGroupPhase::of(wg.status.counter) == WaitGroupPhase::Done)
            })
            .await
    }
}

pub struct JobHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> JobHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self) -> Result<Job, ClientError> {
        self.client.create(&self.name, JobSpec {}).await
    }

    /// Record one finished run of the job
    pub async fn complete(&self, success: bool) -> Result<Job, ClientError> {
        self.client
            .update::<JobSpec, _>(&self.name, |job, now| {
                job.status.complete(success, now);
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
#[path = "latches_tests.rs"]
mod tests;
