// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::Client;
use crate::error::ClientError;
use kord_core::coordination::barrier::{arrival, arrival_name};
use kord_core::coordination::{Arrival, ArrivalSpec, Barrier, BarrierPhase, BarrierSpec};
use kord_core::Clock;
use std::time::Duration;

pub struct BarrierHandle<'a, C: Clock> {
    client: &'a Client<C>,
    name: String,
}

impl<'a, C: Clock> BarrierHandle<'a, C> {
    pub(crate) fn new(client: &'a Client<C>, name: String) -> Self {
        Self { client, name }
    }

    pub async fn create(&self, spec: BarrierSpec) -> Result<Barrier, ClientError> {
        self.client.create(&self.name, spec).await
    }

    /// Record `holder`'s arrival; arriving twice is not an error
    pub async fn arrive(&self, holder: &str) -> Result<Arrival, ClientError> {
        let resource = arrival(self.client.namespace(), &self.name, holder);
        match self.client.create_resource(resource).await {
            Err(ClientError::Store(e)) if e.is_already_exists() => {
                self.client
                    .get::<ArrivalSpec>(&arrival_name(&self.name, holder))
                    .await
            }
            other => other,
        }
    }

    /// Wait until the barrier opens; a timed out barrier is an error
    pub async fn wait(&self, timeout: Duration) -> Result<Barrier, ClientError> {
        self.client
            .wait_for::<BarrierSpec, _>(&self.name, timeout, |barrier| {
                match barrier.status.phase {
                    Some(BarrierPhase::Open) => Ok(true),
                    Some(BarrierPhase::Failed) => Err(ClientError::Failed {
                        key: barrier.key(),
                        message: barrier
                            .status
                            .message
                            .clone()
                            .unwrap_or_else(|| "barrier failed".to_string()),
                    }),
                    _ => Ok(false),
                }
            })
            .await
    }
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
