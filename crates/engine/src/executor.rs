// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use kord_core::coordination::{LeaseRequestPhase, LeaseRequestSpec};
use kord_core::{Effect, Event, TracedEvent};
use kord_storage::{get_as, Store, StoreError};

/// Carries out reconciler effects after the owning status write landed
pub struct Executor<'a> {
    store: &'a dyn Store,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Execute a single effect.
    ///
    /// Effects are best-effort: failures are logged, never returned.
    pub async fn execute(&self, effect: Effect) {
        match effect {
            Effect::Emit(event) => log_event(&event),
            Effect::GrantRequest { namespace, name } => {
                if let Err(e) = self.grant_request(&namespace, &name).await {
                    tracing::warn!(
                        namespace,
                        request = name,
                        error = %e,
                        "failed to mark lease request granted"
                    );
                }
            }
        }
    }

    pub async fn execute_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect).await;
        }
    }

    async fn grant_request(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut request = get_as::<LeaseRequestSpec>(self.store, namespace, name).await?;
        if request.status.phase == Some(LeaseRequestPhase::Granted) {
            return Ok(());
        }
        request.status.phase = Some(LeaseRequestPhase::Granted);
        request.status.message = Some(format!("granted to {}", request.spec.holder));
        self.store.update_status(request.into_object()).await?;
        Ok(())
    }
}

/// Log an event at the level its kind calls for
pub fn log_event(event: &Event) {
    let fields = render_fields(event);
    if event.is_warning() {
        tracing::warn!(event = event.name(), %fields, "event");
    } else {
        tracing::info!(event = event.name(), %fields, "event");
    }
}

fn render_fields(event: &Event) -> String {
    event
        .fields()
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
