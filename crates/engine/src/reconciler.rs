// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-bound reconcilers
//!
//! Each reconciler fetches the object and whatever it depends on, runs the
//! pure reconcile from `kord_core::coordination`, writes the status back only
//! when it changed, then carries out the effects.

use crate::error::ReconcileError;
use crate::executor::Executor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kord_core::coordination::{
    self, barrier, gate, lease, mutex, once, rwmutex, semaphore, waitgroup, ArrivalSpec,
    BarrierSpec, GateInputs, GateSpec, JobSpec, LeaseRequestSpec, LeaseSpec, MutexSpec,
    OnceSpec, PermitSpec, RwMutexSpec, SemaphoreSpec, WaitGroupSpec,
};
use kord_core::{Action, Intervals, Kind, LabelSelector, ObjectKey, Reconciled, Resource, Spec};
use kord_storage::{list_as, Store, StoreError};

/// Everything a reconcile pass may read
pub struct Context<'a> {
    pub store: &'a dyn Store,
    pub now: DateTime<Utc>,
    pub intervals: &'a Intervals,
}

/// Converges one kind of resource
#[async_trait]
pub trait Reconciler: Send + Sync {
    fn kind(&self) -> Kind;

    async fn reconcile(&self, ctx: &Context<'_>, key: &ObjectKey)
        -> Result<Action, ReconcileError>;
}

async fn fetch<S: Spec>(
    ctx: &Context<'_>,
    key: &ObjectKey,
) -> Result<Resource<S, S::Status>, ReconcileError> {
    ctx.store
        .get(key)
        .await?
        .into_resource::<S>()
        .ok_or_else(|| ReconcileError::WrongKind {
            key: key.to_string(),
        })
}

/// Children of a parent, resolved by the association label
async fn children<S: Spec>(
    ctx: &Context<'_>,
    parent: &ObjectKey,
) -> Result<Vec<Resource<S, S::Status>>, ReconcileError> {
    let label = match S::KIND.parent() {
        Some((_, label)) => label,
        None => return Ok(Vec::new()),
    };
    let selector = LabelSelector::label(label, parent.name.as_str());
    Ok(list_as::<S>(ctx.store, &parent.namespace, &selector).await?)
}

/// Write the new status if it changed, then run the effects
async fn commit<S: Spec>(
    ctx: &Context<'_>,
    resource: Resource<S, S::Status>,
    out: Reconciled<S::Status>,
) -> Result<Action, ReconcileError> {
    let Reconciled {
        status,
        action,
        effects,
    } = out;
    if status == resource.status {
        tracing::debug!(action = ?action, "converged");
    } else {
        let updated = resource.with_status(status).into_object();
        ctx.store.update_status(updated).await?;
    }
    Executor::new(ctx.store).execute_all(effects).await;
    Ok(action)
}

/// Reconciler for kinds whose status depends only on the object itself
struct Standalone<S: Spec> {
    reconcile: fn(&Resource<S, S::Status>, DateTime<Utc>, &Intervals) -> Reconciled<S::Status>,
}

#[async_trait]
impl<S> Reconciler for Standalone<S>
where
    S: Spec + Send + Sync + 'static,
    S::Status: Send + Sync,
{
    fn kind(&self) -> Kind {
        S::KIND
    }

    async fn reconcile(
        &self,
        ctx: &Context<'_>,
        key: &ObjectKey,
    ) -> Result<Action, ReconcileError> {
        let resource = fetch::<S>(ctx, key).await?;
        let out = (self.reconcile)(&resource, ctx.now, ctx.intervals);
        commit(ctx, resource, out).await
    }
}

/// Clears expired holds and projects the lock phase
pub fn mutex_reconciler() -> impl Reconciler {
    Standalone::<MutexSpec> {
        reconcile: mutex::reconcile,
    }
}

pub fn rwmutex_reconciler() -> impl Reconciler {
    Standalone::<RwMutexSpec> {
        reconcile: rwmutex::reconcile,
    }
}

/// Marks a Permit expired once its hold lapses
pub fn permit_reconciler() -> impl Reconciler {
    Standalone::<PermitSpec> {
        reconcile: semaphore::reconcile_permit,
    }
}

pub fn once_reconciler() -> impl Reconciler {
    Standalone::<OnceSpec> {
        reconcile: |o, _, _| once::reconcile(o),
    }
}

pub fn waitgroup_reconciler() -> impl Reconciler {
    Standalone::<WaitGroupSpec> {
        reconcile: |w, _, _| waitgroup::reconcile(w),
    }
}

/// Aggregates live Permits into availability
pub struct SemaphoreReconciler;

#[async_trait]
impl Reconciler for SemaphoreReconciler {
    fn kind(&self) -> Kind {
        Kind::Semaphore
    }

    async fn reconcile(
        &self,
        ctx: &Context<'_>,
        key: &ObjectKey,
    ) -> Result<Action, ReconcileError> {
        let sem = fetch::<SemaphoreSpec>(ctx, key).await?;
        let permits = children::<PermitSpec>(ctx, key).await?;
        let out = semaphore::reconcile(&sem, &permits, ctx.now, ctx.intervals);
        commit(ctx, sem, out).await
    }
}

/// Counts Arrivals against the barrier threshold
pub struct BarrierReconciler;

#[async_trait]
impl Reconciler for BarrierReconciler {
    fn kind(&self) -> Kind {
        Kind::Barrier
    }

    async fn reconcile(
        &self,
        ctx: &Context<'_>,
        key: &ObjectKey,
    ) -> Result<Action, ReconcileError> {
        let b = fetch::<BarrierSpec>(ctx, key).await?;
        if b.status.phase.is_some_and(|p| p.is_terminal()) {
            return Ok(Action::NoRequeue);
        }
        let arrivals = children::<ArrivalSpec>(ctx, key).await?;
        let out = barrier::reconcile(&b, &arrivals, ctx.now, ctx.intervals);
        commit(ctx, b, out).await
    }
}

/// Expires holders and grants to pending LeaseRequests
pub struct LeaseReconciler;

#[async_trait]
impl Reconciler for LeaseReconciler {
    fn kind(&self) -> Kind {
        Kind::Lease
    }

    async fn reconcile(
        &self,
        ctx: &Context<'_>,
        key: &ObjectKey,
    ) -> Result<Action, ReconcileError> {
        let l = fetch::<LeaseSpec>(ctx, key).await?;
        let requests = children::<LeaseRequestSpec>(ctx, key).await?;
        let out = lease::reconcile(&l, &requests, ctx.now, ctx.intervals);
        commit(ctx, l, out).await
    }
}

/// Evaluates gate conditions against the referenced resources
pub struct GateReconciler;

impl GateReconciler {
    /// Fetch every referenced resource in the gate's namespace.
    ///
    /// Missing references are left out so the condition reports not found.
    async fn inputs(
        ctx: &Context<'_>,
        g: &coordination::Gate,
    ) -> Result<GateInputs, ReconcileError> {
        let mut inputs = GateInputs::default();
        let namespace = &g.metadata.namespace;
        for condition in &g.spec.conditions {
            let Some((kind, name)) = condition.reference() else {
                continue;
            };
            let object = match ctx.store.get(&ObjectKey::new(kind, namespace, name)).await {
                Ok(object) => object,
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            let name = name.to_string();
            if let Some(job) = object.as_resource::<JobSpec>() {
                inputs.jobs.insert(name, job.status.clone());
            } else if let Some(sem) = object.as_resource::<SemaphoreSpec>() {
                inputs.semaphores.insert(name, sem.status.clone());
            } else if let Some(b) = object.as_resource::<BarrierSpec>() {
                inputs.barriers.insert(name, b.status.phase);
            } else if let Some(l) = object.as_resource::<LeaseSpec>() {
                inputs.leases.insert(name, l.status.phase);
            }
        }
        Ok(inputs)
    }
}

#[async_trait]
impl Reconciler for GateReconciler {
    fn kind(&self) -> Kind {
        Kind::Gate
    }

    async fn reconcile(
        &self,
        ctx: &Context<'_>,
        key: &ObjectKey,
    ) -> Result<Action, ReconcileError> {
        let g = fetch::<GateSpec>(ctx, key).await?;
        if g.status.phase == Some(coordination::GatePhase::Failed) {
            return Ok(Action::NoRequeue);
        }
        let inputs = Self::inputs(ctx, &g).await?;
        let out = gate::reconcile(&g, &inputs, ctx.now, ctx.intervals);
        commit(ctx, g, out).await
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
