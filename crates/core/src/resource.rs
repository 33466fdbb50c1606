// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed resources and the kind-tagged object envelope

use crate::coordination::{
    ArrivalSpec, BarrierSpec, GateSpec, JobSpec, LeaseRequestSpec, LeaseSpec, MutexSpec,
    OnceSpec, PermitSpec, RwMutexSpec, SemaphoreSpec, WaitGroupSpec,
};
use crate::meta::{Kind, ObjectKey, ObjectMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A stored resource: metadata, immutable spec, controller-owned status
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource<S, T> {
    pub metadata: ObjectMeta,
    pub spec: S,
    #[serde(default)]
    pub status: T,
}

/// Links a spec type to its status type and its [`Object`] variant
pub trait Spec: Clone + Debug + Sized {
    type Status: Clone + Debug + Default + PartialEq;
    const KIND: Kind;

    fn into_object(resource: Resource<Self, Self::Status>) -> Object;
    fn from_object(object: Object) -> Option<Resource<Self, Self::Status>>;
    fn from_object_ref(object: &Object) -> Option<&Resource<Self, Self::Status>>;
}

impl<S: Spec> Resource<S, S::Status> {
    pub fn new(metadata: ObjectMeta, spec: S) -> Self {
        Self {
            metadata,
            spec,
            status: S::Status::default(),
        }
    }

    pub fn with_status(mut self, status: S::Status) -> Self {
        self.status = status;
        self
    }

    pub fn kind(&self) -> Kind {
        S::KIND
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(S::KIND, &self.metadata.namespace, &self.metadata.name)
    }

    pub fn into_object(self) -> Object {
        S::into_object(self)
    }
}

macro_rules! impl_spec {
    ($spec:ty, $status:ty, $variant:ident) => {
        impl Spec for $spec {
            type Status = $status;
            const KIND: Kind = Kind::$variant;

            fn into_object(resource: Resource<Self, Self::Status>) -> Object {
                Object::$variant(resource)
            }

            fn from_object(object: Object) -> Option<Resource<Self, Self::Status>> {
                match object {
                    Object::$variant(resource) => Some(resource),
                    _ => None,
                }
            }

            fn from_object_ref(object: &Object) -> Option<&Resource<Self, Self::Status>> {
                match object {
                    Object::$variant(resource) => Some(resource),
                    _ => None,
                }
            }
        }
    };
}

/// Any stored resource, tagged by `kind` on the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Object {
    Mutex(crate::coordination::Mutex),
    #[serde(rename = "RWMutex")]
    RwMutex(crate::coordination::RwMutex),
    Semaphore(crate::coordination::Semaphore),
    Permit(crate::coordination::Permit),
    Barrier(crate::coordination::Barrier),
    Arrival(crate::coordination::Arrival),
    Lease(crate::coordination::Lease),
    LeaseRequest(crate::coordination::LeaseRequest),
    Gate(crate::coordination::Gate),
    Once(crate::coordination::Once),
    WaitGroup(crate::coordination::WaitGroup),
    Job(crate::coordination::Job),
}

impl_spec!(MutexSpec, crate::coordination::MutexStatus, Mutex);
impl_spec!(RwMutexSpec, crate::coordination::RwMutexStatus, RwMutex);
impl_spec!(SemaphoreSpec, crate::coordination::SemaphoreStatus, Semaphore);
impl_spec!(PermitSpec, crate::coordination::PermitStatus, Permit);
impl_spec!(BarrierSpec, crate::coordination::BarrierStatus, Barrier);
impl_spec!(ArrivalSpec, crate::coordination::ArrivalStatus, Arrival);
impl_spec!(LeaseSpec, crate::coordination::LeaseStatus, Lease);
impl_spec!(LeaseRequestSpec, crate::coordination::LeaseRequestStatus, LeaseRequest);
impl_spec!(GateSpec, crate::coordination::GateStatus, Gate);
impl_spec!(OnceSpec, crate::coordination::OnceStatus, Once);
impl_spec!(WaitGroupSpec, crate::coordination::WaitGroupStatus, WaitGroup);
impl_spec!(JobSpec, crate::coordination::JobStatus, Job);

/// Apply `$body` to the inner resource of every variant
macro_rules! each_variant {
    ($object:expr, $resource:ident => $body:expr) => {
        match $object {
            Object::Mutex($resource) => $body,
            Object::RwMutex($resource) => $body,
            Object::Semaphore($resource) => $body,
            Object::Permit($resource) => $body,
            Object::Barrier($resource) => $body,
            Object::Arrival($resource) => $body,
            Object::Lease($resource) => $body,
            Object::LeaseRequest($resource) => $body,
            Object::Gate($resource) => $body,
            Object::Once($resource) => $body,
            Object::WaitGroup($resource) => $body,
            Object::Job($resource) => $body,
        }
    };
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::Mutex(_) => Kind::Mutex,
            Object::RwMutex(_) => Kind::RwMutex,
            Object::Semaphore(_) => Kind::Semaphore,
            Object::Permit(_) => Kind::Permit,
            Object::Barrier(_) => Kind::Barrier,
            Object::Arrival(_) => Kind::Arrival,
            Object::Lease(_) => Kind::Lease,
            Object::LeaseRequest(_) => Kind::LeaseRequest,
            Object::Gate(_) => Kind::Gate,
            Object::Once(_) => Kind::Once,
            Object::WaitGroup(_) => Kind::WaitGroup,
            Object::Job(_) => Kind::Job,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        each_variant!(self, r => &r.metadata)
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        each_variant!(self, r => &mut r.metadata)
    }

    pub fn key(&self) -> ObjectKey {
        let meta = self.metadata();
        ObjectKey::new(self.kind(), &meta.namespace, &meta.name)
    }

    /// Typed view of this object, if it has the requested kind
    pub fn as_resource<S: Spec>(&self) -> Option<&Resource<S, S::Status>> {
        S::from_object_ref(self)
    }

    pub fn into_resource<S: Spec>(self) -> Option<Resource<S, S::Status>> {
        S::from_object(self)
    }

    /// Copy the status of `other` onto this object.
    ///
    /// Returns false (leaving self untouched) when the kinds differ.
    pub fn replace_status(&mut self, other: &Object) -> bool {
        match (self, other) {
            (Object::Mutex(a), Object::Mutex(b)) => a.status = b.status.clone(),
            (Object::RwMutex(a), Object::RwMutex(b)) => a.status = b.status.clone(),
            (Object::Semaphore(a), Object::Semaphore(b)) => a.status = b.status.clone(),
            (Object::Permit(a), Object::Permit(b)) => a.status = b.status.clone(),
            (Object::Barrier(a), Object::Barrier(b)) => a.status = b.status.clone(),
            (Object::Arrival(a), Object::Arrival(b)) => a.status = b.status.clone(),
            (Object::Lease(a), Object::Lease(b)) => a.status = b.status.clone(),
            (Object::LeaseRequest(a), Object::LeaseRequest(b)) => a.status = b.status.clone(),
            (Object::Gate(a), Object::Gate(b)) => a.status = b.status.clone(),
            (Object::Once(a), Object::Once(b)) => a.status = b.status.clone(),
            (Object::WaitGroup(a), Object::WaitGroup(b)) => a.status = b.status.clone(),
            (Object::Job(a), Object::Job(b)) => a.status = b.status.clone(),
            _ => return false,
        }
        true
    }

    /// Current phase for display, if the kind has one and it has been set
    pub fn phase(&self) -> Option<String> {
        match self {
            Object::Mutex(r) => r.status.phase.map(|p| p.to_string()),
            Object::RwMutex(r) => r.status.phase.map(|p| p.to_string()),
            Object::Semaphore(r) => r.status.phase.map(|p| p.to_string()),
            Object::Permit(r) => r.status.phase.map(|p| p.to_string()),
            Object::Barrier(r) => r.status.phase.map(|p| p.to_string()),
            Object::Arrival(_) => None,
            Object::Lease(r) => r.status.phase.map(|p| p.to_string()),
            Object::LeaseRequest(r) => r.status.phase.map(|p| p.to_string()),
            Object::Gate(r) => r.status.phase.map(|p| p.to_string()),
            Object::Once(r) => r.status.phase.map(|p| p.to_string()),
            Object::WaitGroup(r) => r.status.phase.map(|p| p.to_string()),
            Object::Job(r) => r.status.outcome().map(str::to_string),
        }
    }

    /// When the janitor may delete this object (creation + ttl).
    ///
    /// Only Once and WaitGroup are garbage collected; other kinds use their
    /// ttl for holds, not for the object's lifetime.
    pub fn collect_after(&self) -> Option<DateTime<Utc>> {
        let ttl = match self {
            Object::Once(r) => r.spec.ttl,
            Object::WaitGroup(r) => r.spec.ttl,
            _ => None,
        }?;
        let created = self.metadata().creation_timestamp?;
        Some(crate::clock::after(created, ttl))
    }
}

impl<S: Spec> From<Resource<S, S::Status>> for Object {
    fn from(resource: Resource<S, S::Status>) -> Self {
        S::into_object(resource)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
