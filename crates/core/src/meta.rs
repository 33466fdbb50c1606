// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object metadata, kinds, keys and label selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Namespace used when a caller does not pick one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Label linking a Permit to its Semaphore
pub const SEMAPHORE_LABEL: &str = "kord.io/semaphore";
/// Label linking an Arrival to its Barrier
pub const BARRIER_LABEL: &str = "kord.io/barrier";
/// Label linking a LeaseRequest to its Lease
pub const LEASE_LABEL: &str = "kord.io/lease";

pub type Labels = BTreeMap<String, String>;

/// Every resource type the store holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Mutex,
    #[serde(rename = "RWMutex")]
    RwMutex,
    Semaphore,
    Permit,
    Barrier,
    Arrival,
    Lease,
    LeaseRequest,
    Gate,
    Once,
    WaitGroup,
    Job,
}

impl Kind {
    pub const ALL: [Kind; 12] = [
        Kind::Mutex,
        Kind::RwMutex,
        Kind::Semaphore,
        Kind::Permit,
        Kind::Barrier,
        Kind::Arrival,
        Kind::Lease,
        Kind::LeaseRequest,
        Kind::Gate,
        Kind::Once,
        Kind::WaitGroup,
        Kind::Job,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Mutex => "Mutex",
            Kind::RwMutex => "RWMutex",
            Kind::Semaphore => "Semaphore",
            Kind::Permit => "Permit",
            Kind::Barrier => "Barrier",
            Kind::Arrival => "Arrival",
            Kind::Lease => "Lease",
            Kind::LeaseRequest => "LeaseRequest",
            Kind::Gate => "Gate",
            Kind::Once => "Once",
            Kind::WaitGroup => "WaitGroup",
            Kind::Job => "Job",
        }
    }

    /// The parent kind and association label for child kinds
    pub fn parent(&self) -> Option<(Kind, &'static str)> {
        match self {
            Kind::Permit => Some((Kind::Semaphore, SEMAPHORE_LABEL)),
            Kind::Arrival => Some((Kind::Barrier, BARRIER_LABEL)),
            Kind::LeaseRequest => Some((Kind::Lease, LEASE_LABEL)),
            _ => None,
        }
    }

    /// Kinds a Gate condition can reference
    pub fn is_gate_reference(&self) -> bool {
        matches!(
            self,
            Kind::Job | Kind::Semaphore | Kind::Barrier | Kind::Lease
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    /// Accepts the canonical name in any case, plus a trailing plural `s`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
        Kind::ALL
            .into_iter()
            .find(|k| {
                let name = k.as_str().to_ascii_lowercase();
                name == lowered || name == singular
            })
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Opaque, monotonically increasing version token used for conditional writes
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceVersion(pub u64);

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and bookkeeping fields shared by all resources
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource_version: ResourceVersion,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Store key of a single object
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: Kind,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Exact-match label filter; an empty selector matches everything
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSelector(pub Labels);

impl LabelSelector {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut labels = Labels::new();
        labels.insert(key.into(), value.into());
        Self(labels)
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.0.iter().all(|(k, v)| labels.get(k) == Some(v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
