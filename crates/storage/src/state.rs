// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object state materialized from journal operations

use crate::journal::JournalOp;
use kord_core::{Kind, LabelSelector, Object, ObjectKey, ResourceVersion};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct Stored {
    /// Insertion order, used to list objects in creation order
    seq: u64,
    object: Object,
}

/// All stored objects plus the version counter
#[derive(Debug, Default)]
pub struct MaterializedState {
    objects: HashMap<ObjectKey, Stored>,
    last_version: u64,
    next_seq: u64,
}

impl MaterializedState {
    pub fn get(&self, key: &ObjectKey) -> Option<&Object> {
        self.objects.get(key).map(|s| &s.object)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Objects of `kind` matching the selector, in creation order.
    ///
    /// `namespace: None` lists across all namespaces.
    pub fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Vec<Object> {
        let mut matched: Vec<&Stored> = self
            .objects
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .filter(|(key, _)| namespace.is_none_or(|ns| key.namespace == ns))
            .filter(|(_, s)| selector.matches(&s.object.metadata().labels))
            .map(|(_, s)| s)
            .collect();
        matched.sort_by_key(|s| s.seq);
        matched.into_iter().map(|s| s.object.clone()).collect()
    }

    /// Every object in creation order
    pub fn objects(&self) -> Vec<&Object> {
        let mut all: Vec<&Stored> = self.objects.values().collect();
        all.sort_by_key(|s| s.seq);
        all.into_iter().map(|s| &s.object).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object count per kind
    pub fn counts(&self) -> BTreeMap<Kind, usize> {
        let mut counts = BTreeMap::new();
        for key in self.objects.keys() {
            *counts.entry(key.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Reserve the next resource version
    pub fn next_version(&mut self) -> ResourceVersion {
        self.last_version += 1;
        ResourceVersion(self.last_version)
    }

    pub fn last_version(&self) -> ResourceVersion {
        ResourceVersion(self.last_version)
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &JournalOp) {
        match op {
            JournalOp::Create { object } | JournalOp::UpdateStatus { object } => {
                let version = object.metadata().resource_version.0;
                self.last_version = self.last_version.max(version);
                let key = object.key();
                match self.objects.get_mut(&key) {
                    Some(stored) => stored.object = object.clone(),
                    None => {
                        self.next_seq += 1;
                        self.objects.insert(
                            key,
                            Stored {
                                seq: self.next_seq,
                                object: object.clone(),
                            },
                        );
                    }
                }
            }

            JournalOp::Delete { key } => {
                self.objects.remove(key);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
