// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping store changes to the keys that must be reconciled

use crate::registry::Registry;
use kord_core::coordination::{Gate, GateSpec};
use kord_core::{LabelSelector, Object, ObjectKey};
use kord_storage::{list_as, Store, StoreError};

/// Keys affected by a change to `object`, given the gates in its namespace.
///
/// - the object itself, when its kind has a reconciler
/// - the parent named by a child's association label
/// - every gate with a condition on the object
pub fn affected_keys(object: &Object, registry: &Registry, gates: &[Gate]) -> Vec<ObjectKey> {
    let kind = object.kind();
    let meta = object.metadata();
    let mut keys = Vec::new();

    if registry.contains(kind) {
        keys.push(object.key());
    }
    if let Some((parent, label)) = kind.parent() {
        if let Some(name) = meta.label(label) {
            keys.push(ObjectKey::new(parent, &meta.namespace, name));
        }
    }
    if kind.is_gate_reference() {
        keys.extend(
            gates
                .iter()
                .filter(|g| g.metadata.namespace == meta.namespace)
                .filter(|g| g.references(kind, &meta.name))
                .map(|g| g.key()),
        );
    }
    keys
}

/// Resolve [`affected_keys`], listing gates only for referenceable kinds
pub async fn keys_for(
    store: &dyn Store,
    registry: &Registry,
    object: &Object,
) -> Result<Vec<ObjectKey>, StoreError> {
    let gates = if object.kind().is_gate_reference() {
        let namespace = &object.metadata().namespace;
        list_as::<GateSpec>(store, namespace, &LabelSelector::everything()).await?
    } else {
        Vec::new()
    };
    Ok(affected_keys(object, registry, &gates))
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
