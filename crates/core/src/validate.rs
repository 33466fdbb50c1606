// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission checks applied by the store when an object is created

use crate::coordination::GateCondition;
use crate::meta::{ObjectMeta, BARRIER_LABEL, LEASE_LABEL, SEMAPHORE_LABEL};
use crate::resource::Object;
use std::time::Duration;
use thiserror::Error;

const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} {value:?}: use lowercase letters, digits, '-' or '.'")]
    InvalidName { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("quorum {quorum} exceeds expected {expected}")]
    QuorumExceedsExpected { quorum: u32, expected: u32 },

    #[error("{field} must not be zero when set")]
    ZeroDuration { field: &'static str },

    #[error("holder must not be empty")]
    EmptyHolder,

    #[error("missing label {label}={expected}")]
    MissingLabel { label: &'static str, expected: String },

    #[error("label {label}={found} does not match {expected}")]
    LabelMismatch {
        label: &'static str,
        expected: String,
        found: String,
    },

    #[error("semaphore condition {name} requires a value")]
    MissingConditionValue { name: String },
}

/// Whether `value` is a DNS-subdomain-like identifier
pub fn is_valid_name(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    value.len() <= MAX_NAME_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-' || *b == b'.')
}

fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_name(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}

fn check_ttl(field: &'static str, value: Option<Duration>) -> Result<(), ValidationError> {
    match value {
        Some(d) if d.is_zero() => Err(ValidationError::ZeroDuration { field }),
        _ => Ok(()),
    }
}

fn check_holder(holder: &str) -> Result<(), ValidationError> {
    if holder.trim().is_empty() {
        Err(ValidationError::EmptyHolder)
    } else {
        Ok(())
    }
}

fn check_parent_label(
    meta: &ObjectMeta,
    label: &'static str,
    parent: &str,
) -> Result<(), ValidationError> {
    check_name("parent", parent)?;
    match meta.label(label) {
        None => Err(ValidationError::MissingLabel {
            label,
            expected: parent.to_string(),
        }),
        Some(found) if found != parent => Err(ValidationError::LabelMismatch {
            label,
            expected: parent.to_string(),
            found: found.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// Check an object before it is admitted to the store
pub fn validate(object: &Object) -> Result<(), ValidationError> {
    let meta = object.metadata();
    check_name("name", &meta.name)?;
    check_name("namespace", &meta.namespace)?;

    match object {
        Object::Mutex(m) => check_ttl("ttl", m.spec.ttl),
        Object::RwMutex(m) => check_ttl("ttl", m.spec.ttl),
        Object::Semaphore(s) => {
            if s.spec.permits == 0 {
                return Err(ValidationError::NotPositive { field: "permits" });
            }
            check_ttl("ttl", s.spec.ttl)
        }
        Object::Permit(p) => {
            check_holder(&p.spec.holder)?;
            check_ttl("ttl", p.spec.ttl)?;
            check_parent_label(meta, SEMAPHORE_LABEL, &p.spec.semaphore)
        }
        Object::Barrier(b) => {
            if b.spec.expected == 0 {
                return Err(ValidationError::NotPositive { field: "expected" });
            }
            match b.spec.quorum {
                Some(0) => return Err(ValidationError::NotPositive { field: "quorum" }),
                Some(quorum) if quorum > b.spec.expected => {
                    return Err(ValidationError::QuorumExceedsExpected {
                        quorum,
                        expected: b.spec.expected,
                    })
                }
                _ => {}
            }
            check_ttl("timeout", b.spec.timeout)
        }
        Object::Arrival(a) => {
            check_holder(&a.spec.holder)?;
            check_parent_label(meta, BARRIER_LABEL, &a.spec.barrier)
        }
        Object::Lease(l) => {
            if l.spec.ttl.is_zero() {
                return Err(ValidationError::NotPositive { field: "ttl" });
            }
            Ok(())
        }
        Object::LeaseRequest(r) => {
            check_holder(&r.spec.holder)?;
            check_ttl("ttl", r.spec.ttl)?;
            check_parent_label(meta, LEASE_LABEL, &r.spec.lease)
        }
        Object::Gate(g) => {
            check_ttl("timeout", g.spec.timeout)?;
            for condition in &g.spec.conditions {
                if let GateCondition::Semaphore { name, value: None } = condition {
                    return Err(ValidationError::MissingConditionValue { name: name.clone() });
                }
            }
            Ok(())
        }
        Object::Once(o) => check_ttl("ttl", o.spec.ttl),
        Object::WaitGroup(w) => check_ttl("ttl", w.spec.ttl),
        Object::Job(_) => Ok(()),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
