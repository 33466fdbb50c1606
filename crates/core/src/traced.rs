// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing infrastructure for reconciler events

use crate::effect::Event;

/// Events that carry structured fields for logging
///
/// Provides consistent naming and key-value pairs so every subscriber sees
/// the same shape regardless of which reconciler emitted the event.
pub trait TracedEvent {
    /// Event name for log lines (e.g., "lease:granted")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedEvent for Event {
    fn name(&self) -> &'static str {
        Event::name(self)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Event::PhaseChanged {
                kind,
                namespace,
                name,
                from,
                to,
            } => vec![
                ("kind", kind.to_string()),
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("from", from.clone().unwrap_or_else(|| "-".to_string())),
                ("to", to.clone()),
            ],
            Event::LockExpired {
                kind,
                namespace,
                name,
                holders,
            } => vec![
                ("kind", kind.to_string()),
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("holders", holders.join(",")),
            ],
            Event::SemaphoreOversubscribed {
                namespace,
                name,
                in_use,
                permits,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("in_use", in_use.to_string()),
                ("permits", permits.to_string()),
            ],
            Event::PermitExpired {
                namespace,
                name,
                holder,
            }
            | Event::LeaseExpired {
                namespace,
                name,
                holder,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("holder", holder.clone()),
            ],
            Event::BarrierOpened {
                namespace,
                name,
                arrived,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("arrived", arrived.to_string()),
            ],
            Event::BarrierFailed {
                namespace,
                name,
                arrived,
                required,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("arrived", arrived.to_string()),
                ("required", required.to_string()),
            ],
            Event::LeaseGranted {
                namespace,
                name,
                holder,
                request,
                priority,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("holder", holder.clone()),
                ("request", request.clone()),
                ("priority", priority.to_string()),
            ],
            Event::GateOpened { namespace, name } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
            ],
            Event::GateFailed {
                namespace,
                name,
                unmet,
            } => vec![
                ("namespace", namespace.clone()),
                ("name", name.clone()),
                ("unmet", unmet.to_string()),
            ],
        }
    }
}
