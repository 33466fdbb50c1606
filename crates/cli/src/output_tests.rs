// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::coordination::{MutexSpec, MutexStatus, MutexPhase};
use kord_core::{ObjectMeta, Resource, ResourceVersion};
use yare::parameterized;

fn mutex(name: &str, phase: Option<MutexPhase>) -> Object {
    let mut meta = ObjectMeta::new("team-a", name);
    meta.resource_version = ResourceVersion(3);
    Resource::new(meta, MutexSpec::default())
        .with_status(MutexStatus {
            phase,
            ..MutexStatus::default()
        })
        .into_object()
}

#[test]
fn row_shows_kind_namespace_name_and_phase() {
    let row = ObjectRow::from(&mutex("deploy", Some(MutexPhase::Locked)));
    assert_eq!(row.kind, "Mutex");
    assert_eq!(row.namespace, "team-a");
    assert_eq!(row.name, "deploy");
    assert_eq!(row.phase, "Locked");
    assert_eq!(row.version, 3);
}

#[test]
fn unset_phase_renders_as_dash() {
    let row = ObjectRow::from(&mutex("fresh", None));
    assert_eq!(row.phase, "-");
}

#[test]
fn table_has_header_and_one_line_per_object() {
    let table = object_table(&[mutex("a", None), mutex("b", Some(MutexPhase::Unlocked))]);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("KIND"));
    assert!(lines[1].contains(" a "));
    assert!(lines[2].contains("Unlocked"));
}

#[parameterized(
    seconds = { 42, "42s" },
    minutes = { 125, "2m 5s" },
    hours = { 3 * 3600 + 5 * 60 + 9, "3h 5m" },
    zero = { 0, "0s" },
)]
fn uptime_formatting(secs: u64, expected: &str) {
    assert_eq!(format_uptime(secs), expected);
}
