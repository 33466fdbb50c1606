// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{before, Clock, FakeClock};
use proptest::prelude::*;
use yare::parameterized;

fn lease(ttl_secs: u64) -> Lease {
    Lease::new(
        ObjectMeta::new("default", "leader"),
        LeaseSpec {
            ttl: Duration::from_secs(ttl_secs),
            tie_break: None,
        },
    )
}

fn req(holder: &str, priority: Option<i32>) -> LeaseRequest {
    request("default", "leader", holder, priority, None)
}

#[test]
fn highest_priority_request_wins() {
    let clock = FakeClock::new();
    let requests = vec![req("low", Some(1)), req("high", Some(5))];
    let out = reconcile(&lease(30), &requests, clock.now(), &Intervals::default());
    assert_eq!(out.status.holder.as_deref(), Some("high"));
    assert_eq!(out.status.phase, Some(LeasePhase::Held));
    assert_eq!(out.status.renew_count, 0);
    assert_eq!(
        out.status.expires_at,
        Some(after(clock.now(), Duration::from_secs(30)))
    );
    assert_eq!(out.action, Action::RequeueAfter(Duration::from_secs(30)));
    assert!(out.effects.contains(&Effect::GrantRequest {
        namespace: "default".to_string(),
        name: "leader-high".to_string(),
    }));
}

#[test]
fn equal_priority_goes_to_first_seen() {
    let requests = vec![req("a", None), req("b", Some(0)), req("c", None)];
    let winner = select_request(&requests, TieBreak::FirstSeen).unwrap();
    assert_eq!(winner.spec.holder, "a");
}

#[test]
fn oldest_tie_break_uses_creation_time() {
    let clock = FakeClock::new();
    let mut first = req("first", Some(2));
    first.metadata.creation_timestamp = Some(clock.now());
    let mut older = req("older", Some(2));
    older.metadata.creation_timestamp = Some(before(clock.now(), Duration::from_secs(5)));
    let requests = vec![first, older];

    assert_eq!(
        select_request(&requests, TieBreak::Oldest).unwrap().spec.holder,
        "older"
    );
    assert_eq!(
        select_request(&requests, TieBreak::FirstSeen)
            .unwrap()
            .spec
            .holder,
        "first"
    );
}

#[test]
fn consumed_requests_are_skipped() {
    let mut granted = req("stale", Some(10));
    granted.status.phase = Some(LeaseRequestPhase::Granted);
    let mut denied = req("gone", Some(9));
    denied.status.phase = Some(LeaseRequestPhase::Denied);
    let mut unset = req("fresh", Some(1));
    unset.status.phase = None;

    let requests = vec![granted, denied, unset];
    assert_eq!(
        select_request(&requests, TieBreak::FirstSeen)
            .unwrap()
            .spec
            .holder,
        "fresh"
    );
}

#[test]
fn request_ttl_overrides_lease_ttl() {
    let clock = FakeClock::new();
    let short = request("default", "leader", "a", None, Some(Duration::from_secs(3)));
    let out = reconcile(&lease(30), &[short], clock.now(), &Intervals::default());
    assert_eq!(
        out.status.expires_at,
        Some(after(clock.now(), Duration::from_secs(3)))
    );
}

#[test]
fn held_lease_ignores_requests_and_waits_for_expiry() {
    let clock = FakeClock::new();
    let mut l = lease(30);
    let first = reconcile(&l, &[req("a", None)], clock.now(), &Intervals::default());
    l.status = first.status;

    clock.advance(Duration::from_secs(10));
    let out = reconcile(&l, &[req("b", Some(100))], clock.now(), &Intervals::default());
    assert_eq!(out.status.holder.as_deref(), Some("a"));
    assert_eq!(out.action, Action::RequeueAfter(Duration::from_secs(20)));
    assert!(out.effects.is_empty());
}

#[test]
fn expired_holder_is_replaced_in_the_same_pass() {
    let clock = FakeClock::new();
    let mut l = lease(5);
    l.status = reconcile(&l, &[req("a", None)], clock.now(), &Intervals::default()).status;

    clock.advance(Duration::from_secs(6));
    let out = reconcile(&l, &[req("b", None)], clock.now(), &Intervals::default());
    assert_eq!(out.status.holder.as_deref(), Some("b"));
    assert!(out
        .events()
        .any(|e| matches!(e, Event::LeaseExpired { holder, .. } if holder == "a")));
    assert!(out
        .events()
        .any(|e| matches!(e, Event::LeaseGranted { holder, .. } if holder == "b")));
}

#[test]
fn expired_holder_without_requests_becomes_available() {
    let clock = FakeClock::new();
    let mut l = lease(5);
    l.status = reconcile(&l, &[req("a", None)], clock.now(), &Intervals::default()).status;
    clock.advance(Duration::from_secs(6));
    let out = reconcile(&l, &[], clock.now(), &Intervals::default());
    assert_eq!(out.status.holder, None);
    assert_eq!(out.status.expires_at, None);
    assert_eq!(out.status.phase, Some(LeasePhase::Available));
    assert_eq!(out.action, Action::RequeueAfter(Duration::from_secs(5)));
}

#[test]
fn renew_extends_and_counts() {
    let clock = FakeClock::new();
    let mut status = LeaseStatus::default();
    status.holder = Some("a".to_string());
    status.expires_at = Some(after(clock.now(), Duration::from_secs(5)));

    clock.advance(Duration::from_secs(3));
    status.renew("a", Duration::from_secs(5), clock.now()).unwrap();
    assert_eq!(status.renew_count, 1);
    assert_eq!(
        status.expires_at,
        Some(after(clock.now(), Duration::from_secs(5)))
    );
    assert!(status.renew("b", Duration::from_secs(5), clock.now()).is_err());

    clock.advance(Duration::from_secs(5));
    status.renew("a", Duration::from_secs(5), clock.now()).unwrap();
    assert_eq!(status.renew_count, 2);

    clock.advance(Duration::from_secs(6));
    assert!(status.renew("a", Duration::from_secs(5), clock.now()).is_err());
}

#[test]
fn release_requires_holder() {
    let mut status = LeaseStatus {
        holder: Some("a".to_string()),
        phase: Some(LeasePhase::Held),
        ..LeaseStatus::default()
    };
    assert!(status.release("b").is_err());
    status.release("a").unwrap();
    assert_eq!(status.holder, None);
    assert_eq!(status.phase, Some(LeasePhase::Available));
}

#[parameterized(
    unset = { None, true },
    pending = { Some(LeaseRequestPhase::Pending), true },
    granted = { Some(LeaseRequestPhase::Granted), false },
    denied = { Some(LeaseRequestPhase::Denied), false },
)]
fn only_pending_requests_can_be_denied(phase: Option<LeaseRequestPhase>, denied: bool) {
    let mut status = LeaseRequestStatus {
        phase,
        message: None,
    };
    let result = status.deny("a stopped waiting");
    assert_eq!(result.is_ok(), denied);
    if denied {
        assert_eq!(status.phase, Some(LeaseRequestPhase::Denied));
    } else {
        assert_eq!(status.phase, phase);
        assert_eq!(status.message, None);
    }
}

proptest! {
    #[test]
    fn grant_goes_to_max_priority_first_seen(priorities in proptest::collection::vec(proptest::option::of(-5i32..5), 1..12)) {
        let clock = FakeClock::new();
        let requests: Vec<LeaseRequest> = priorities
            .iter()
            .enumerate()
            .map(|(i, p)| req(&format!("h{i}"), *p))
            .collect();
        let best = priorities.iter().map(|p| p.unwrap_or(0)).max().unwrap_or(0);
        let expected = priorities.iter().position(|p| p.unwrap_or(0) == best).unwrap();

        let out = reconcile(&lease(30), &requests, clock.now(), &Intervals::default());
        let expected_holder = format!("h{expected}");
        prop_assert_eq!(out.status.holder.as_deref(), Some(expected_holder.as_str()));
    }
}
