use std::time::{Duration, UNIX_EPOCH};

use proptest::prelude::*;

use super::{Admission, MessageRegistry};
use crate::error::Error;
use crate::severity::Severity;

fn registry() -> MessageRegistry {
    let mut registry = MessageRegistry::new(16);
    registry.register(0, Severity::Info, "FOO_QWE").unwrap();
    registry.register(1, Severity::Error, "FOO_ASD").unwrap();
    registry.register(5, Severity::Debug, "BAR_ZXC").unwrap();
    registry
}

#[test]
fn register_rejects_ids_beyond_capacity() {
    let mut registry = MessageRegistry::new(4);
    let error = registry.register(4, Severity::Info, "X").unwrap_err();
    assert!(matches!(
        error,
        Error::MessageIdOutOfRange { id: 4, capacity: 4 }
    ));
    assert!(registry.is_empty());
}

#[test]
fn reregistering_overwrites_previous_severity() {
    let mut registry = registry();
    registry.set_level(Severity::Debug, None);
    registry.register(0, Severity::Warning, "FOO_QWE").unwrap();

    let info = registry.get(0).unwrap();
    assert_eq!(info.registered_severity(), Severity::Warning);
    assert_eq!(info.effective_severity(), Severity::Warning);
    assert_eq!(registry.len(), 3);
}

#[test]
fn unregistered_slots_are_never_allowed() {
    let registry = registry();
    assert!(!registry.allowed(Severity::Emerg, 2));
    assert!(!registry.allowed(Severity::Emerg, 99));
}

#[test]
fn set_level_with_prefix_counts_matches() {
    let mut registry = registry();
    assert_eq!(registry.set_level(Severity::Debug, Some("FOO_")), 2);
    assert!(registry.allowed(Severity::Debug, 0));
    assert!(registry.allowed(Severity::Debug, 1));
    assert_eq!(registry.set_level(Severity::Emerg, Some("NOPE")), 0);
    assert_eq!(registry.set_level(Severity::Emerg, None), 3);
    assert!(!registry.allowed(Severity::Alert, 5));
}

#[test]
fn set_throttle_with_prefix_counts_matches() {
    let mut registry = registry();
    assert_eq!(
        registry.set_throttle(Some(Duration::from_secs(1)), Some("BAR")),
        1
    );
    assert_eq!(registry.get(5).unwrap().throttle(), Some(Duration::from_secs(1)));
    assert_eq!(registry.get(0).unwrap().throttle(), None);

    assert_eq!(registry.set_throttle(Some(Duration::ZERO), None), 3);
    assert_eq!(registry.get(5).unwrap().throttle(), None);
}

#[test]
fn admit_filters_before_throttling() {
    let mut registry = registry();
    registry.set_throttle(Some(Duration::from_secs(10)), None);
    let now = UNIX_EPOCH + Duration::from_secs(100);

    assert_eq!(registry.admit(Severity::Debug, 0, now), Admission::Filtered);
    assert_eq!(registry.get(0).unwrap().suppressed(), 0);
}

#[test]
fn throttle_counts_suppressed_attempts() {
    let mut registry = registry();
    registry.set_throttle(Some(Duration::from_secs(2)), Some("FOO_QWE"));
    let start = UNIX_EPOCH + Duration::from_secs(1_000);

    assert_eq!(
        registry.admit(Severity::Info, 0, start),
        Admission::Emit { suppressed: 0 }
    );
    assert_eq!(
        registry.admit(Severity::Info, 0, start + Duration::from_secs(1)),
        Admission::Throttled
    );
    assert_eq!(registry.get(0).unwrap().suppressed(), 1);
    assert_eq!(
        registry.admit(Severity::Info, 0, start + Duration::from_secs(2)),
        Admission::Emit { suppressed: 1 }
    );
    assert_eq!(registry.get(0).unwrap().suppressed(), 0);
}

#[test]
fn unthrottled_messages_always_emit() {
    let mut registry = registry();
    let now = UNIX_EPOCH + Duration::from_secs(5);
    for _ in 0..3 {
        assert_eq!(
            registry.admit(Severity::Error, 1, now),
            Admission::Emit { suppressed: 0 }
        );
    }
}

#[test]
fn messages_snapshot_is_in_id_order() {
    let registry = registry();
    let ids: Vec<usize> = registry.messages().iter().map(|info| info.id()).collect();
    assert_eq!(ids, vec![0, 1, 5]);
}

fn any_severity() -> impl Strategy<Value = Severity> {
    (0u8..8).prop_map(|ordinal| Severity::from_ordinal(ordinal).unwrap())
}

proptest! {
    #[test]
    fn allowed_iff_effective_at_least_requested(
        registered in any_severity(),
        effective in any_severity(),
        requested in any_severity(),
    ) {
        let mut registry = MessageRegistry::new(1);
        registry.register(0, registered, "M").unwrap();
        registry.set_level(effective, None);
        prop_assert_eq!(registry.allowed(requested, 0), effective >= requested);
    }
}
