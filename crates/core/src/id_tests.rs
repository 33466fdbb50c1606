use super::*;

#[test]
fn uuid_uids_are_unique() {
    let ids = UuidIdGen;
    let first = ids.next();
    assert_ne!(first, ids.next());
    assert!(uuid::Uuid::parse_str(&first).is_ok());
}

#[test]
fn sequential_uids_are_zero_padded() {
    let ids = SequentialIdGen::default();
    assert_eq!(ids.next(), "uid-0001");
    assert_eq!(ids.next(), "uid-0002");
}

#[test]
fn clones_share_one_counter() {
    let ids = SequentialIdGen::new("obj");
    let cloned = ids.clone();
    assert_eq!(ids.next(), "obj-0001");
    assert_eq!(cloned.next(), "obj-0002");
    assert_eq!(ids.next(), "obj-0003");
}
