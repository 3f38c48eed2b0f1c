//! Merge logic combining a local and a remote collection snapshot.
//!
//! This is the core of determinism. Given the local snapshot and the remote
//! snapshot of one collection, it produces a single consistent dataset with
//! one entry per unique id.
//!
//! # Algorithm
//!
//! 1. Seed an id-keyed map with every remote record (remote is the source
//!    of truth for records present remotely)
//! 2. For every local record: insert it if its id is unseen; if both sides
//!    carry `updatedAt` and the local timestamp is strictly later, the
//!    local record replaces the remote one; otherwise remote stands
//! 3. Output the map's values
//!
//! Ties and records missing `updatedAt` on either side keep the remote
//! record. This is plain last-write-wins on a single timestamp field - no
//! vector clocks, no operational transforms. A single pharmacy terminal
//! syncing after being offline does not justify more, and wall-clock skew
//! between devices is deliberately left unaddressed.

use crate::{Record, RecordId};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Merge a local snapshot with a remote snapshot, last-write-wins by id.
///
/// Callers must not depend on the ordering of the output; it is id-keyed,
/// not sequence-ordered.
pub fn merge_records(
    local: impl IntoIterator<Item = Record>,
    remote: impl IntoIterator<Item = Record>,
) -> Vec<Record> {
    let mut by_id: BTreeMap<RecordId, Record> = BTreeMap::new();

    for record in remote {
        by_id.insert(record.id.clone(), record);
    }

    for record in local {
        match by_id.entry(record.id.clone()) {
            // Local-only record not yet seen remotely survives the merge
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if let (Some(local_at), Some(remote_at)) = (record.updated_at, slot.get().updated_at)
                {
                    if local_at > remote_at {
                        slot.insert(record);
                    }
                }
                // Either side missing updatedAt: remote wins by default
            }
        }
    }

    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn record(id: &str, updated_at: Option<&str>, name: &str) -> Record {
        let mut r = Record::new(
            id,
            ts("2024-01-01T00:00:00Z"),
            match json!({"name": name}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        );
        r.updated_at = updated_at.map(ts);
        r
    }

    fn find<'a>(merged: &'a [Record], id: &str) -> &'a Record {
        merged.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn later_local_timestamp_wins() {
        let local = vec![record("m1", Some("2024-01-02T00:00:00Z"), "local")];
        let remote = vec![record("m1", Some("2024-01-01T00:00:00Z"), "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(find(&merged, "m1").field("name"), Some(&json!("local")));
    }

    #[test]
    fn later_remote_timestamp_wins() {
        let local = vec![record("m1", Some("2024-01-01T00:00:00Z"), "local")];
        let remote = vec![record("m1", Some("2024-01-03T00:00:00Z"), "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(find(&merged, "m1").field("name"), Some(&json!("remote")));
    }

    #[test]
    fn equal_timestamps_keep_remote() {
        let local = vec![record("m1", Some("2024-01-02T00:00:00Z"), "local")];
        let remote = vec![record("m1", Some("2024-01-02T00:00:00Z"), "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(find(&merged, "m1").field("name"), Some(&json!("remote")));
    }

    #[test]
    fn missing_local_timestamp_keeps_remote() {
        let local = vec![record("m1", None, "local")];
        let remote = vec![record("m1", Some("2024-01-01T00:00:00Z"), "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(find(&merged, "m1").field("name"), Some(&json!("remote")));
    }

    #[test]
    fn missing_remote_timestamp_keeps_remote() {
        // Even a timestamped local record loses when the remote copy has no
        // updatedAt: timestamps that cannot be compared default to remote.
        let local = vec![record("m1", Some("2024-06-01T00:00:00Z"), "local")];
        let remote = vec![record("m1", None, "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(find(&merged, "m1").field("name"), Some(&json!("remote")));
    }

    #[test]
    fn local_only_record_survives() {
        let local = vec![record("m2", None, "local-only")];
        let remote = vec![record("m1", None, "remote")];

        let merged = merge_records(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(find(&merged, "m2").field("name"), Some(&json!("local-only")));
    }

    #[test]
    fn remote_only_record_survives() {
        let local: Vec<Record> = vec![];
        let remote = vec![record("m1", None, "remote-only")];

        let merged = merge_records(local, remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "m1");
    }

    #[test]
    fn both_sides_empty() {
        let merged = merge_records(Vec::new(), Vec::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let local = vec![
            record("m1", Some("2024-01-02T00:00:00Z"), "local"),
            record("m2", None, "local-only"),
        ];
        let remote = vec![
            record("m1", Some("2024-01-01T00:00:00Z"), "remote"),
            record("m3", Some("2024-01-01T00:00:00Z"), "remote-only"),
        ];

        let once = merge_records(local, remote.clone());
        let twice = merge_records(once.clone(), remote);
        assert_eq!(once, twice);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn arb_updated_at() -> impl Strategy<Value = Option<Timestamp>> {
            proptest::option::of((0i64..1_000_000).prop_map(|secs| {
                chrono::DateTime::from_timestamp(secs, 0).unwrap()
            }))
        }

        fn arb_record(ids: std::ops::Range<u8>) -> impl Strategy<Value = Record> {
            (ids, arb_updated_at(), "[a-z]{1,8}").prop_map(|(id, updated_at, name)| {
                let mut r = record(&format!("id-{}", id), None, &name);
                r.updated_at = updated_at;
                r
            })
        }

        fn arb_snapshot() -> impl Strategy<Value = Vec<Record>> {
            // Overlapping id space so conflicts actually occur
            prop::collection::vec(arb_record(0..10), 0..12).prop_map(|records| {
                // Dedup within one snapshot: a collection never holds two
                // records with the same id
                let mut seen = BTreeSet::new();
                records
                    .into_iter()
                    .filter(|r| seen.insert(r.id.clone()))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prop_no_duplicate_ids(local in arb_snapshot(), remote in arb_snapshot()) {
                let merged = merge_records(local, remote);
                let ids: BTreeSet<_> = merged.iter().map(|r| r.id.clone()).collect();
                prop_assert_eq!(ids.len(), merged.len());
            }

            #[test]
            fn prop_id_set_is_union(local in arb_snapshot(), remote in arb_snapshot()) {
                let expected: BTreeSet<_> = local
                    .iter()
                    .chain(remote.iter())
                    .map(|r| r.id.clone())
                    .collect();

                let merged = merge_records(local, remote);
                let actual: BTreeSet<_> = merged.iter().map(|r| r.id.clone()).collect();
                prop_assert_eq!(actual, expected);
            }

            #[test]
            fn prop_idempotent(local in arb_snapshot(), remote in arb_snapshot()) {
                let once = merge_records(local, remote.clone());
                let twice = merge_records(once.clone(), remote);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_deterministic(local in arb_snapshot(), remote in arb_snapshot()) {
                let a = merge_records(local.clone(), remote.clone());
                let b = merge_records(local, remote);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn prop_winner_has_latest_comparable_timestamp(
                local in arb_snapshot(),
                remote in arb_snapshot(),
            ) {
                let merged = merge_records(local.clone(), remote.clone());

                for r in &merged {
                    let local_copy = local.iter().find(|c| c.id == r.id);
                    let remote_copy = remote.iter().find(|c| c.id == r.id);

                    match (local_copy, remote_copy) {
                        (Some(l), Some(rem)) => match (l.updated_at, rem.updated_at) {
                            (Some(lu), Some(ru)) if lu > ru => prop_assert_eq!(r, l),
                            // Ties, older local, or incomparable: remote wins
                            _ => prop_assert_eq!(r, rem),
                        },
                        (Some(l), None) => prop_assert_eq!(r, l),
                        (None, Some(rem)) => prop_assert_eq!(r, rem),
                        (None, None) => prop_assert!(false, "record from nowhere"),
                    }
                }
            }
        }
    }
}
