#![cfg(test)]
use serde_json::{json, Map, Value};

use crate::notify::NotificationKind;

use super::cache::SettingsCache;
use super::types::{SyncCommand, SyncEvent};
use super::SyncEngine;

// =========================================================================
// Helpers
// =========================================================================

fn fetched_snapshot() -> Map<String, Value> {
    json!({
        "maxDailyPosts": 10,
        "autoReply": false,
        "engagementHours": {"start": "09:00", "end": "21:00", "timezone": "UTC"},
    })
    .as_object()
    .unwrap()
    .clone()
}

fn primed_engine() -> SyncEngine {
    let cache = SettingsCache::new();
    cache.store_fetched(fetched_snapshot());
    SyncEngine::new(cache)
}

fn edit(field: &str, value: Value) -> SyncEvent {
    SyncEvent::Edit {
        field: field.to_string(),
        value,
    }
}

fn settle(field: &str) -> SyncEvent {
    SyncEvent::SettleElapsed {
        field: field.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn first_edit_arms_a_timer() {
    let mut engine = primed_engine();
    let cmds = engine.handle_event(edit("maxDailyPosts", json!(7)));
    assert!(matches!(&cmds[..], [SyncCommand::ArmTimer { field }] if field == "maxDailyPosts"));
}

#[test]
fn repeat_edit_cancels_and_rearms() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(7)));
    let cmds = engine.handle_event(edit("maxDailyPosts", json!(12)));

    assert!(matches!(
        &cmds[..],
        [SyncCommand::CancelTimer { .. }, SyncCommand::ArmTimer { .. }]
    ));

    // Only the most recent value survives.
    let cmds = engine.handle_event(settle("maxDailyPosts"));
    match &cmds[..] {
        [SyncCommand::SendWrite {
            wire_field, value, ..
        }] => {
            assert_eq!(wire_field, "max_daily_posts");
            assert_eq!(*value, json!(12));
        }
        other => panic!("expected one SendWrite, got {other:?}"),
    }
}

#[test]
fn fields_are_debounced_independently() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(7)));
    let cmds = engine.handle_event(edit("autoReply", json!(true)));

    // Field B must not cancel field A's timer.
    assert!(matches!(&cmds[..], [SyncCommand::ArmTimer { field }] if field == "autoReply"));

    let mut pending = engine.pending_fields();
    pending.sort();
    assert_eq!(pending, vec!["autoReply", "maxDailyPosts"]);
}

#[test]
fn settle_applies_optimistic_patch_before_write() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(12)));
    engine.handle_event(settle("maxDailyPosts"));

    assert_eq!(engine.cache().snapshot()["maxDailyPosts"], 12);
}

#[test]
fn settle_clears_the_registry_entry() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(12)));
    engine.handle_event(settle("maxDailyPosts"));

    assert!(engine.pending_fields().is_empty());

    // A fresh edit starts a new cycle while the write is still in flight.
    let cmds = engine.handle_event(edit("maxDailyPosts", json!(13)));
    assert!(matches!(&cmds[..], [SyncCommand::ArmTimer { .. }]));
}

#[test]
fn nested_settle_merges_only_the_addressed_key() {
    let mut engine = primed_engine();
    engine.handle_event(edit("engagementHours.start", json!("10:30")));
    let cmds = engine.handle_event(settle("engagementHours.start"));

    match &cmds[..] {
        [SyncCommand::SendWrite { wire_field, .. }] => {
            assert_eq!(wire_field, "engagement_hours.start")
        }
        other => panic!("expected one SendWrite, got {other:?}"),
    }

    let snap = engine.cache().snapshot();
    assert_eq!(snap["engagementHours"]["start"], "10:30");
    assert_eq!(snap["engagementHours"]["end"], "21:00");
    assert_eq!(snap["engagementHours"]["timezone"], "UTC");
}

#[test]
fn success_refetches_and_notifies_once() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(12)));
    engine.handle_event(settle("maxDailyPosts"));

    let cmds = engine.handle_event(SyncEvent::WriteSucceeded {
        field: "maxDailyPosts".to_string(),
    });

    assert!(matches!(
        &cmds[..],
        [
            SyncCommand::Refetch,
            SyncCommand::Notify {
                kind: NotificationKind::Success,
                ..
            }
        ]
    ));
}

#[test]
fn failure_rolls_back_and_notifies_once() {
    let mut engine = primed_engine();
    engine.handle_event(edit("maxDailyPosts", json!(99)));
    engine.handle_event(settle("maxDailyPosts"));
    assert_eq!(engine.cache().snapshot()["maxDailyPosts"], 99);

    let cmds = engine.handle_event(SyncEvent::WriteFailed {
        field: "maxDailyPosts".to_string(),
        message: "db unavailable".to_string(),
    });

    assert_eq!(engine.cache().snapshot()["maxDailyPosts"], 10);
    match &cmds[..] {
        [SyncCommand::Notify {
            kind: NotificationKind::Error,
            message,
        }] => assert_eq!(message, "db unavailable"),
        other => panic!("expected one error notification, got {other:?}"),
    }
}

#[test]
fn overlapping_writes_to_one_field_each_get_completion_handling() {
    let mut engine = primed_engine();

    // First cycle settles and dispatches; dispatch clears the registry, so
    // a second cycle can settle while the first write is still on the wire.
    engine.handle_event(edit("maxDailyPosts", json!(11)));
    engine.handle_event(settle("maxDailyPosts"));
    engine.handle_event(edit("maxDailyPosts", json!(12)));
    let cmds = engine.handle_event(settle("maxDailyPosts"));
    assert!(matches!(&cmds[..], [SyncCommand::SendWrite { .. }]));

    // Both writes fail: each failure must roll back and notify, the second
    // must not be dropped as stale.
    let first = engine.handle_event(SyncEvent::WriteFailed {
        field: "maxDailyPosts".to_string(),
        message: "db unavailable".to_string(),
    });
    assert!(matches!(
        &first[..],
        [SyncCommand::Notify {
            kind: NotificationKind::Error,
            ..
        }]
    ));

    let second = engine.handle_event(SyncEvent::WriteFailed {
        field: "maxDailyPosts".to_string(),
        message: "db unavailable".to_string(),
    });
    assert!(matches!(
        &second[..],
        [SyncCommand::Notify {
            kind: NotificationKind::Error,
            ..
        }]
    ));
    assert_eq!(engine.cache().snapshot()["maxDailyPosts"], 10);

    // The counter is drained: a third completion really is stale.
    let third = engine.handle_event(SyncEvent::WriteFailed {
        field: "maxDailyPosts".to_string(),
        message: "late".to_string(),
    });
    assert!(third.is_empty());
}

#[test]
fn overlapping_write_success_after_success_still_refetches() {
    let mut engine = primed_engine();

    engine.handle_event(edit("maxDailyPosts", json!(11)));
    engine.handle_event(settle("maxDailyPosts"));
    engine.handle_event(edit("maxDailyPosts", json!(12)));
    engine.handle_event(settle("maxDailyPosts"));

    for _ in 0..2 {
        let cmds = engine.handle_event(SyncEvent::WriteSucceeded {
            field: "maxDailyPosts".to_string(),
        });
        assert!(matches!(
            &cmds[..],
            [
                SyncCommand::Refetch,
                SyncCommand::Notify {
                    kind: NotificationKind::Success,
                    ..
                }
            ]
        ));
    }
}

#[test]
fn stale_completions_are_ignored() {
    let mut engine = primed_engine();
    let cmds = engine.handle_event(SyncEvent::WriteSucceeded {
        field: "maxDailyPosts".to_string(),
    });
    assert!(cmds.is_empty());

    let cmds = engine.handle_event(SyncEvent::WriteFailed {
        field: "maxDailyPosts".to_string(),
        message: "late".to_string(),
    });
    assert!(cmds.is_empty());
}

#[test]
fn settle_without_pending_edit_is_a_no_op() {
    let mut engine = primed_engine();
    let cmds = engine.handle_event(settle("maxDailyPosts"));
    assert!(cmds.is_empty());
}

#[test]
fn snapshot_translates_wire_names_to_ui_names() {
    let mut engine = primed_engine();
    let snapshot = json!({
        "max_daily_posts": 20,
        "auto_reply": true,
        "engagement_hours": {"start": "08:00", "end": "20:00", "timezone": "UTC"},
    })
    .as_object()
    .unwrap()
    .clone();

    engine.handle_event(SyncEvent::SnapshotFetched { snapshot });

    let snap = engine.cache().snapshot();
    assert_eq!(snap["maxDailyPosts"], 20);
    assert_eq!(snap["autoReply"], true);
    assert_eq!(snap["engagementHours"]["start"], "08:00");
}

#[test]
fn snapshot_skips_unknown_wire_fields() {
    let mut engine = primed_engine();
    let snapshot = json!({
        "max_daily_posts": 20,
        "brand_new_server_field": "surprise",
    })
    .as_object()
    .unwrap()
    .clone();

    engine.handle_event(SyncEvent::SnapshotFetched { snapshot });

    let snap = engine.cache().snapshot();
    assert_eq!(snap["maxDailyPosts"], 20);
    assert!(!snap.contains_key("brandNewServerField"));
    assert!(!snap.contains_key("brand_new_server_field"));
}

#[test]
fn snapshot_keeps_free_form_object_fields_wholesale() {
    let mut engine = primed_engine();
    let snapshot = json!({
        "platform_settings": {"twitter": {"tone": "hype"}},
    })
    .as_object()
    .unwrap()
    .clone();

    engine.handle_event(SyncEvent::SnapshotFetched { snapshot });

    // platform_settings has no dotted mappings; its contents pass through.
    let snap = engine.cache().snapshot();
    assert_eq!(snap["platformSettings"]["twitter"]["tone"], "hype");
}

#[test]
fn unknown_ui_field_still_reaches_the_wire() {
    let mut engine = primed_engine();
    engine.handle_event(edit("futureSetting", json!(1)));
    let cmds = engine.handle_event(settle("futureSetting"));

    match &cmds[..] {
        [SyncCommand::SendWrite { wire_field, .. }] => assert_eq!(wire_field, "futureSetting"),
        other => panic!("expected one SendWrite, got {other:?}"),
    }
}
