use serde_json::{Map, Value};

use crate::notify::NotificationKind;

use super::state::EngineState;
use super::types::SyncCommand;

pub fn on_edit(state: &mut EngineState, field: String, value: Value) -> Vec<SyncCommand> {
    let mut cmds = Vec::new();

    // Debounce replacement: only the most recent value survives.
    if state.pending.insert(field.clone(), value).is_some() {
        log::trace!("[ENGINE] superseding pending edit for {field}");
        cmds.push(SyncCommand::CancelTimer {
            field: field.clone(),
        });
    }

    cmds.push(SyncCommand::ArmTimer { field });
    cmds
}

pub fn on_settle(state: &mut EngineState, field: String) -> Vec<SyncCommand> {
    let Some(value) = state.pending.remove(&field) else {
        log::warn!("[ENGINE] settle for {field} with no pending edit");
        return Vec::new();
    };

    let wire_field = state.fields.to_wire(&field);

    // Optimistic patch before the round-trip completes; the error path
    // rolls this back, the success path refetches over it.
    state.cache.apply_optimistic(&field, value.clone());
    *state.in_flight.entry(field.clone()).or_insert(0) += 1;

    log::debug!("[ENGINE] dispatching write {field} -> {wire_field}");

    vec![SyncCommand::SendWrite {
        field,
        wire_field,
        value,
    }]
}

/// Matches one completion against the in-flight counter. A field can have
/// several writes on the wire at once (dispatch clears the pending entry, so
/// a new edit cycle can settle before the previous write lands); each one
/// gets its own completion handling.
fn take_in_flight(state: &mut EngineState, field: &str) -> bool {
    match state.in_flight.get_mut(field) {
        Some(count) => {
            *count -= 1;
            if *count == 0 {
                state.in_flight.remove(field);
            }
            true
        }
        None => false,
    }
}

pub fn on_write_succeeded(state: &mut EngineState, field: String) -> Vec<SyncCommand> {
    if !take_in_flight(state, &field) {
        log::warn!("[ENGINE] stale success for {field}, ignoring");
        return Vec::new();
    }

    // Server truth wins: the refetch reconciles any divergence from
    // concurrent edits to other fields.
    vec![
        SyncCommand::Refetch,
        SyncCommand::Notify {
            kind: NotificationKind::Success,
            message: "Settings updated".to_string(),
        },
    ]
}

pub fn on_write_failed(state: &mut EngineState, field: String, message: String) -> Vec<SyncCommand> {
    if !take_in_flight(state, &field) {
        log::warn!("[ENGINE] stale failure for {field}, ignoring");
        return Vec::new();
    }

    log::debug!("[ENGINE] write failed for {field}: {message}");

    // Roll back to the last fetched snapshot. This may also discard other
    // unconfirmed optimistic edits; the periodic refetch bounds the
    // divergence either way.
    state.cache.rollback();

    vec![SyncCommand::Notify {
        kind: NotificationKind::Error,
        message,
    }]
}

pub fn on_snapshot(state: &mut EngineState, snapshot: Map<String, Value>) -> Vec<SyncCommand> {
    let mut ui_map = Map::new();

    for (wire_key, value) in snapshot {
        let Some(ui_key) = state.fields.to_ui(&wire_key) else {
            // Unknown server field: skipping beats guessing a UI name.
            continue;
        };

        let translated = match value {
            Value::Object(obj) if state.fields.has_nested(&wire_key) => {
                Value::Object(translate_children(state, &wire_key, &obj))
            }
            other => other,
        };

        ui_map.insert(ui_key.to_string(), translated);
    }

    state.cache.store_fetched(ui_map);
    Vec::new()
}

/// Child keys of a nested settings object, translated through the dotted
/// entries of the field map. Unknown children are skipped like unknown
/// top-level fields.
fn translate_children(
    state: &EngineState,
    wire_parent: &str,
    obj: &Map<String, Value>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (child, value) in obj {
        match state.fields.to_ui(&format!("{wire_parent}.{child}")) {
            Some(dotted_ui) => {
                let ui_child = dotted_ui.split_once('.').map(|(_, c)| c).unwrap_or(dotted_ui);
                out.insert(ui_child.to_string(), value.clone());
            }
            None => continue,
        }
    }
    out
}
