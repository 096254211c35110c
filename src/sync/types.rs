use serde_json::{Map, Value};

use crate::notify::NotificationKind;

/// Signals from the outside world: UI edits, timer settles, write and fetch
/// completions.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// One user edit event (keystroke, slider tick, toggle). UI field name.
    Edit { field: String, value: Value },
    /// The field's debounce timer fired.
    SettleElapsed { field: String },
    WriteSucceeded { field: String },
    WriteFailed { field: String, message: String },
    /// A settings fetch completed; keys are wire-named.
    SnapshotFetched { snapshot: Map<String, Value> },
}

/// Side effects the driver must execute.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    ArmTimer { field: String },
    CancelTimer { field: String },
    SendWrite {
        field: String,
        wire_field: String,
        value: Value,
    },
    Refetch,
    Notify {
        kind: NotificationKind,
        message: String,
    },
}
