//! Debounced optimistic settings sync.
//!
//! This module implements the **Functional Core** of the campaign settings
//! sync logic. It acts as a pure state machine:
//! - **Input**: `SyncEvent` (signals from the outside world).
//! - **Output**: `Vec<SyncCommand>` (side effects to be executed by the driver).
//!
//! # Architecture guarantees
//! * **No Network**: This module never builds or sends HTTP requests.
//! * **No Async**: All functions are blocking and CPU-bound (and fast).
//! * **Deterministic**: Given the same initial state and sequence of events,
//!   the output is always identical.
//!
//! The per-field lifecycle is Idle -> Pending (timer armed) -> InFlight
//! (write dispatched) -> Idle. Pending is held in the engine's registry;
//! dispatch clears the entry, so a new edit to the same field starts a fresh
//! cycle even while the previous write is still on the wire.

pub mod cache;
pub mod driver;
pub mod fields;
mod logic;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::SettingsCache;
pub use fields::FieldMap;
pub use types::{SyncCommand, SyncEvent};

use std::collections::HashMap;

use state::EngineState;

/// The settings sync "Brain".
///
/// `SyncEngine` owns the per-field debounce registry and the cached snapshot,
/// and decides which timers, writes, refetches, and notifications the driver
/// must issue.
#[derive(Debug)]
pub struct SyncEngine {
    state: EngineState,
}

impl SyncEngine {
    pub fn new(cache: SettingsCache) -> Self {
        Self {
            state: EngineState {
                fields: FieldMap::new(),
                cache,
                pending: HashMap::new(),
                in_flight: HashMap::new(),
            },
        }
    }

    /// The main event handler.
    ///
    /// Consumes an event and returns the commands the driver must execute.
    pub fn handle_event(&mut self, event: SyncEvent) -> Vec<SyncCommand> {
        match event {
            SyncEvent::Edit { field, value } => logic::on_edit(&mut self.state, field, value),
            SyncEvent::SettleElapsed { field } => logic::on_settle(&mut self.state, field),
            SyncEvent::WriteSucceeded { field } => {
                logic::on_write_succeeded(&mut self.state, field)
            }
            SyncEvent::WriteFailed { field, message } => {
                logic::on_write_failed(&mut self.state, field, message)
            }
            SyncEvent::SnapshotFetched { snapshot } => {
                logic::on_snapshot(&mut self.state, snapshot)
            }
        }
    }

    /// Handle to the shared snapshot cache this engine mutates.
    pub fn cache(&self) -> SettingsCache {
        self.state.cache.clone()
    }

    /// Fields with an armed debounce timer (test only).
    #[cfg(test)]
    pub fn pending_fields(&self) -> Vec<String> {
        self.state.pending.keys().cloned().collect()
    }
}
