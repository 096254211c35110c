use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct CacheInner {
    /// What render paths see: last fetch plus any unconfirmed optimistic
    /// patches.
    current: Arc<Map<String, Value>>,
    /// Last server-fetched snapshot; the rollback target on write failure.
    last_fetched: Arc<Map<String, Value>>,
}

/// Shared settings snapshot for one campaign, UI-named keys.
///
/// Mutation is always replace-with-merged-copy: readers holding an earlier
/// `Arc` never observe a half-applied patch.
#[derive(Debug, Clone, Default)]
pub struct SettingsCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Map<String, Value>> {
        self.inner.lock().unwrap().current.clone()
    }

    /// Installs a server-fetched snapshot, discarding any optimistic state.
    pub fn store_fetched(&self, snapshot: Map<String, Value>) {
        let snapshot = Arc::new(snapshot);
        let mut inner = self.inner.lock().unwrap();
        inner.current = snapshot.clone();
        inner.last_fetched = snapshot;
    }

    /// Applies one optimistic patch. A dotted field shallow-merges only the
    /// addressed child key into the parent object, leaving siblings intact.
    pub fn apply_optimistic(&self, ui_field: &str, value: Value) {
        let mut inner = self.inner.lock().unwrap();
        let mut next = (*inner.current).clone();

        match ui_field.split_once('.') {
            Some((parent, child)) => {
                let mut nested = match next.get(parent) {
                    Some(Value::Object(obj)) => obj.clone(),
                    _ => Map::new(),
                };
                nested.insert(child.to_string(), value);
                next.insert(parent.to_string(), Value::Object(nested));
            }
            None => {
                next.insert(ui_field.to_string(), value);
            }
        }

        inner.current = Arc::new(next);
    }

    /// Discards optimistic patches, restoring the last fetched snapshot.
    pub fn rollback(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.current = inner.last_fetched.clone();
    }
}
