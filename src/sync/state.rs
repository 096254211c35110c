use std::collections::HashMap;

use serde_json::Value;

use super::cache::SettingsCache;
use super::fields::FieldMap;

#[derive(Debug)]
pub struct EngineState {
    pub fields: FieldMap,
    pub cache: SettingsCache,

    /// UI field name -> latest unsent value. At most one entry per field;
    /// a newer edit replaces the older one (debounce, not a queue).
    pub pending: HashMap<String, Value>,

    /// UI field name -> number of writes on the wire. Dispatch clears the
    /// pending entry, so a field can re-enter `pending` and dispatch again
    /// before the first write completes; every completion must be matched,
    /// so this is a counter rather than a set.
    pub in_flight: HashMap<String, u32>,
}
