//! Per-request parameter bag merging router-extracted path parameters with a
//! descriptor's static arguments.

use crate::router::ParamVec;
use serde::Serialize;
use serde_json::{Map, Value};

/// Request-local bag of named parameters handed to the handler entry point.
///
/// Values are JSON; array values are recursively converted into nested bags
/// whose keys are the stringified indices, so handlers address everything
/// uniformly by key. Static arguments win over path parameters on key
/// collision.
///
/// The bag lives for exactly one request and needs no synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterBag {
    #[serde(flatten)]
    entries: Map<String, Value>,
}

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the bag the dispatcher hands to handlers: path parameters first,
    /// then the descriptor's static arguments overwriting on collision.
    #[must_use]
    pub fn merged(path_params: &ParamVec, static_args: &Map<String, Value>) -> Self {
        let mut bag = Self::new();
        for (key, value) in path_params {
            bag.set(key.as_ref(), Value::String(value.clone()));
        }
        for (key, value) in static_args {
            bag.set(key.clone(), value.clone());
        }
        bag
    }

    /// Insert a value, deep-converting arrays into nested bags.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), to_bag_value(value));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Convenience accessor for string-valued parameters (the common case
    /// for path parameters).
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Access a nested bag produced from an array or object value.
    #[must_use]
    pub fn nested(&self, key: &str) -> Option<&Map<String, Value>> {
        self.entries.get(key).and_then(Value::as_object)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Consume the bag as a plain JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

/// Arrays become objects keyed by stringified index; objects recurse;
/// scalars pass through.
fn to_bag_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), to_bag_value(item)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, to_bag_value(v)))
                .collect(),
        ),
        scalar => scalar,
    }
}
