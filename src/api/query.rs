use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters of a listing request.
///
/// Values are kept as JSON so intents can carry numbers and booleans as the
/// UI produced them. Absent (`null`) and empty-string values are dropped when
/// encoding, they are never sent as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key/value pairs to append to the URL, in key order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| encode_value(value).map(|encoded| (key.clone(), encoded)))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for QueryParams {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
