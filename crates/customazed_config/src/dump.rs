//! Configuration dumps.

use serde_json::{Map, Value};

use crate::error::ConfigResult;
use crate::model::Config;

/// Drop empty strings, `false`, nulls and containers left empty.
pub fn prune_empty(value: Value) -> Option<Value> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune_empty).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune_empty(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

/// Pretty JSON of the settings that are actually set.
pub fn dump(config: &Config) -> ConfigResult<String> {
    let value = prune_empty(serde_json::to_value(config)?).unwrap_or(Value::Object(Map::new()));
    Ok(serde_json::to_string_pretty(&value)?)
}
