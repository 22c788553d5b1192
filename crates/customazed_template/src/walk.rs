//! Structural traversal of string leaves.
//!
//! Documents opt in by implementing [`Walk`], visiting every string they own.
//! Generic JSON documents are covered by the `serde_json::Value` impl; typed
//! configuration structs write their visitor by hand.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A value whose string leaves can be rewritten in place.
pub trait Walk {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String));
}

impl Walk for String {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(self)
    }
}

impl<T: Walk> Walk for Option<T> {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        if let Some(value) = self {
            value.walk_strings(visit);
        }
    }
}

impl<T: Walk> Walk for Box<T> {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        self.as_mut().walk_strings(visit)
    }
}

impl<T: Walk> Walk for Vec<T> {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        for item in self.iter_mut() {
            item.walk_strings(visit);
        }
    }
}

/// Map values are visited; keys are left alone.
impl<K: Ord, V: Walk> Walk for BTreeMap<K, V> {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        for value in self.values_mut() {
            value.walk_strings(visit);
        }
    }
}

impl<K: Eq + Hash, V: Walk> Walk for HashMap<K, V> {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        for value in self.values_mut() {
            value.walk_strings(visit);
        }
    }
}

impl Walk for serde_json::Value {
    fn walk_strings(&mut self, visit: &mut dyn FnMut(&mut String)) {
        match self {
            serde_json::Value::String(s) => visit(s),
            serde_json::Value::Array(items) => items.walk_strings(visit),
            serde_json::Value::Object(map) => {
                for value in map.values_mut() {
                    value.walk_strings(visit);
                }
            }
            serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {}
        }
    }
}

macro_rules! walk_scalar {
    ($($ty:ty),*) => {
        $(
            impl Walk for $ty {
                fn walk_strings(&mut self, _visit: &mut dyn FnMut(&mut String)) {}
            }
        )*
    };
}

walk_scalar!(bool, i32, i64, u32, u64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walk_json_visits_every_string() {
        let mut doc = json!({
            "name": "a",
            "count": 3,
            "tags": ["b", {"nested": "c"}, null],
            "enabled": true
        });

        let mut seen = Vec::new();
        doc.walk_strings(&mut |s: &mut String| {
            seen.push(s.clone());
            s.make_ascii_uppercase();
        });

        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(doc["tags"][1]["nested"], "C");
        assert_eq!(doc["count"], 3);
    }

    #[test]
    fn test_walk_maps_leave_keys() {
        let mut map = BTreeMap::new();
        map.insert("key".to_string(), "value".to_string());
        map.walk_strings(&mut |s: &mut String| s.push('!'));
        assert_eq!(map.get("key").map(String::as_str), Some("value!"));
    }
}
