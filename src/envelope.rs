//! Envelope handling for OnApp payloads.
//!
//! OnApp wraps every resource representation under a single key named after
//! the resource (`{"hypervisor": {...}}`), and collections are arrays of such
//! envelopes. Request bodies for create/edit use the same convention.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{OnAppError, Result};

/// Path of a collection endpoint, e.g. `settings/hypervisors.json`.
pub fn collection_path(collection: &str) -> String {
    format!("{collection}.json")
}

/// Path of a single item endpoint, e.g. `settings/hypervisors/7.json`.
pub fn item_path(collection: &str, id: u64) -> String {
    format!("{collection}/{id}.json")
}

/// Wrap a serializable value under `key`.
pub fn wrap<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value> {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(map))
}

/// Unwrap a single enveloped resource.
///
/// Bare objects (more than one key) are decoded as-is since a few endpoints
/// skip the envelope. A single-key object under the wrong key is rejected.
pub fn unwrap_one<T: DeserializeOwned>(key: &'static str, value: Value) -> Result<T> {
    match value {
        Value::Object(mut map) => {
            if let Some(inner) = map.remove(key) {
                return Ok(serde_json::from_value(inner)?);
            }
            if map.len() <= 1 {
                return Err(OnAppError::Envelope { expected: key });
            }
            Ok(serde_json::from_value(Value::Object(map))?)
        }
        _ => Err(OnAppError::Envelope { expected: key }),
    }
}

/// Unwrap a JSON array of enveloped resources.
pub fn unwrap_list<T: DeserializeOwned>(key: &'static str, value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => items.into_iter().map(|v| unwrap_one(key, v)).collect(),
        _ => Err(OnAppError::Envelope { expected: key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Thing {
        id: u64,
        label: String,
    }

    #[test]
    fn test_paths() {
        assert_eq!(collection_path("settings/hypervisors"), "settings/hypervisors.json");
        assert_eq!(item_path("settings/hypervisors", 7), "settings/hypervisors/7.json");
    }

    #[test]
    fn test_wrap() {
        let wrapped = wrap("thing", &Thing { id: 1, label: "a".into() }).unwrap();
        assert_eq!(wrapped, json!({"thing": {"id": 1, "label": "a"}}));
    }

    #[test]
    fn test_unwrap_one() {
        let thing: Thing = unwrap_one("thing", json!({"thing": {"id": 3, "label": "x"}})).unwrap();
        assert_eq!(thing, Thing { id: 3, label: "x".into() });
    }

    #[test]
    fn test_unwrap_one_bare_object() {
        let thing: Thing = unwrap_one("thing", json!({"id": 3, "label": "x"})).unwrap();
        assert_eq!(thing.id, 3);
    }

    #[test]
    fn test_unwrap_one_wrong_key() {
        let err = unwrap_one::<Thing>("thing", json!({"other": {"id": 3, "label": "x"}}))
            .unwrap_err();
        assert!(matches!(err, OnAppError::Envelope { expected: "thing" }));
    }

    #[test]
    fn test_unwrap_list() {
        let things: Vec<Thing> = unwrap_list(
            "thing",
            json!([
                {"thing": {"id": 1, "label": "a"}},
                {"thing": {"id": 2, "label": "b"}}
            ]),
        )
        .unwrap();
        assert_eq!(things.len(), 2);
        assert_eq!(things[1].label, "b");
    }

    #[test]
    fn test_unwrap_list_rejects_object() {
        let err = unwrap_list::<Thing>("thing", json!({"thing": []})).unwrap_err();
        assert!(matches!(err, OnAppError::Envelope { .. }));
    }
}
