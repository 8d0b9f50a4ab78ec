//! HTTP request handlers for the mock server.
//!
//! OnApp paths (`virtual_machines/101.json`) cannot be expressed as axum
//! route patterns because of the `.json` suffix, so every request goes
//! through [`dispatch`], which splits the path and hands it to the
//! resource-specific handlers.

pub mod resources;
pub mod settings;
pub mod transactions;
pub mod virtual_machines;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;
use crate::ListOptions;

/// State handle shared by all handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// Route any request to the matching handler.
pub async fn dispatch(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some(path) = uri
        .path()
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix(".json"))
    else {
        return not_found();
    };
    let segments: Vec<&str> = path.split('/').collect();

    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => return errors(StatusCode::BAD_REQUEST, "base", &e.to_string()),
        }
    };

    let options = ListOptions {
        page: query.get("page").and_then(|p| p.parse().ok()),
        per_page: query.get("per_page").and_then(|p| p.parse().ok()),
    };

    match (method, segments.as_slice()) {
        (Method::GET, ["settings", "configuration"]) => settings::get_configuration(state).await,
        (Method::GET, ["transactions"]) => transactions::list(state, None, options).await,
        (Method::GET, ["virtual_machines", vm, "transactions"]) => match vm.parse() {
            Ok(vm_id) => transactions::list(state, Some(vm_id), options).await,
            Err(_) => not_found(),
        },
        (Method::GET, ["transactions", id]) => match id.parse() {
            Ok(id) => transactions::get(state, id).await,
            Err(_) => not_found(),
        },
        (Method::GET, ["virtual_machines", id, "status"]) => match id.parse() {
            Ok(id) => virtual_machines::status(state, id).await,
            Err(_) => not_found(),
        },
        (Method::GET, ["templates", "all"]) => resources::list(state, "templates", options).await,
        (Method::GET, [collection @ .., last]) => match last.parse::<u64>() {
            Ok(id) => resources::get(state, &collection.join("/"), id).await,
            Err(_) => resources::list(state, path, options).await,
        },

        (Method::POST, ["virtual_machines"]) => virtual_machines::create(state, body).await,
        (Method::POST, ["virtual_machines", id, action]) => match id.parse() {
            Ok(id) => virtual_machines::action(state, id, action).await,
            Err(_) => not_found(),
        },
        (
            Method::POST,
            ["settings", parent @ ("hypervisors" | "hypervisor_zones"), parent_id, join],
        ) if join.ends_with("_joins") => match parent_id.parse() {
            Ok(parent_id) => resources::create_join(state, path, parent, parent_id, body).await,
            Err(_) => not_found(),
        },
        (Method::POST, _) => resources::create(state, path, body).await,

        (Method::PUT, ["settings"]) => settings::edit_configuration(state, body).await,
        (Method::PUT, [collection @ .., last]) => match last.parse::<u64>() {
            Ok(id) => resources::edit(state, &collection.join("/"), id, body).await,
            Err(_) => not_found(),
        },

        (Method::DELETE, ["virtual_machines", id]) => match id.parse() {
            Ok(id) => virtual_machines::delete(state, id).await,
            Err(_) => not_found(),
        },
        (Method::DELETE, [collection @ .., last]) => match last.parse::<u64>() {
            Ok(id) => resources::delete(state, &collection.join("/"), id).await,
            Err(_) => not_found(),
        },

        _ => not_found(),
    }
}

/// Wrap a document under its envelope key.
pub fn envelope(key: &str, value: &Value) -> Value {
    json!({ key: value })
}

/// Split a `{key: {...}}` request body.
///
/// Returns the 422 response OnApp gives for malformed bodies on failure.
pub fn unwrap_body(body: Value) -> Result<(String, Map<String, Value>), Response> {
    match body {
        Value::Object(outer) if outer.len() == 1 => {
            let Some((key, inner)) = outer.into_iter().next() else {
                return Err(errors(StatusCode::UNPROCESSABLE_ENTITY, "base", "empty body"));
            };
            match inner {
                Value::Object(fields) => Ok((key, fields)),
                _ => Err(errors(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "base",
                    "resource parameters must be an object",
                )),
            }
        }
        _ => Err(errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            "base",
            "request body must be a single-key envelope",
        )),
    }
}

/// An OnApp style `{"errors": {field: [message]}}` response.
pub fn errors(status: StatusCode, field: &str, message: &str) -> Response {
    (status, Json(json!({ "errors": { field: [message] } }))).into_response()
}

/// The 404 OnApp gives for unknown resources.
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errors": ["Resource not found"] })),
    )
        .into_response()
}

/// Slice a collection the way OnApp paginates: no totals, all items when
/// `per_page` is absent.
pub fn paginate<T: Clone>(items: &[T], options: ListOptions) -> Vec<T> {
    let Some(per_page) = options.per_page.filter(|n| *n > 0) else {
        return items.to_vec();
    };
    let start = ((options.page_or_first() - 1) * per_page) as usize;
    items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_without_per_page_returns_all() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, ListOptions::default()), items);
    }

    #[test]
    fn test_paginate_pages() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, ListOptions::for_page(2, 2)), vec![3, 4]);
        assert_eq!(paginate(&items, ListOptions::for_page(3, 2)), vec![5]);
        assert!(paginate(&items, ListOptions::for_page(4, 2)).is_empty());
    }

    #[test]
    fn test_unwrap_body() {
        let (key, fields) = unwrap_body(json!({"network": {"label": "n"}})).unwrap();
        assert_eq!(key, "network");
        assert_eq!(fields["label"], "n");

        assert!(unwrap_body(json!({"label": "n", "vlan": 1})).is_err());
        assert!(unwrap_body(json!({"network": 5})).is_err());
    }
}
