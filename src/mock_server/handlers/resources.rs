//! Generic collection handlers.
//!
//! Any collection registered in [`MockState`](crate::mock_server::MockState)
//! supports list, get, create, edit and delete.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::{envelope, errors, not_found, paginate, unwrap_body, SharedState};
use crate::ListOptions;

/// GET /{collection}.json
pub async fn list(state: SharedState, collection: &str, options: ListOptions) -> Response {
    let state = state.read().await;

    let Some(key) = state.key_of(collection) else {
        return (StatusCode::OK, Json(Value::Array(vec![]))).into_response();
    };

    let all: Vec<Value> = state
        .list(collection)
        .into_iter()
        .map(|item| envelope(key, item))
        .collect();

    (StatusCode::OK, Json(paginate(&all, options))).into_response()
}

/// GET /{collection}/{id}.json
pub async fn get(state: SharedState, collection: &str, id: u64) -> Response {
    let state = state.read().await;

    match (state.key_of(collection), state.get(collection, id)) {
        (Some(key), Some(item)) => (StatusCode::OK, Json(envelope(key, item))).into_response(),
        _ => not_found(),
    }
}

/// POST /{collection}.json
pub async fn create(state: SharedState, collection: &str, body: Value) -> Response {
    let (key, mut fields) = match unwrap_body(body) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let mut state = state.write().await;

    if let Some(expected) = state.key_of(collection) {
        if expected != key {
            return errors(
                StatusCode::UNPROCESSABLE_ENTITY,
                "base",
                &format!("expected parameters under '{expected}'"),
            );
        }
    }

    let id = state.allocate_id();
    let now = chrono::Utc::now().to_rfc3339();
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("created_at".to_string(), Value::from(now.clone()));
    fields.insert("updated_at".to_string(), Value::from(now));

    let item = Value::Object(fields);
    let response = envelope(&key, &item);
    state.insert(collection, &key, id, item);

    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /settings/{hypervisors|hypervisor_zones}/{id}/{join}s.json
///
/// Join bodies arrive bare, without an envelope key.
pub async fn create_join(
    state: SharedState,
    collection: &str,
    parent: &str,
    parent_id: u64,
    body: Value,
) -> Response {
    let Value::Object(mut fields) = body else {
        return errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            "base",
            "expected a JSON object",
        );
    };

    let key = collection
        .rsplit('/')
        .next()
        .and_then(|last| last.strip_suffix('s'))
        .unwrap_or(collection)
        .to_string();
    let target_type = if parent == "hypervisor_zones" {
        "HypervisorGroup"
    } else {
        "Hypervisor"
    };

    let mut state = state.write().await;

    let id = state.allocate_id();
    let now = chrono::Utc::now().to_rfc3339();
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("target_join_id".to_string(), Value::from(parent_id));
    fields.insert("target_join_type".to_string(), Value::from(target_type));
    fields.insert("created_at".to_string(), Value::from(now.clone()));
    fields.insert("updated_at".to_string(), Value::from(now));

    let item = Value::Object(fields);
    let response = envelope(&key, &item);
    state.insert(collection, &key, id, item);

    (StatusCode::CREATED, Json(response)).into_response()
}

/// PUT /{collection}/{id}.json
pub async fn edit(state: SharedState, collection: &str, id: u64, body: Value) -> Response {
    let (key, fields) = match unwrap_body(body) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let mut state = state.write().await;

    if state.key_of(collection).is_some_and(|expected| expected != key) {
        return errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            "base",
            "unexpected envelope key",
        );
    }

    let Some(Value::Object(item)) = state.get_mut(collection, id) else {
        return not_found();
    };
    for (name, value) in fields {
        if name != "id" {
            item.insert(name, value);
        }
    }
    item.insert(
        "updated_at".to_string(),
        Value::from(chrono::Utc::now().to_rfc3339()),
    );

    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /{collection}/{id}.json
pub async fn delete(state: SharedState, collection: &str, id: u64) -> Response {
    let mut state = state.write().await;

    match state.remove(collection, id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}
