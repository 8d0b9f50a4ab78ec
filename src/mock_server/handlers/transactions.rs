//! Transaction endpoint handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::{envelope, not_found, paginate, SharedState};
use crate::mock_server::state::TRANSACTIONS;
use crate::{ListOptions, Resource, Transaction};

/// GET /transactions.json and /virtual_machines/{id}/transactions.json
///
/// Newest first, like OnApp.
pub async fn list(state: SharedState, vm_id: Option<u64>, options: ListOptions) -> Response {
    let state = state.read().await;

    let all: Vec<Value> = state
        .list_transactions(vm_id)
        .into_iter()
        .map(|tx| envelope(Transaction::KEY, tx))
        .collect();

    (StatusCode::OK, Json(paginate(&all, options))).into_response()
}

/// GET /transactions/{id}.json
///
/// Every read moves an unfinished transaction one step forward, so polling
/// clients observe pending, running and then a final state.
pub async fn get(state: SharedState, id: u64) -> Response {
    let mut state = state.write().await;

    let Some(current) = state.get(TRANSACTIONS, id).cloned() else {
        return not_found();
    };
    state.advance_transaction(id);

    (StatusCode::OK, Json(envelope(Transaction::KEY, &current))).into_response()
}
