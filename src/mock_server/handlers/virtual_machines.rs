//! Virtual machine endpoint handlers.
//!
//! Virtual machines are the one collection with side effects: creating,
//! deleting and power actions queue transactions the way OnApp does.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{envelope, errors, not_found, unwrap_body, SharedState};
use crate::{Resource, VirtualMachine, VirtualMachineAction};

const COLLECTION: &str = "virtual_machines";
const PARENT_TYPE: &str = "VirtualMachine";

/// Fields a create request must carry.
const REQUIRED: [&str; 3] = ["label", "hostname", "template_id"];

/// POST /virtual_machines.json
///
/// Queues provisioning, disk build and startup as a dependent chain.
pub async fn create(state: SharedState, body: Value) -> Response {
    let (key, mut fields) = match unwrap_body(body) {
        Ok(parts) => parts,
        Err(response) => return response,
    };
    if key != VirtualMachine::KEY {
        return errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            "base",
            "expected parameters under 'virtual_machine'",
        );
    }
    if let Some(missing) = REQUIRED
        .iter()
        .find(|name| fields.get(**name).map_or(true, Value::is_null))
    {
        return errors(StatusCode::UNPROCESSABLE_ENTITY, missing, "can't be blank");
    }

    let mut state = state.write().await;

    let id = state.allocate_id();
    let now = chrono::Utc::now().to_rfc3339();
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("identifier".to_string(), Value::from(format!("vm{id:x}qz")));
    fields.insert("booted".to_string(), Value::Bool(false));
    fields.insert("built".to_string(), Value::Bool(false));
    fields.insert("locked".to_string(), Value::Bool(true));
    fields.insert("created_at".to_string(), Value::from(now.clone()));
    fields.insert("updated_at".to_string(), Value::from(now));
    fields.remove("required_virtual_machine_build");
    fields.remove("required_virtual_machine_startup");

    let vm = Value::Object(fields);
    let response = envelope(VirtualMachine::KEY, &vm);
    state.insert(COLLECTION, VirtualMachine::KEY, id, vm);

    let provision = state.record_transaction("provision_virtual_server", PARENT_TYPE, id, None);
    let build = state.record_transaction("build_disk", PARENT_TYPE, id, Some(provision));
    state.record_transaction("startup_virtual_server", PARENT_TYPE, id, Some(build));

    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /virtual_machines/{id}/{action}.json
pub async fn action(state: SharedState, id: u64, name: &str) -> Response {
    let Ok(action) = name.parse::<VirtualMachineAction>() else {
        return not_found();
    };

    let mut state = state.write().await;

    let Some(vm) = state.get_mut(COLLECTION, id) else {
        return not_found();
    };
    match action {
        VirtualMachineAction::Startup | VirtualMachineAction::Reboot => {
            vm["booted"] = Value::Bool(true);
        }
        VirtualMachineAction::Shutdown | VirtualMachineAction::Stop => {
            vm["booted"] = Value::Bool(false);
        }
        VirtualMachineAction::Suspend => {
            let suspended = vm["suspended"].as_bool().unwrap_or(false);
            vm["suspended"] = Value::Bool(!suspended);
        }
        VirtualMachineAction::Unlock => {
            vm["locked"] = Value::Bool(false);
        }
        VirtualMachineAction::ResetPassword => {}
    }
    let response = envelope(VirtualMachine::KEY, vm);

    if let Some(tx_action) = action.transaction_action() {
        state.record_transaction(tx_action, PARENT_TYPE, id, None);
    }

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /virtual_machines/{id}/status.json
pub async fn status(state: SharedState, id: u64) -> Response {
    let state = state.read().await;

    let Some(vm) = state.get(COLLECTION, id) else {
        return not_found();
    };
    let status = json!({
        "id": id,
        "booted": vm.get("booted").cloned().unwrap_or(Value::Bool(false)),
        "built": vm.get("built").cloned().unwrap_or(Value::Bool(false)),
        "locked": vm.get("locked").cloned().unwrap_or(Value::Bool(false)),
        "suspended": vm.get("suspended").cloned().unwrap_or(Value::Bool(false)),
    });

    (StatusCode::OK, Json(envelope(VirtualMachine::KEY, &status))).into_response()
}

/// DELETE /virtual_machines/{id}.json
pub async fn delete(state: SharedState, id: u64) -> Response {
    let mut state = state.write().await;

    if state.remove(COLLECTION, id).is_none() {
        return not_found();
    }
    state.record_transaction("destroy_virtual_server", PARENT_TYPE, id, None);

    StatusCode::NO_CONTENT.into_response()
}
