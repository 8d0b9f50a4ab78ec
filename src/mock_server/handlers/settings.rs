//! Configuration endpoint handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::{envelope, errors, unwrap_body, SharedState};

/// GET /settings/configuration.json
pub async fn get_configuration(state: SharedState) -> Response {
    let state = state.read().await;
    let settings = Value::Object(state.configuration.clone());
    (StatusCode::OK, Json(envelope("settings", &settings))).into_response()
}

/// PUT /settings.json
pub async fn edit_configuration(state: SharedState, body: Value) -> Response {
    let (key, fields) = match unwrap_body(body) {
        Ok(parts) => parts,
        Err(response) => return response,
    };
    if key != "configuration" {
        return errors(
            StatusCode::UNPROCESSABLE_ENTITY,
            "base",
            "expected parameters under 'configuration'",
        );
    }

    let mut state = state.write().await;
    state.configuration.extend(fields);

    StatusCode::NO_CONTENT.into_response()
}
