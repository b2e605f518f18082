pub mod conferences;
pub mod papers;
pub mod users;

pub use conferences::*;
pub use papers::*;
pub use users::*;

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{json, Value};

use crate::error::AppError;

/// Unwrap a JSON body, reporting malformed input in the API's error format
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
