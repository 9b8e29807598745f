use axum::{extract::State, Json};
use common::Envelope;
use serde_json::Value;

use crate::errors::ApiError;
use crate::state::AppState;

/// Services catalog, returned as stored.
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Envelope<Value>>, ApiError> {
    let services = state.catalog.list().await?;
    Ok(Json(Envelope::success(200, services)))
}
