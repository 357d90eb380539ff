//! Geolocation endpoints.

use axum::{extract::State, routing::get, Router};

use pulso_common::AppResult;
use pulso_core::Position;

use crate::{middleware::AppState, response::ApiResponse};

/// Resolve the caller's position.
///
/// Unlike the map view this does not fall back: a denied, failed or
/// timed out lookup surfaces as the matching error so the client can
/// decide what to do with it.
async fn geolocate(State(state): State<AppState>) -> AppResult<ApiResponse<Position>> {
    let position = state.geolocation_service.locate().await?;
    Ok(ApiResponse::ok(position))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(geolocate))
}
