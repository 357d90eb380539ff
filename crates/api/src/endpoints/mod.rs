//! API endpoints.

mod geolocation;
mod map;
mod meta;
mod reports;
mod translation;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/reports", reports::router())
        .nest("/map", map::router())
        .nest("/geolocate", geolocation::router())
        .nest("/translate", translation::router())
        .nest("/meta", meta::router())
}
