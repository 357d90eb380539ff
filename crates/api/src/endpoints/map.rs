//! Map view endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use pulso_common::AppResult;
use pulso_core::{MapView, Position, ReportFilter};

use crate::{extractors::Session, middleware::AppState, response::ApiResponse};

/// Map view query. Facets filter the plotted reports; `latitude` /
/// `longitude` focus the view on one spot; `locate` asks for a
/// device/IP position with default-center fallback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub locate: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zoom: Option<u8>,
}

/// Build the map view for the filtered report listing.
async fn map_view(
    Session(session): Session,
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> AppResult<ApiResponse<MapView>> {
    let filter = ReportFilter::from_parts(
        query.category.as_deref(),
        query.urgency.as_deref(),
        query.status.as_deref(),
    )?;
    let reports = state.report_service.list(&session, &filter).await?;

    let explicit = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => Some(Position {
            latitude,
            longitude,
        }),
        _ => None,
    };

    // An explicit focus wins over geolocation, so skip the lookup.
    let (located, notice) = if query.locate && explicit.is_none() {
        let resolved = state.geolocation_service.resolve_or_default().await;
        if resolved.located {
            (Some(resolved.position), None)
        } else {
            (None, resolved.notice)
        }
    } else {
        (None, None)
    };

    let mut view = state
        .map_service
        .build(&reports, explicit, query.zoom, located);
    view.notice = notice;

    Ok(ApiResponse::ok(view))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(map_view))
}
