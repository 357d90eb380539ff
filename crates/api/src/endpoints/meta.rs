//! Meta endpoints.

use axum::{extract::State, routing::get, Json, Router};
use sea_orm::Iterable;
use serde::Serialize;

use pulso_core::{
    category_icon, urgency_color, Position, SupportedLanguage, TranslationService,
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, MAX_PHOTOS, MAX_VIDEO_SECONDS,
};
use pulso_db::entities::report::{Category, Status, Urgency};

use crate::middleware::AppState;

/// A selectable category with its marker icon.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMeta {
    pub value: Category,
    pub label: &'static str,
    pub icon: &'static str,
}

/// A selectable urgency with its marker color.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyMeta {
    pub value: Urgency,
    pub label: &'static str,
    pub color: &'static str,
    pub pulse: bool,
}

/// A report status with its label.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMeta {
    pub value: Status,
    pub label: &'static str,
}

/// Submission limits.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsMeta {
    pub description_min_chars: u64,
    pub description_max_chars: u64,
    pub max_photos: usize,
    pub max_video_seconds: f64,
}

/// Default map framing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMeta {
    pub center: Position,
    pub zoom: u8,
}

/// Server metadata response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    pub short_name: String,
    pub version: String,
    pub description: Option<String>,
    pub categories: Vec<CategoryMeta>,
    pub urgencies: Vec<UrgencyMeta>,
    pub statuses: Vec<StatusMeta>,
    pub limits: LimitsMeta,
    pub languages: Vec<SupportedLanguage>,
    pub map: MapMeta,
    pub translation_available: bool,
}

/// Get server metadata.
async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    Json(MetaResponse {
        name: "Pulso".to_string(),
        short_name: "pulso".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: Some("Community incident reporting".to_string()),
        categories: Category::iter()
            .map(|c| CategoryMeta {
                label: c.display_name(),
                icon: category_icon(&c),
                value: c,
            })
            .collect(),
        urgencies: Urgency::iter()
            .map(|u| UrgencyMeta {
                label: u.display_name(),
                color: urgency_color(&u),
                pulse: u == Urgency::Critical,
                value: u,
            })
            .collect(),
        statuses: Status::iter()
            .map(|s| StatusMeta {
                label: s.display_name(),
                value: s,
            })
            .collect(),
        limits: LimitsMeta {
            description_min_chars: DESCRIPTION_MIN_CHARS,
            description_max_chars: DESCRIPTION_MAX_CHARS,
            max_photos: MAX_PHOTOS,
            max_video_seconds: MAX_VIDEO_SECONDS,
        },
        languages: TranslationService::supported_languages(),
        map: MapMeta {
            center: state.map_service.default_center(),
            zoom: state.map_service.default_zoom(),
        },
        translation_available: state.translation_service.is_some(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(meta))
}
