//! Translation endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use pulso_common::AppResult;
use pulso_core::{
    SupportedLanguage, TranslateInput, TranslationProvider, TranslationService,
    TranslationsResponse,
};

use crate::{middleware::AppState, response::ApiResponse};

/// Translation service status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStatusResponse {
    /// Whether translation is available
    pub available: bool,
    /// Active provider
    pub provider: Option<TranslationProvider>,
}

/// Translate text into the requested languages.
async fn translate(
    State(state): State<AppState>,
    Json(input): Json<TranslateInput>,
) -> AppResult<ApiResponse<TranslationsResponse>> {
    let translation_service = state.translation_service.as_ref().ok_or_else(|| {
        pulso_common::AppError::BadRequest("Translation service not configured".to_string())
    })?;

    let result = translation_service.translate(input).await?;
    Ok(ApiResponse::ok(result))
}

/// Get supported languages.
async fn supported_languages() -> ApiResponse<Vec<SupportedLanguage>> {
    ApiResponse::ok(TranslationService::supported_languages())
}

/// Get translation service status.
async fn translation_status(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TranslationStatusResponse>> {
    let response = state.translation_service.as_ref().map_or(
        TranslationStatusResponse {
            available: false,
            provider: None,
        },
        |service| TranslationStatusResponse {
            available: true,
            provider: Some(service.active_provider()),
        },
    );
    Ok(ApiResponse::ok(response))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(translate))
        .route("/languages", get(supported_languages))
        .route("/status", get(translation_status))
}
