//! Report endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use pulso_common::AppResult;
use pulso_core::{ReportFilter, SubmitReportInput, VoteDirection, VoteOutcome};
use pulso_db::entities::report::{self, Category, Status, Urgency};

use crate::{
    extractors::{CurrentIdentity, Session},
    middleware::AppState,
    response::ApiResponse,
};

/// Report response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub user_id: String,
    pub reporter: serde_json::Value,
    pub category: Category,
    pub urgency: Urgency,
    pub status: Status,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub media: serde_json::Value,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(r: report::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            reporter: r.reporter,
            category: r.category,
            urgency: r.urgency,
            status: r.status,
            description: r.description,
            latitude: r.latitude,
            longitude: r.longitude,
            address: r.address,
            media: r.media,
            upvotes: r.upvotes,
            downvotes: r.downvotes,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Submit a new report.
async fn submit(
    CurrentIdentity(identity): CurrentIdentity,
    Session(session): Session,
    State(state): State<AppState>,
    Json(input): Json<SubmitReportInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .report_service
        .submit(&identity, &session, input)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Listing filter query. Each facet is optional; `all` means no
/// constraint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub status: Option<String>,
}

impl ListReportsQuery {
    fn filter(&self) -> AppResult<ReportFilter> {
        ReportFilter::from_parts(
            self.category.as_deref(),
            self.urgency.as_deref(),
            self.status.as_deref(),
        )
    }
}

/// List reports, session cache first, newest first.
async fn list(
    Session(session): Session,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let filter = query.filter()?;
    let reports = state.report_service.list(&session, &filter).await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// List the acting identity's reports from this session.
async fn mine(
    CurrentIdentity(identity): CurrentIdentity,
    Session(session): Session,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let reports = state.report_service.list_mine(&session, &identity).await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

/// Toggle a vote on a report.
async fn vote(
    Session(session): Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<VoteOutcome>> {
    let outcome = state
        .vote_service
        .toggle(&session, &id, req.direction)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit).get(list))
        .route("/mine", get(mine))
        .route("/{id}/vote", post(vote))
}
