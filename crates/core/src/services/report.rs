//! Report submission and listing.

use std::collections::HashSet;

use sea_orm::{ActiveEnum, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::services::session::SessionRegistry;
use pulso_common::{AppError, AppResult, Identity, IdGenerator};
use pulso_db::{
    entities::report::{self, Category, Status, Urgency},
    repositories::ReportRepository,
};

/// Most photos a single report may carry.
pub const MAX_PHOTOS: usize = 5;

/// Longest video clip a report may carry, in seconds.
pub const MAX_VIDEO_SECONDS: f64 = 15.0;

/// Description length bounds, mirrored in the validate attribute on
/// [`SubmitReportInput`].
pub const DESCRIPTION_MIN_CHARS: u64 = 10;
pub const DESCRIPTION_MAX_CHARS: u64 = 1000;

/// Kind of an attached media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// One photo or video attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,

    #[validate(url(message = "must be a valid URL"))]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Clip length for videos, recorded at capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Input for submitting a new report.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportInput {
    pub category: Category,

    pub urgency: Urgency,

    #[validate(length(min = 10, max = 1000, message = "must be between 10 and 1000 characters"))]
    pub description: String,

    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    pub longitude: Option<f64>,

    #[validate(length(max = 512))]
    pub address: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// Listing filter. `None` facets impose no constraint; facets combine
/// with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub status: Option<Status>,
}

impl ReportFilter {
    /// Build a filter from raw query values. `"all"`, the empty string
    /// and an absent value all mean "no constraint".
    pub fn from_parts(
        category: Option<&str>,
        urgency: Option<&str>,
        status: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            category: parse_facet("category", category)?,
            urgency: parse_facet("urgency", urgency)?,
            status: parse_facet("status", status)?,
        })
    }

    /// Whether a report passes every active facet.
    #[must_use]
    pub fn matches(&self, report: &report::Model) -> bool {
        self.category
            .as_ref()
            .is_none_or(|c| c == &report.category)
            && self.urgency.as_ref().is_none_or(|u| u == &report.urgency)
            && self.status.as_ref().is_none_or(|s| s == &report.status)
    }
}

fn parse_facet<T>(name: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: ActiveEnum<Value = String>,
{
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() || v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => T::try_from_value(&v.to_string())
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Unknown {name}: {v}"))),
    }
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    sessions: SessionRegistry,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(report_repo: ReportRepository, sessions: SessionRegistry) -> Self {
        Self {
            report_repo,
            sessions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new report.
    ///
    /// Validation happens before any store call; a failed submission
    /// writes nothing and leaves the session cache untouched. On
    /// success the created report is prepended to the session cache so
    /// it lists immediately.
    pub async fn submit(
        &self,
        identity: &Identity,
        session_id: &str,
        input: SubmitReportInput,
    ) -> AppResult<report::Model> {
        input.validate()?;

        // Both coordinates are required; the form surfaces this on a
        // dedicated location field rather than per coordinate.
        let (latitude, longitude) = match (input.latitude, input.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(AppError::FieldValidation {
                    field: "location".to_string(),
                    message: "Select a location on the map or use your current position"
                        .to_string(),
                });
            }
        };

        let photos = input
            .media
            .iter()
            .filter(|m| m.kind == MediaKind::Image)
            .count();
        if photos > MAX_PHOTOS {
            return Err(AppError::FieldValidation {
                field: "media".to_string(),
                message: format!("at most {MAX_PHOTOS} photos per report"),
            });
        }
        for item in &input.media {
            if item.kind == MediaKind::Video {
                if let Some(duration) = item.duration_seconds {
                    if duration > MAX_VIDEO_SECONDS {
                        return Err(AppError::FieldValidation {
                            field: "media".to_string(),
                            message: format!("videos are limited to {MAX_VIDEO_SECONDS} seconds"),
                        });
                    }
                }
            }
        }

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(identity.id.clone()),
            reporter: Set(json!(identity)),
            category: Set(input.category),
            urgency: Set(input.urgency),
            status: Set(Status::Pending),
            description: Set(input.description),
            latitude: Set(latitude),
            longitude: Set(longitude),
            address: Set(input.address),
            media: Set(json!(input.media)),
            internal_comments: Set(json!([])),
            ..Default::default()
        };

        let created = self.report_repo.create(model).await?;
        self.sessions
            .prepend_report(session_id, created.clone())
            .await;

        tracing::info!(
            report_id = %created.id,
            user_id = %created.user_id,
            category = ?created.category,
            urgency = ?created.urgency,
            "Report submitted"
        );

        Ok(created)
    }

    /// Merged, deduplicated, filtered listing.
    ///
    /// Session-cache reports come first, then stored reports (newest
    /// first); the first occurrence of an ID wins. A store read failure
    /// fails open to the session-only view.
    pub async fn list(
        &self,
        session_id: &str,
        filter: &ReportFilter,
    ) -> AppResult<Vec<report::Model>> {
        let session_reports = self.sessions.reports(session_id).await;

        let stored = match self.report_repo.list_all().await {
            Ok(reports) => reports,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored reports, serving session cache only");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        Ok(session_reports
            .into_iter()
            .chain(stored)
            .filter(|r| seen.insert(r.id.clone()))
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// Reports owned by the acting identity, session cache first.
    pub async fn list_mine(
        &self,
        session_id: &str,
        identity: &Identity,
    ) -> AppResult<Vec<report::Model>> {
        let session_reports = self
            .sessions
            .reports_by_user(session_id, &identity.id)
            .await;

        let stored = match self.report_repo.list_by_user(&identity.id).await {
            Ok(reports) => reports,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored reports, serving session cache only");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        Ok(session_reports
            .into_iter()
            .chain(stored)
            .filter(|r| seen.insert(r.id.clone()))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_identity() -> Identity {
        Identity {
            id: "u1".to_string(),
            name: "Maria".to_string(),
            avatar_url: None,
            role: pulso_common::Role::Citizen,
        }
    }

    fn valid_input() -> SubmitReportInput {
        SubmitReportInput {
            category: Category::Infrastructure,
            urgency: Urgency::Medium,
            description: "Pothole swallowing tires on Av. Bolognesi".to_string(),
            latitude: Some(-18.01),
            longitude: Some(-70.25),
            address: Some("Av. Bolognesi 123".to_string()),
            media: vec![],
        }
    }

    fn stored_report(id: &str, urgency: Urgency) -> report::Model {
        report::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            reporter: json!({"id": "u1", "name": "Maria"}),
            category: Category::Infrastructure,
            urgency,
            status: Status::Pending,
            description: "Pothole swallowing tires on Av. Bolognesi".to_string(),
            latitude: -18.01,
            longitude: -70.25,
            address: None,
            media: json!([]),
            upvotes: 0,
            downvotes: 0,
            internal_comments: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::from_secs(60))
    }

    fn service_with_results(
        results: Vec<Vec<report::Model>>,
        sessions: SessionRegistry,
    ) -> ReportService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(results)
                .into_connection(),
        );
        ReportService::new(ReportRepository::new(db), sessions)
    }

    #[tokio::test]
    async fn test_submit_valid_draft() {
        let sessions = registry();
        let service = service_with_results(
            vec![vec![stored_report("r1", Urgency::Medium)]],
            sessions.clone(),
        );

        let created = service
            .submit(&test_identity(), "s1", valid_input())
            .await
            .unwrap();

        assert_eq!(created.status, Status::Pending);
        assert_eq!(created.upvotes, 0);
        assert_eq!(created.downvotes, 0);

        // The created report is staged in the session cache.
        let cached = sessions.reports("s1").await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "r1");
    }

    #[tokio::test]
    async fn test_submit_missing_location_fails_before_store() {
        let sessions = registry();
        // No queued results: any store call would error, proving the
        // draft is rejected first.
        let service = service_with_results(vec![], sessions.clone());

        let mut input = valid_input();
        input.latitude = None;

        let err = service
            .submit(&test_identity(), "s1", input)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("location"));
        assert!(sessions.reports("s1").await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_short_description_is_field_error() {
        let service = service_with_results(vec![], registry());

        let mut input = valid_input();
        input.description = "too short".to_string();

        let err = service
            .submit(&test_identity(), "s1", input)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("description"));
    }

    #[tokio::test]
    async fn test_submit_latitude_out_of_range() {
        let service = service_with_results(vec![], registry());

        let mut input = valid_input();
        input.latitude = Some(123.0);

        let err = service
            .submit(&test_identity(), "s1", input)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("latitude"));
    }

    #[tokio::test]
    async fn test_submit_too_many_photos() {
        let service = service_with_results(vec![], registry());

        let mut input = valid_input();
        input.media = (0..6)
            .map(|i| MediaItem {
                kind: MediaKind::Image,
                url: format!("https://media.example/photo-{i}.jpg"),
                thumbnail_url: None,
                duration_seconds: None,
            })
            .collect();

        let err = service
            .submit(&test_identity(), "s1", input)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("media"));
    }

    #[tokio::test]
    async fn test_submit_video_too_long() {
        let service = service_with_results(vec![], registry());

        let mut input = valid_input();
        input.media = vec![MediaItem {
            kind: MediaKind::Video,
            url: "https://media.example/clip.mp4".to_string(),
            thumbnail_url: None,
            duration_seconds: Some(20.0),
        }];

        let err = service
            .submit(&test_identity(), "s1", input)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("media"));
    }

    #[tokio::test]
    async fn test_list_merges_session_first_and_deduplicates() {
        let sessions = registry();

        // The session copy is distinguishable by its address.
        let mut session_copy = stored_report("r1", Urgency::Medium);
        session_copy.address = Some("session copy".to_string());
        sessions.prepend_report("s1", session_copy).await;

        let service = service_with_results(
            vec![vec![
                stored_report("r1", Urgency::Medium),
                stored_report("r2", Urgency::Low),
            ]],
            sessions,
        );

        let listed = service
            .list("s1", &ReportFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "r1");
        assert_eq!(listed[0].address.as_deref(), Some("session copy"));
        assert_eq!(listed[1].id, "r2");
    }

    #[tokio::test]
    async fn test_list_fails_open_on_store_error() {
        let sessions = registry();
        sessions
            .prepend_report("s1", stored_report("r1", Urgency::Low))
            .await;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection refused".to_string())])
                .into_connection(),
        );
        let service = ReportService::new(ReportRepository::new(db), sessions);

        let listed = service
            .list("s1", &ReportFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "r1");
    }

    #[tokio::test]
    async fn test_list_filter_keeps_relative_order() {
        let service = service_with_results(
            vec![vec![
                stored_report("r1", Urgency::Critical),
                stored_report("r2", Urgency::Low),
                stored_report("r3", Urgency::Critical),
            ]],
            registry(),
        );

        let filter = ReportFilter {
            urgency: Some(Urgency::Critical),
            ..Default::default()
        };
        let listed = service.list("s1", &filter).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "r1");
        assert_eq!(listed[1].id, "r3");
    }

    #[tokio::test]
    async fn test_list_mine_only_returns_owned() {
        let sessions = registry();
        let mut other = stored_report("r9", Urgency::Low);
        other.user_id = "someone-else".to_string();
        sessions.prepend_report("s1", other).await;
        sessions
            .prepend_report("s1", stored_report("r1", Urgency::Low))
            .await;

        let service = service_with_results(vec![vec![]], sessions);

        let mine = service.list_mine("s1", &test_identity()).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "r1");
    }

    #[test]
    fn test_filter_from_parts() {
        let filter = ReportFilter::from_parts(Some("all"), Some("critical"), None).unwrap();
        assert_eq!(filter.category, None);
        assert_eq!(filter.urgency, Some(Urgency::Critical));
        assert_eq!(filter.status, None);

        let err = ReportFilter::from_parts(Some("nonsense"), None, None).unwrap_err();
        assert_eq!(err.error_code(), "BAD_REQUEST");
    }

    #[test]
    fn test_filter_matches_is_conjunctive() {
        let report = stored_report("r1", Urgency::Critical);

        let matching = ReportFilter {
            category: Some(Category::Infrastructure),
            urgency: Some(Urgency::Critical),
            status: None,
        };
        assert!(matching.matches(&report));

        let wrong_category = ReportFilter {
            category: Some(Category::Pollution),
            urgency: Some(Urgency::Critical),
            status: None,
        };
        assert!(!wrong_category.matches(&report));
    }
}
