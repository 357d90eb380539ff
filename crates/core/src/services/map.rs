//! Map view building.
//!
//! Produces the view model the client map widget consumes: a center,
//! a zoom level and one styled marker per report. Marker styling is
//! derived entirely from the report (urgency drives color and pulse,
//! category drives the icon slug), so every client renders incidents
//! the same way.

use serde::Serialize;

use crate::services::geolocation::Position;
use pulso_common::config::MapConfig;
use pulso_db::entities::report::{self, Category, Urgency};

/// Zoom used when the map is centered on the located visitor.
pub const LOCATED_ZOOM: u8 = 14;

/// Zoom used when the map is centered on an explicit point, such as a
/// focused marker or the submission form.
pub const FOCUS_ZOOM: u8 = 15;

/// Marker color for an urgency level.
#[must_use]
pub const fn urgency_color(urgency: &Urgency) -> &'static str {
    match urgency {
        Urgency::Low => "#22c55e",
        Urgency::Medium => "#eab308",
        Urgency::High => "#f97316",
        Urgency::Urgent => "#dc2626",
        Urgency::Critical => "#000000",
    }
}

/// Icon slug for a category.
#[must_use]
pub const fn category_icon(category: &Category) -> &'static str {
    match category {
        Category::Infrastructure => "wrench",
        Category::Obstacles => "traffic-cone",
        Category::AbandonedVehicles => "car-crash",
        Category::DrainageIssues => "droplets",
        Category::Pollution => "trash-2",
        Category::AbandonedAnimals => "dog",
        Category::Insecurity => "shield-alert",
        Category::Violence => "siren",
        Category::Accidents => "triangle-alert",
        Category::Other => "help-circle",
    }
}

/// One styled marker on the map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub report_id: String,
    pub position: Position,
    pub color: &'static str,
    pub icon: &'static str,
    /// Critical markers pulse to draw attention.
    pub pulse: bool,
}

impl Marker {
    fn from_report(report: &report::Model) -> Self {
        Self {
            report_id: report.id.clone(),
            position: Position {
                latitude: report.latitude,
                longitude: report.longitude,
            },
            color: urgency_color(&report.urgency),
            icon: category_icon(&report.category),
            pulse: report.urgency == Urgency::Critical,
        }
    }
}

/// The view model consumed by the map widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: Position,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    /// Set when the visitor could not be located and the default
    /// center is shown instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Map service for building views.
#[derive(Clone)]
pub struct MapService {
    config: MapConfig,
}

impl MapService {
    /// Create a new map service.
    #[must_use]
    pub const fn new(config: MapConfig) -> Self {
        Self { config }
    }

    /// The fallback center and zoom.
    #[must_use]
    pub const fn default_center(&self) -> Position {
        Position {
            latitude: self.config.default_latitude,
            longitude: self.config.default_longitude,
        }
    }

    /// Default zoom for the fallback center.
    #[must_use]
    pub const fn default_zoom(&self) -> u8 {
        self.config.default_zoom
    }

    /// Build a view over the given reports.
    ///
    /// Center resolution: an explicit center wins (focused at
    /// [`FOCUS_ZOOM`] unless a zoom override accompanies it), then the
    /// located visitor at [`LOCATED_ZOOM`], then the configured default
    /// center at its configured zoom.
    #[must_use]
    pub fn build(
        &self,
        reports: &[report::Model],
        explicit_center: Option<Position>,
        zoom_override: Option<u8>,
        located: Option<Position>,
    ) -> MapView {
        let (center, zoom) = if let Some(center) = explicit_center {
            (center, zoom_override.unwrap_or(FOCUS_ZOOM))
        } else if let Some(center) = located {
            (center, zoom_override.unwrap_or(LOCATED_ZOOM))
        } else {
            (
                self.default_center(),
                zoom_override.unwrap_or(self.config.default_zoom),
            )
        };

        MapView {
            center,
            zoom,
            markers: reports.iter().map(Marker::from_report).collect(),
            notice: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulso_db::entities::report::Status;
    use serde_json::json;

    fn test_report(id: &str, category: Category, urgency: Urgency) -> report::Model {
        report::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            reporter: json!({"id": "u1"}),
            category,
            urgency,
            status: Status::Pending,
            description: "Sinkhole opening near the market".to_string(),
            latitude: -18.005,
            longitude: -70.24,
            address: None,
            media: json!([]),
            upvotes: 0,
            downvotes: 0,
            internal_comments: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_urgency_colors() {
        assert_eq!(urgency_color(&Urgency::Low), "#22c55e");
        assert_eq!(urgency_color(&Urgency::Medium), "#eab308");
        assert_eq!(urgency_color(&Urgency::High), "#f97316");
        assert_eq!(urgency_color(&Urgency::Urgent), "#dc2626");
        assert_eq!(urgency_color(&Urgency::Critical), "#000000");
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(category_icon(&Category::Infrastructure), "wrench");
        assert_eq!(category_icon(&Category::DrainageIssues), "droplets");
        assert_eq!(category_icon(&Category::Other), "help-circle");
    }

    #[test]
    fn test_only_critical_markers_pulse() {
        let service = MapService::new(MapConfig::default());
        let reports = vec![
            test_report("r1", Category::Accidents, Urgency::Critical),
            test_report("r2", Category::Accidents, Urgency::Urgent),
        ];

        let view = service.build(&reports, None, None, None);

        assert!(view.markers[0].pulse);
        assert!(!view.markers[1].pulse);
    }

    #[test]
    fn test_default_center_and_zoom() {
        let service = MapService::new(MapConfig::default());

        let view = service.build(&[], None, None, None);

        assert_eq!(view.zoom, 13);
        assert!((view.center.latitude - -18.0066).abs() < f64::EPSILON);
        assert!((view.center.longitude - -70.2463).abs() < f64::EPSILON);
    }

    #[test]
    fn test_located_center_zooms_in() {
        let service = MapService::new(MapConfig::default());
        let here = Position {
            latitude: -18.01,
            longitude: -70.25,
        };

        let view = service.build(&[], None, None, Some(here));

        assert_eq!(view.zoom, LOCATED_ZOOM);
        assert_eq!(view.center, here);
    }

    #[test]
    fn test_explicit_center_wins() {
        let service = MapService::new(MapConfig::default());
        let focused = Position {
            latitude: -18.02,
            longitude: -70.26,
        };
        let here = Position {
            latitude: -18.01,
            longitude: -70.25,
        };

        let view = service.build(&[], Some(focused), None, Some(here));

        assert_eq!(view.center, focused);
        assert_eq!(view.zoom, FOCUS_ZOOM);

        let with_override = service.build(&[], Some(focused), Some(17), Some(here));
        assert_eq!(with_override.zoom, 17);
    }

    #[test]
    fn test_markers_carry_report_styling() {
        let service = MapService::new(MapConfig::default());
        let reports = vec![test_report("r1", Category::Violence, Urgency::High)];

        let view = service.build(&reports, None, None, None);

        let marker = &view.markers[0];
        assert_eq!(marker.report_id, "r1");
        assert_eq!(marker.color, "#f97316");
        assert_eq!(marker.icon, "siren");
        assert!((marker.position.latitude - -18.005).abs() < f64::EPSILON);
    }
}
