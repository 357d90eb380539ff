//! Report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of incident a report describes.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[sea_orm(string_value = "infrastructure")]
    Infrastructure,
    #[sea_orm(string_value = "obstacles")]
    Obstacles,
    #[sea_orm(string_value = "abandoned_vehicles")]
    AbandonedVehicles,
    #[sea_orm(string_value = "drainage_issues")]
    DrainageIssues,
    #[sea_orm(string_value = "pollution")]
    Pollution,
    #[sea_orm(string_value = "abandoned_animals")]
    AbandonedAnimals,
    #[sea_orm(string_value = "insecurity")]
    Insecurity,
    #[sea_orm(string_value = "violence")]
    Violence,
    #[sea_orm(string_value = "accidents")]
    Accidents,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    /// Human-readable name shown in clients.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Obstacles => "Obstacles",
            Self::AbandonedVehicles => "Abandoned Vehicles",
            Self::DrainageIssues => "Drainage Issues",
            Self::Pollution => "Pollution",
            Self::AbandonedAnimals => "Abandoned Animals",
            Self::Insecurity => "Insecurity",
            Self::Violence => "Violence",
            Self::Accidents => "Accidents",
            Self::Other => "Other",
        }
    }
}

/// How urgent a report is, from least to most severe.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl Urgency {
    /// Human-readable name shown in clients.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
            Self::Critical => "Critical",
        }
    }
}

/// Lifecycle status of a report.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_process")]
    InProcess,
    #[sea_orm(string_value = "solved")]
    Solved,
    #[sea_orm(string_value = "invalid")]
    Invalid,
    #[sea_orm(string_value = "duplicate")]
    Duplicate,
}

impl Status {
    /// Human-readable name shown in clients.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProcess => "In Process",
            Self::Solved => "Solved",
            Self::Invalid => "Invalid",
            Self::Duplicate => "Duplicate",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Reporter user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Snapshot of the reporter at submission time
    #[sea_orm(column_type = "JsonBinary")]
    pub reporter: Json,

    /// Incident category
    pub category: Category,

    /// Urgency level
    pub urgency: Urgency,

    /// Lifecycle status
    pub status: Status,

    /// Free-text description of the incident
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Latitude of the incident
    pub latitude: f64,

    /// Longitude of the incident
    pub longitude: f64,

    /// Human-readable address, when known
    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Attached photos and videos
    #[sea_orm(column_type = "JsonBinary")]
    pub media: Json,

    /// Upvote count (denormalized)
    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    /// Downvote count (denormalized)
    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    /// Moderation notes, visible to moderators only
    #[sea_orm(column_type = "JsonBinary")]
    pub internal_comments: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
