//! Course entity model and DTOs.

use coursemart_core::course::CourseModule;
use coursemart_core::money::format_cents;
use coursemart_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub instructor_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub level: String,
    pub price_cents: Cents,
    pub status: String,
    pub modules: Json<Vec<CourseModule>>,
    pub total_students: i64,
    pub rating: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    /// Display price, e.g. `"297.00"`.
    pub fn price(&self) -> String {
        format_cents(self.price_cents)
    }

    pub fn is_published(&self) -> bool {
        self.status == coursemart_core::course::STATUS_PUBLISHED
    }
}

/// Catalog listing entry (no module tree).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseSummary {
    pub id: DbId,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub level: String,
    pub price_cents: Cents,
    pub status: String,
    pub total_students: i64,
    pub rating: f64,
    pub created_at: Timestamp,
}

/// DTO for creating a course. `slug` is derived from the title when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price_cents: Cents,
    pub status: Option<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
}

/// DTO for partially updating a course.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price_cents: Option<Cents>,
    pub status: Option<String>,
    pub modules: Option<Vec<CourseModule>>,
}

/// Catalog filter for published courses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
