//! Enrollment entity model.

use coursemart_core::progress::CompletedLesson;
use coursemart_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub progress: i16,
    pub completed_lessons: Json<Vec<CompletedLesson>>,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Enrollment joined with a course summary, for the student dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledCourse {
    pub enrollment_id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub slug: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub instructor_name: String,
    pub price_cents: Cents,
    pub progress: i16,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
