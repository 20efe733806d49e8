//! Repository for the `enrollments` table.
//!
//! Enrollments are only ever created by the checkout flow (see
//! [`CheckoutRepo`](super::CheckoutRepo)); this repo reads them and records
//! lesson progress.

use coursemart_core::progress::CompletedLesson;
use coursemart_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::enrollment::{EnrolledCourse, Enrollment};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, course_id, progress, completed_lessons, \
                                  enrolled_at, completed_at, created_at, updated_at";

/// Provides read and progress operations for enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Find the enrollment for a `(user, course)` pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user is enrolled in the course.
    pub async fn exists(pool: &PgPool, user_id: DbId, course_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Count enrollments for a `(user, course)` pair (0 or 1 by constraint).
    pub async fn count_for_pair(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// List a user's enrollments with course details, most recent first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledCourse>(
            "SELECT e.id AS enrollment_id, c.id AS course_id, c.title, c.slug, c.thumbnail_url,
                    c.category, u.name AS instructor_name, c.price_cents, e.progress,
                    e.enrolled_at, e.completed_at
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN users u ON u.id = c.instructor_id
             WHERE e.user_id = $1
             ORDER BY e.enrolled_at DESC, e.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Persist new completion markers and progress.
    ///
    /// `completed_at` is only set the first time progress reaches 100 and is
    /// never cleared afterwards.
    pub async fn record_progress(
        pool: &PgPool,
        id: DbId,
        completed_lessons: &[CompletedLesson],
        progress: i16,
        now: Timestamp,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET
                completed_lessons = $2,
                progress = $3,
                completed_at = CASE
                    WHEN completed_at IS NULL AND $3 >= 100 THEN $4
                    ELSE completed_at
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(Json(completed_lessons))
            .bind(progress)
            .bind(now)
            .fetch_one(pool)
            .await
    }
}
