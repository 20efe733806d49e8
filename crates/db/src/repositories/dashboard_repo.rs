//! Aggregate queries behind the dashboard endpoints.

use coursemart_core::payment::SALE_COMPLETED;
use coursemart_core::course::STATUS_PUBLISHED;
use coursemart_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{CreatorStats, StudentStats};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Learning stats across a user's enrollments.
    pub async fn student_stats(pool: &PgPool, user_id: DbId) -> Result<StudentStats, sqlx::Error> {
        sqlx::query_as::<_, StudentStats>(
            "SELECT
                COUNT(*) AS enrolled_courses,
                COUNT(*) FILTER (WHERE completed_at IS NOT NULL) AS completed_courses,
                COUNT(*) FILTER (WHERE completed_at IS NULL AND progress > 0) AS in_progress_courses,
                COALESCE(AVG(progress), 0)::DOUBLE PRECISION AS average_progress
             FROM enrollments
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Course and revenue stats for an instructor. Revenue counts completed
    /// sales only.
    pub async fn creator_stats(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<CreatorStats, sqlx::Error> {
        sqlx::query_as::<_, CreatorStats>(
            "SELECT
                (SELECT COUNT(*) FROM courses WHERE instructor_id = $1) AS total_courses,
                (SELECT COUNT(*) FROM courses WHERE instructor_id = $1 AND status = $2)
                    AS published_courses,
                (SELECT COALESCE(SUM(total_students), 0)::BIGINT FROM courses
                    WHERE instructor_id = $1) AS total_students,
                (SELECT COUNT(*) FROM sales WHERE instructor_id = $1 AND status = $3)
                    AS completed_sales,
                (SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM sales
                    WHERE instructor_id = $1 AND status = $3) AS revenue_cents",
        )
        .bind(instructor_id)
        .bind(STATUS_PUBLISHED)
        .bind(SALE_COMPLETED)
        .fetch_one(pool)
        .await
    }
}
