//! Repository for the `courses` table.

use coursemart_core::course::CourseModule;
use coursemart_core::search::{clamp_limit, clamp_offset, like_pattern, DEFAULT_LIMIT, MAX_LIMIT};
use coursemart_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::course::{Course, CourseFilter, CourseSummary, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, instructor_id, title, slug, description, thumbnail_url, category, \
                       level, price_cents, status, modules, total_students, rating, \
                       created_at, updated_at";

/// Summary columns, qualified for the join with `users`.
const SUMMARY_COLUMNS: &str = "c.id, c.instructor_id, u.name AS instructor_name, c.title, c.slug, \
                               c.description, c.thumbnail_url, c.category, c.level, \
                               c.price_cents, c.status, c.total_students, c.rating, c.created_at";

/// Fully resolved insert values (slug derived, level/status defaulted).
#[derive(Debug, Clone)]
pub struct NewCourse<'a> {
    pub instructor_id: DbId,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
    pub category: Option<&'a str>,
    pub level: &'a str,
    pub price_cents: i64,
    pub status: &'a str,
    pub modules: &'a [CourseModule],
}

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewCourse<'_>) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (instructor_id, title, slug, description, thumbnail_url, category,
                 level, price_cents, status, modules)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(input.instructor_id)
            .bind(input.title)
            .bind(input.slug)
            .bind(input.description)
            .bind(input.thumbnail_url)
            .bind(input.category)
            .bind(input.level)
            .bind(input.price_cents)
            .bind(input.status)
            .bind(Json(input.modules))
            .fetch_one(pool)
            .await
    }

    /// Find a course by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a slug is already taken.
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM courses WHERE slug = $1)")
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// List published courses, newest first, with optional category and
    /// title/description search.
    pub async fn list_published(
        pool: &PgPool,
        filter: &CourseFilter,
    ) -> Result<Vec<CourseSummary>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(filter.offset);
        let pattern = like_pattern(filter.search.as_deref());

        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE c.status = 'published'
               AND ($1::TEXT IS NULL OR c.category = $1)
               AND ($2::TEXT IS NULL OR c.title ILIKE $2 OR c.description ILIKE $2)
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CourseSummary>(&query)
            .bind(&filter.category)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List every course authored by an instructor, any status.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<CourseSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE c.instructor_id = $1
             ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, CourseSummary>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// Published courses the user is not enrolled in.
    ///
    /// Courses in categories the user already studies come first, then by
    /// popularity.
    pub async fn recommendations(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<CourseSummary>, sqlx::Error> {
        let query = format!(
            "WITH studied AS (
                SELECT DISTINCT c2.category
                FROM enrollments e
                JOIN courses c2 ON c2.id = e.course_id
                WHERE e.user_id = $1 AND c2.category IS NOT NULL
             )
             SELECT {SUMMARY_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE c.status = 'published'
               AND c.instructor_id <> $1
               AND NOT EXISTS (
                   SELECT 1 FROM enrollments e WHERE e.user_id = $1 AND e.course_id = c.id
               )
             ORDER BY (c.category IN (SELECT category FROM studied)) IS TRUE DESC,
                      c.total_students DESC,
                      c.created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, CourseSummary>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url),
                category = COALESCE($5, category),
                level = COALESCE($6, level),
                price_cents = COALESCE($7, price_cents),
                status = COALESCE($8, status),
                modules = COALESCE($9, modules)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.thumbnail_url)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.price_cents)
            .bind(&input.status)
            .bind(input.modules.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Number of enrollments referencing the course.
    pub async fn enrollment_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a course that has no sales or enrollments. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM courses c
             WHERE c.id = $1
               AND NOT EXISTS (SELECT 1 FROM enrollments e WHERE e.course_id = c.id)
               AND NOT EXISTS (SELECT 1 FROM sales s WHERE s.course_id = c.id)",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
