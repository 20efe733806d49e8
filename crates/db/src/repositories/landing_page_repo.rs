//! Repository for the `landing_pages` table.

use coursemart_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::landing_page::{CreateLandingPage, LandingPage, UpdateLandingPage};

const COLUMNS: &str = "id, creator_id, course_id, slug, title, hero, sections, layout, \
                       is_published, created_at, updated_at";

pub struct LandingPageRepo;

impl LandingPageRepo {
    /// Insert a page. Violates `uq_landing_pages_slug` on a taken slug.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateLandingPage,
    ) -> Result<LandingPage, sqlx::Error> {
        let query = format!(
            "INSERT INTO landing_pages
                (creator_id, course_id, slug, title, hero, sections, layout, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(creator_id)
            .bind(input.course_id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(Json(&input.hero))
            .bind(Json(&input.sections))
            .bind(Json(&input.layout))
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LandingPage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM landing_pages WHERE id = $1");
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Public lookup: drafts are invisible.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<LandingPage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM landing_pages WHERE slug = $1 AND is_published = true");
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_creator(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Vec<LandingPage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM landing_pages
             WHERE creator_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }

    /// Partial update. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLandingPage,
    ) -> Result<Option<LandingPage>, sqlx::Error> {
        let query = format!(
            "UPDATE landing_pages SET
                course_id = COALESCE($2, course_id),
                slug = COALESCE($3, slug),
                title = COALESCE($4, title),
                hero = COALESCE($5, hero),
                sections = COALESCE($6, sections),
                layout = COALESCE($7, layout),
                is_published = COALESCE($8, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .bind(input.course_id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(input.hero.as_ref().map(Json))
            .bind(input.sections.as_ref().map(Json))
            .bind(input.layout.as_ref().map(Json))
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM landing_pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
