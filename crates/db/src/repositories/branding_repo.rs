//! Repository for the `brandings` table (one row per creator).

use coursemart_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::branding::{Branding, UpsertBranding};

const COLUMNS: &str =
    "id, creator_id, logo_url, colors, typography, custom_domain, created_at, updated_at";

pub struct BrandingRepo;

impl BrandingRepo {
    pub async fn find_by_creator(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Option<Branding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brandings WHERE creator_id = $1");
        sqlx::query_as::<_, Branding>(&query)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the creator's branding or replace it wholesale.
    pub async fn upsert(
        pool: &PgPool,
        creator_id: DbId,
        input: &UpsertBranding,
    ) -> Result<Branding, sqlx::Error> {
        let query = format!(
            "INSERT INTO brandings (creator_id, logo_url, colors, typography, custom_domain)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (creator_id) DO UPDATE SET
                logo_url = EXCLUDED.logo_url,
                colors = EXCLUDED.colors,
                typography = EXCLUDED.typography,
                custom_domain = EXCLUDED.custom_domain
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branding>(&query)
            .bind(creator_id)
            .bind(&input.logo_url)
            .bind(Json(&input.colors))
            .bind(Json(&input.typography))
            .bind(&input.custom_domain)
            .fetch_one(pool)
            .await
    }
}
