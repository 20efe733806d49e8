//! Repository for the `app_configs` key/value table.

use sqlx::PgPool;

use crate::models::app_config::{AppConfig, CreateAppConfig, UpdateAppConfig};

const COLUMNS: &str = "id, key, value, description, created_at, updated_at";

pub struct AppConfigRepo;

impl AppConfigRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<AppConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_configs ORDER BY key");
        sqlx::query_as::<_, AppConfig>(&query).fetch_all(pool).await
    }

    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<AppConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_configs WHERE key = $1");
        sqlx::query_as::<_, AppConfig>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new key. Violates `uq_app_configs_key` on duplicates.
    pub async fn create(pool: &PgPool, input: &CreateAppConfig) -> Result<AppConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO app_configs (key, value, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppConfig>(&query)
            .bind(&input.key)
            .bind(&input.value)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        key: &str,
        input: &UpdateAppConfig,
    ) -> Result<Option<AppConfig>, sqlx::Error> {
        let query = format!(
            "UPDATE app_configs SET
                value = $2,
                description = COALESCE($3, description)
             WHERE key = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppConfig>(&query)
            .bind(key)
            .bind(&input.value)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM app_configs WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
