//! Repository for the `webhook_events` ledger.

use coursemart_core::types::DbId;
use sqlx::PgPool;

use crate::models::webhook_event::WebhookEvent;

const COLUMNS: &str = "id, provider, transaction_id, payment_status, status, payload, error, \
                       created_at, updated_at";

/// Values for a new ledger entry.
#[derive(Debug, Clone)]
pub struct NewWebhookEvent<'a> {
    pub provider: &'a str,
    pub transaction_id: Option<&'a str>,
    pub payment_status: Option<&'a str>,
    pub status: &'a str,
    pub payload: Option<&'a serde_json::Value>,
    pub error: Option<&'a str>,
}

pub struct WebhookEventRepo;

impl WebhookEventRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewWebhookEvent<'_>,
    ) -> Result<WebhookEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhook_events
                (provider, transaction_id, payment_status, status, payload, error)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(input.provider)
            .bind(input.transaction_id)
            .bind(input.payment_status)
            .bind(input.status)
            .bind(input.payload)
            .bind(input.error)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WebhookEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM webhook_events WHERE id = $1");
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest entries first, optionally filtered by outcome.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WebhookEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhook_events
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the outcome of (re)processing an entry. `error` is cleared when
    /// `None`.
    pub async fn set_outcome(
        pool: &PgPool,
        id: DbId,
        status: &str,
        error: Option<&str>,
    ) -> Result<Option<WebhookEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE webhook_events SET status = $2, error = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(id)
            .bind(status)
            .bind(error)
            .fetch_optional(pool)
            .await
    }
}
