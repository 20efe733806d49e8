//! Webhook ledger rows.

use coursemart_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const WEBHOOK_RECEIVED: &str = "received";
pub const WEBHOOK_PROCESSED: &str = "processed";
pub const WEBHOOK_IGNORED: &str = "ignored";
pub const WEBHOOK_REJECTED: &str = "rejected";
pub const WEBHOOK_FAILED: &str = "failed";

pub const VALID_WEBHOOK_STATUSES: &[&str] = &[
    WEBHOOK_RECEIVED,
    WEBHOOK_PROCESSED,
    WEBHOOK_IGNORED,
    WEBHOOK_REJECTED,
    WEBHOOK_FAILED,
];

/// A row from the `webhook_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookEvent {
    pub id: DbId,
    pub provider: String,
    pub transaction_id: Option<String>,
    pub payment_status: Option<String>,
    pub status: String,
    pub payload: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
