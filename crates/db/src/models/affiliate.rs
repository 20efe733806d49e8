//! Affiliate and affiliate-sale models.

use coursemart_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `affiliates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Affiliate {
    pub id: DbId,
    pub user_id: DbId,
    pub affiliate_code: String,
    pub commission_rate: f64,
    pub status: String,
    pub total_earnings_cents: Cents,
    pub pending_earnings_cents: Cents,
    pub paid_earnings_cents: Cents,
    pub total_sales: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `affiliate_sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AffiliateSale {
    pub id: DbId,
    pub affiliate_id: DbId,
    pub sale_id: DbId,
    pub sale_amount_cents: Cents,
    pub commission_rate: f64,
    pub commission_cents: Cents,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for admin updates to an affiliate account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAffiliate {
    pub commission_rate: Option<f64>,
    pub status: Option<String>,
}

/// Result of paying out an affiliate's pending balance.
#[derive(Debug, Clone, Serialize)]
pub struct Payout {
    pub affiliate_id: DbId,
    pub amount_cents: Cents,
    pub commissions_paid: u64,
}
