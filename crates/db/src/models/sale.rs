//! Sale entity model and DTOs.

use coursemart_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: DbId,
    pub course_id: DbId,
    pub buyer_id: DbId,
    pub instructor_id: DbId,
    pub amount_cents: Cents,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: String,
    /// Underlying provider payment, when it differs from `transaction_id`.
    pub payment_reference: Option<String>,
    pub affiliate_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Sale joined with course title, for sales/purchases listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleListing {
    pub id: DbId,
    pub course_id: DbId,
    pub course_title: String,
    pub buyer_id: DbId,
    pub amount_cents: Cents,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: String,
    pub affiliate_code: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a sale after the gateway has answered.
#[derive(Debug, Clone)]
pub struct CreateSale {
    pub course_id: DbId,
    pub buyer_id: DbId,
    pub instructor_id: DbId,
    pub amount_cents: Cents,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: String,
    pub affiliate_code: Option<String>,
}
