//! Read access to the `sales` table.
//!
//! Sales are written exclusively by [`CheckoutRepo`](super::CheckoutRepo).

use coursemart_core::types::DbId;
use sqlx::PgPool;

use crate::models::sale::{Sale, SaleListing};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, course_id, buyer_id, instructor_id, amount_cents, \
                                  payment_method, status, transaction_id, payment_reference, \
                                  affiliate_code, created_at, updated_at";

const LISTING_COLUMNS: &str = "s.id, s.course_id, c.title AS course_title, s.buyer_id, \
                               s.amount_cents, s.payment_method, s.status, s.transaction_id, \
                               s.affiliate_code, s.created_at";

pub struct SaleRepo;

impl SaleRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sales WHERE id = $1");
        sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a sale by the gateway's transaction (or checkout session) id.
    pub async fn find_by_transaction_id(
        pool: &PgPool,
        transaction_id: &str,
    ) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sales WHERE transaction_id = $1");
        sqlx::query_as::<_, Sale>(&query)
            .bind(transaction_id)
            .fetch_optional(pool)
            .await
    }

    /// Count sales for a `(buyer, course)` pair.
    pub async fn count_for_buyer_course(
        pool: &PgPool,
        buyer_id: DbId,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sales WHERE buyer_id = $1 AND course_id = $2",
        )
        .bind(buyer_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Purchases made by a buyer, newest first.
    pub async fn list_by_buyer(
        pool: &PgPool,
        buyer_id: DbId,
    ) -> Result<Vec<SaleListing>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS}
             FROM sales s JOIN courses c ON c.id = s.course_id
             WHERE s.buyer_id = $1
             ORDER BY s.created_at DESC, s.id DESC"
        );
        sqlx::query_as::<_, SaleListing>(&query)
            .bind(buyer_id)
            .fetch_all(pool)
            .await
    }

    /// Sales of an instructor's courses, newest first.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<SaleListing>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS}
             FROM sales s JOIN courses c ON c.id = s.course_id
             WHERE s.instructor_id = $1
             ORDER BY s.created_at DESC, s.id DESC"
        );
        sqlx::query_as::<_, SaleListing>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }
}
