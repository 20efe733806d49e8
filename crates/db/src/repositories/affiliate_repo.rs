//! Repository for the `affiliates` and `affiliate_sales` tables.
//!
//! Commission posting happens inside the checkout transaction (see
//! [`CheckoutRepo`](super::CheckoutRepo)); this repo covers account
//! management, lookups, and payouts.

use coursemart_core::affiliate::{AFFILIATE_ACTIVE, COMMISSION_APPROVED, COMMISSION_PAID};
use coursemart_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::affiliate::{Affiliate, AffiliateSale, Payout, UpdateAffiliate};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, affiliate_code, commission_rate, status, \
                                  total_earnings_cents, pending_earnings_cents, \
                                  paid_earnings_cents, total_sales, created_at, updated_at";

pub(crate) const SALE_COLUMNS: &str = "id, affiliate_id, sale_id, sale_amount_cents, \
                                       commission_rate, commission_cents, status, \
                                       created_at, updated_at";

pub struct AffiliateRepo;

impl AffiliateRepo {
    /// Register an affiliate account. Violates `uq_affiliates_user_id` if the
    /// user already has one and `uq_affiliates_code` on a code collision.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        code: &str,
        commission_rate: f64,
    ) -> Result<Affiliate, sqlx::Error> {
        let query = format!(
            "INSERT INTO affiliates (user_id, affiliate_code, commission_rate)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(user_id)
            .bind(code)
            .bind(commission_rate)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM affiliates WHERE id = $1");
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM affiliates WHERE user_id = $1");
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an affiliate by code, only if the account is `active`.
    pub async fn find_active_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM affiliates WHERE affiliate_code = $1 AND status = $2"
        );
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(code)
            .bind(AFFILIATE_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Commission records of an affiliate, newest first.
    pub async fn list_sales(
        pool: &PgPool,
        affiliate_id: DbId,
    ) -> Result<Vec<AffiliateSale>, sqlx::Error> {
        let query = format!(
            "SELECT {SALE_COLUMNS} FROM affiliate_sales
             WHERE affiliate_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AffiliateSale>(&query)
            .bind(affiliate_id)
            .fetch_all(pool)
            .await
    }

    /// All commission records referencing a sale (0 or 1 by constraint).
    pub async fn sales_for_sale(
        pool: &PgPool,
        sale_id: DbId,
    ) -> Result<Vec<AffiliateSale>, sqlx::Error> {
        let query = format!("SELECT {SALE_COLUMNS} FROM affiliate_sales WHERE sale_id = $1");
        sqlx::query_as::<_, AffiliateSale>(&query)
            .bind(sale_id)
            .fetch_all(pool)
            .await
    }

    /// Admin update of rate and/or status.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAffiliate,
    ) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!(
            "UPDATE affiliates SET
                commission_rate = COALESCE($2, commission_rate),
                status = COALESCE($3, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(id)
            .bind(input.commission_rate)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Pay out the pending balance: approved commissions become `paid` and
    /// their sum moves from pending to paid earnings.
    ///
    /// Returns `None` if the affiliate does not exist.
    pub async fn payout(pool: &PgPool, id: DbId) -> Result<Option<Payout>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>("SELECT id FROM affiliates WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let (count, amount) = Self::mark_approved_paid(&mut tx, id).await?;

        sqlx::query(
            "UPDATE affiliates SET
                pending_earnings_cents = pending_earnings_cents - $2,
                paid_earnings_cents = paid_earnings_cents + $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(Payout {
            affiliate_id: id,
            amount_cents: amount,
            commissions_paid: count,
        }))
    }

    async fn mark_approved_paid(
        tx: &mut Transaction<'_, Postgres>,
        affiliate_id: DbId,
    ) -> Result<(u64, i64), sqlx::Error> {
        let paid: Vec<i64> = sqlx::query_scalar(
            "UPDATE affiliate_sales SET status = $3
             WHERE affiliate_id = $1 AND status = $2
             RETURNING commission_cents",
        )
        .bind(affiliate_id)
        .bind(COMMISSION_APPROVED)
        .bind(COMMISSION_PAID)
        .fetch_all(&mut **tx)
        .await?;
        Ok((paid.len() as u64, paid.iter().sum()))
    }
}
