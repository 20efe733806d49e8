//! Transactional writes for the checkout and reconciliation flows.
//!
//! Everything that must happen together when money changes hands lives here:
//! the sale row, the enrollment, the `total_students` counter and the
//! affiliate commission. Each public method runs in a single transaction.
//!
//! Idempotency rests on the database, not on read-then-write checks:
//!
//! - enrollments are inserted with `ON CONFLICT (user_id, course_id) DO NOTHING`
//!   and the course counter is only bumped when a row was actually created;
//! - affiliate sales are inserted with `ON CONFLICT (sale_id) DO NOTHING` and
//!   the affiliate counters are only bumped when a row was actually created;
//! - during webhook reconciliation the sale row is held with `FOR UPDATE`, so
//!   duplicate deliveries for the same transaction serialize.

use coursemart_core::affiliate::{AFFILIATE_ACTIVE, COMMISSION_APPROVED, COMMISSION_CANCELLED};
use coursemart_core::money::compute_commission;
use coursemart_core::payment::{plan_transition, PaymentStatus, SaleStatus, Transition};
use coursemart_core::types::{Cents, DbId};
use sqlx::{PgPool, Postgres, Transaction};

use super::affiliate_repo::SALE_COLUMNS as AFFILIATE_SALE_COLUMNS;
use super::sale_repo::COLUMNS as SALE_COLUMNS;
use crate::models::affiliate::AffiliateSale;
use crate::models::sale::{CreateSale, Sale};

/// Side effects of granting access for a completed sale.
#[derive(Debug, Clone, Default)]
pub struct AccessGrant {
    /// A new enrollment row was created.
    pub enrolled: bool,
    /// The commission posted for this sale, if one was created now.
    pub commission: Option<AffiliateSale>,
}

/// Result of [`CheckoutRepo::record_sale`].
#[derive(Debug, Clone)]
pub struct RecordedSale {
    pub sale: Sale,
    pub grant: AccessGrant,
}

/// Result of applying a gateway status to a stored sale.
#[derive(Debug, Clone)]
pub enum Reconciliation {
    /// No sale carries this transaction id.
    UnknownTransaction,
    /// The sale exists but the status does not move it (duplicate delivery,
    /// backwards move, or terminal state).
    Unchanged { sale: Sale },
    /// The sale moved to a new status.
    Applied {
        sale: Sale,
        transition: Transition,
        grant: AccessGrant,
        /// Commission cancelled by a refund of a completed sale.
        commission_reversed: Option<Cents>,
    },
}

pub struct CheckoutRepo;

impl CheckoutRepo {
    /// Insert a sale after the gateway has answered. If the sale is already
    /// `completed`, access and commission are granted in the same
    /// transaction.
    pub async fn record_sale(pool: &PgPool, input: &CreateSale) -> Result<RecordedSale, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO sales
                (course_id, buyer_id, instructor_id, amount_cents, payment_method,
                 status, transaction_id, affiliate_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SALE_COLUMNS}"
        );
        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(input.course_id)
            .bind(input.buyer_id)
            .bind(input.instructor_id)
            .bind(input.amount_cents)
            .bind(&input.payment_method)
            .bind(&input.status)
            .bind(&input.transaction_id)
            .bind(&input.affiliate_code)
            .fetch_one(&mut *tx)
            .await?;

        let grant = if sale.status == SaleStatus::Completed.as_str() {
            Self::grant_access(&mut tx, &sale).await?
        } else {
            AccessGrant::default()
        };

        tx.commit().await?;
        Ok(RecordedSale { sale, grant })
    }

    /// Remember the provider payment behind the sale keyed by
    /// `transaction_id`, so later updates that only know the payment still
    /// find the sale. An existing link is never overwritten.
    ///
    /// Returns `false` when no unlinked sale carries `transaction_id`.
    pub async fn link_payment_reference(
        pool: &PgPool,
        transaction_id: &str,
        payment_reference: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sales SET payment_reference = $2
             WHERE transaction_id = $1 AND payment_reference IS NULL AND transaction_id <> $2",
        )
        .bind(transaction_id)
        .bind(payment_reference)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a normalized gateway status to the sale with `transaction_id`,
    /// matched against either the sale's own id or its linked payment.
    pub async fn apply_payment_update(
        pool: &PgPool,
        transaction_id: &str,
        incoming: PaymentStatus,
    ) -> Result<Reconciliation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {SALE_COLUMNS} FROM sales
             WHERE transaction_id = $1 OR payment_reference = $1
             ORDER BY (transaction_id = $1) DESC
             LIMIT 1
             FOR UPDATE"
        );
        let Some(sale) = sqlx::query_as::<_, Sale>(&query)
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(Reconciliation::UnknownTransaction);
        };

        let current = SaleStatus::from_str_value(&sale.status)
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        let transition = plan_transition(current, incoming);
        let Some(target) = transition.target() else {
            return Ok(Reconciliation::Unchanged { sale });
        };

        let query = format!("UPDATE sales SET status = $2 WHERE id = $1 RETURNING {SALE_COLUMNS}");
        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(sale.id)
            .bind(target.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let mut grant = AccessGrant::default();
        let mut commission_reversed = None;
        match transition {
            Transition::Complete => grant = Self::grant_access(&mut tx, &sale).await?,
            Transition::Refund {
                reverse_commission: true,
            } => commission_reversed = Self::reverse_commission(&mut tx, sale.id).await?,
            _ => {}
        }

        tx.commit().await?;
        Ok(Reconciliation::Applied {
            sale,
            transition,
            grant,
            commission_reversed,
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Enroll the buyer and post the affiliate commission for a completed sale.
    async fn grant_access(
        tx: &mut Transaction<'_, Postgres>,
        sale: &Sale,
    ) -> Result<AccessGrant, sqlx::Error> {
        let enrollment_id: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO enrollments (user_id, course_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, course_id) DO NOTHING
             RETURNING id",
        )
        .bind(sale.buyer_id)
        .bind(sale.course_id)
        .fetch_optional(&mut **tx)
        .await?;

        let enrolled = enrollment_id.is_some();
        if enrolled {
            sqlx::query("UPDATE courses SET total_students = total_students + 1 WHERE id = $1")
                .bind(sale.course_id)
                .execute(&mut **tx)
                .await?;
        }

        let commission = match sale.affiliate_code.as_deref() {
            Some(code) => Self::post_commission(tx, sale, code).await?,
            None => None,
        };

        Ok(AccessGrant {
            enrolled,
            commission,
        })
    }

    /// Credit the affiliate behind `code`, once per sale. Inactive or unknown
    /// affiliates earn nothing.
    async fn post_commission(
        tx: &mut Transaction<'_, Postgres>,
        sale: &Sale,
        code: &str,
    ) -> Result<Option<AffiliateSale>, sqlx::Error> {
        let affiliate: Option<(DbId, f64)> = sqlx::query_as(
            "SELECT id, commission_rate FROM affiliates
             WHERE affiliate_code = $1 AND status = $2",
        )
        .bind(code)
        .bind(AFFILIATE_ACTIVE)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((affiliate_id, rate)) = affiliate else {
            tracing::warn!(sale_id = sale.id, code, "Affiliate no longer active, no commission");
            return Ok(None);
        };

        let commission = compute_commission(sale.amount_cents, rate);
        let query = format!(
            "INSERT INTO affiliate_sales
                (affiliate_id, sale_id, sale_amount_cents, commission_rate, commission_cents, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (sale_id) DO NOTHING
             RETURNING {AFFILIATE_SALE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, AffiliateSale>(&query)
            .bind(affiliate_id)
            .bind(sale.id)
            .bind(sale.amount_cents)
            .bind(rate)
            .bind(commission)
            .bind(COMMISSION_APPROVED)
            .fetch_optional(&mut **tx)
            .await?;

        if created.is_some() {
            sqlx::query(
                "UPDATE affiliates SET
                    total_sales = total_sales + 1,
                    total_earnings_cents = total_earnings_cents + $2,
                    pending_earnings_cents = pending_earnings_cents + $2
                 WHERE id = $1",
            )
            .bind(affiliate_id)
            .bind(commission)
            .execute(&mut **tx)
            .await?;
        }

        Ok(created)
    }

    /// Cancel a still-unpaid commission for a refunded sale and take it back
    /// out of the affiliate's totals. Paid commissions are left alone.
    async fn reverse_commission(
        tx: &mut Transaction<'_, Postgres>,
        sale_id: DbId,
    ) -> Result<Option<Cents>, sqlx::Error> {
        let cancelled: Option<(DbId, Cents)> = sqlx::query_as(
            "UPDATE affiliate_sales SET status = $3
             WHERE sale_id = $1 AND status = $2
             RETURNING affiliate_id, commission_cents",
        )
        .bind(sale_id)
        .bind(COMMISSION_APPROVED)
        .bind(COMMISSION_CANCELLED)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((affiliate_id, amount)) = cancelled else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE affiliates SET
                total_sales = total_sales - 1,
                total_earnings_cents = total_earnings_cents - $2,
                pending_earnings_cents = pending_earnings_cents - $2
             WHERE id = $1",
        )
        .bind(affiliate_id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;

        Ok(Some(amount))
    }
}
