//! Checkout orchestration: pre-checks, the gateway call, and persistence.
//!
//! Handlers stay thin; everything that decides whether a purchase may go
//! ahead, and what gets written once the gateway has answered, lives here.
//! The transactional writes themselves are in
//! [`CheckoutRepo`](coursemart_db::repositories::CheckoutRepo).

pub mod webhook;

use coursemart_core::affiliate::normalize_code;
use coursemart_core::error::CoreError;
use coursemart_core::payment::{PaymentMethod, PaymentStatus, SaleStatus, METHOD_CREDIT};
use coursemart_core::types::{Cents, DbId};
use coursemart_db::models::course::Course;
use coursemart_db::models::sale::{CreateSale, Sale};
use coursemart_db::models::user::User;
use coursemart_db::repositories::{
    AffiliateRepo, CheckoutRepo, CourseRepo, EnrollmentRepo, Reconciliation, SaleRepo, UserRepo,
};
use coursemart_payments::{
    Buyer, CardDetails, CheckoutSessionRequest, PaymentMetadata, PaymentRequest, PaymentResult,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /checkout/process`.
#[derive(Debug, Deserialize)]
pub struct ProcessCheckout {
    pub course_id: DbId,
    /// `credit`, `pix`, or `boleto`.
    pub payment_method: String,
    pub affiliate_code: Option<String>,
    pub card: Option<CardDetails>,
    /// Buyer CPF/CNPJ, needed by some providers for boleto.
    pub document: Option<String>,
}

/// Response for `POST /checkout/process`.
#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub payment: PaymentResult,
    /// Whether access was granted by this request.
    pub enrolled: bool,
    /// Commission credited to the referring affiliate, if any.
    pub commission_cents: Option<Cents>,
}

/// Request body for `POST /checkout/create-checkout-session`.
#[derive(Debug, Deserialize)]
pub struct StartSession {
    pub course_id: DbId,
    pub affiliate_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub url: String,
    pub sale_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SessionState {
    pub session_id: String,
    pub sale_status: String,
    pub enrolled: bool,
}

/// Everything the pre-checks resolved for a purchase attempt.
struct Prepared {
    course: Course,
    buyer: User,
    affiliate_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Synchronous checkout.
///
/// Nothing is written unless the gateway call succeeds. Once it does, the
/// sale is always recorded; a `completed` sale grants access and posts the
/// commission in the same transaction, a `pending` one waits for the webhook.
pub async fn process(
    state: &AppState,
    buyer_id: DbId,
    input: ProcessCheckout,
) -> AppResult<CheckoutOutcome> {
    let method = PaymentMethod::from_str_value(&input.payment_method)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let prepared = prepare(state, buyer_id, input.course_id, input.affiliate_code.as_deref()).await?;

    let request = PaymentRequest {
        amount_cents: prepared.course.price_cents,
        method,
        description: prepared.course.title.clone(),
        buyer: Buyer {
            name: prepared.buyer.name.clone(),
            email: prepared.buyer.email.clone(),
            document: input.document,
        },
        card: input.card,
        metadata: metadata(&prepared),
    };

    let payment = state.gateway.process_payment(&request).await?;
    let status = SaleStatus::initial(payment.status);

    let recorded = CheckoutRepo::record_sale(
        &state.pool,
        &CreateSale {
            course_id: prepared.course.id,
            buyer_id,
            instructor_id: prepared.course.instructor_id,
            amount_cents: prepared.course.price_cents,
            payment_method: method.as_str().to_string(),
            status: status.as_str().to_string(),
            transaction_id: payment.transaction_id.clone(),
            affiliate_code: prepared.affiliate_code,
        },
    )
    .await?;

    tracing::info!(
        sale_id = recorded.sale.id,
        course_id = prepared.course.id,
        buyer_id,
        transaction_id = %payment.transaction_id,
        status = status.as_str(),
        enrolled = recorded.grant.enrolled,
        "Sale recorded",
    );

    Ok(CheckoutOutcome {
        enrolled: recorded.grant.enrolled,
        commission_cents: recorded.grant.commission.map(|c| c.commission_cents),
        sale: recorded.sale,
        payment,
    })
}

/// Hosted checkout: ask the gateway for a session and record a pending sale
/// keyed by the session id. Completion arrives through the webhook.
pub async fn create_session(
    state: &AppState,
    buyer_id: DbId,
    input: StartSession,
) -> AppResult<SessionCreated> {
    let prepared = prepare(state, buyer_id, input.course_id, input.affiliate_code.as_deref()).await?;

    let request = CheckoutSessionRequest {
        amount_cents: prepared.course.price_cents,
        title: prepared.course.title.clone(),
        buyer_email: prepared.buyer.email.clone(),
        success_url: state.config.payments.success_url.clone(),
        cancel_url: state.config.payments.cancel_url.clone(),
        metadata: metadata(&prepared),
    };
    let session = state.gateway.create_checkout_session(&request).await?;

    let recorded = CheckoutRepo::record_sale(
        &state.pool,
        &CreateSale {
            course_id: prepared.course.id,
            buyer_id,
            instructor_id: prepared.course.instructor_id,
            amount_cents: prepared.course.price_cents,
            payment_method: METHOD_CREDIT.to_string(),
            status: SaleStatus::Pending.as_str().to_string(),
            transaction_id: session.session_id.clone(),
            affiliate_code: prepared.affiliate_code,
        },
    )
    .await?;

    tracing::info!(
        sale_id = recorded.sale.id,
        session_id = %session.session_id,
        buyer_id,
        "Checkout session created",
    );

    Ok(SessionCreated {
        session_id: session.session_id,
        url: session.url,
        sale_id: recorded.sale.id,
    })
}

/// Status of a hosted checkout owned by `buyer_id`.
///
/// While the sale is still pending the provider is asked directly, and a
/// settled answer goes through the same reconciliation as a webhook. A
/// provider failure here only means the stored status is returned.
pub async fn session_status(
    state: &AppState,
    buyer_id: DbId,
    session_id: &str,
) -> AppResult<SessionState> {
    let mut sale = SaleRepo::find_by_transaction_id(&state.pool, session_id)
        .await?
        .filter(|s| s.buyer_id == buyer_id)
        .ok_or_else(|| AppError::NotFound(format!("Checkout session '{session_id}' not found")))?;

    if sale.status == SaleStatus::Pending.as_str() {
        match state.gateway.session_status(session_id).await {
            Ok(remote) if remote.status != PaymentStatus::Pending => {
                if let Reconciliation::Applied { sale: updated, .. } =
                    CheckoutRepo::apply_payment_update(&state.pool, session_id, remote.status)
                        .await?
                {
                    sale = updated;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Could not refresh checkout session");
            }
        }
    }

    let enrolled = EnrollmentRepo::exists(&state.pool, buyer_id, sale.course_id).await?;
    Ok(SessionState {
        session_id: session_id.to_string(),
        sale_status: sale.status,
        enrolled,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Checks shared by both checkout variants. No side effects.
async fn prepare(
    state: &AppState,
    buyer_id: DbId,
    course_id: DbId,
    affiliate_code: Option<&str>,
) -> AppResult<Prepared> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .filter(Course::is_published)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    if EnrollmentRepo::exists(&state.pool, buyer_id, course_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Already enrolled in this course".into(),
        )));
    }

    let buyer = UserRepo::find_by_id(&state.pool, buyer_id)
        .await?
        .ok_or_else(AppError::unauthenticated)?;

    Ok(Prepared {
        course,
        buyer,
        affiliate_code: resolve_affiliate(state, affiliate_code).await?,
    })
}

/// Keep the referral code only when it belongs to an active affiliate.
/// Anything else is dropped and the sale proceeds without attribution.
async fn resolve_affiliate(state: &AppState, code: Option<&str>) -> AppResult<Option<String>> {
    let Some(code) = code.and_then(normalize_code) else {
        return Ok(None);
    };
    match AffiliateRepo::find_active_by_code(&state.pool, &code).await? {
        Some(affiliate) => Ok(Some(affiliate.affiliate_code)),
        None => {
            tracing::debug!(code = %code, "Ignoring unknown or inactive affiliate code");
            Ok(None)
        }
    }
}

fn metadata(prepared: &Prepared) -> PaymentMetadata {
    PaymentMetadata {
        course_id: prepared.course.id,
        user_id: prepared.buyer.id,
        affiliate_code: prepared.affiliate_code.clone(),
    }
}
