//! Admin handlers: webhook ledger and affiliate management.
//!
//! All endpoints require the admin role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use coursemart_core::affiliate::validate_status;
use coursemart_core::error::CoreError;
use coursemart_core::money::validate_commission_rate;
use coursemart_core::search::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use coursemart_core::types::DbId;
use coursemart_db::models::affiliate::UpdateAffiliate;
use coursemart_db::models::webhook_event::VALID_WEBHOOK_STATUSES;
use coursemart_db::repositories::{AffiliateRepo, WebhookEventRepo};

use crate::checkout::webhook;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Webhook ledger
// ---------------------------------------------------------------------------

/// GET /api/admin/webhook-events?status=&limit=&offset=
pub async fn list_webhook_events(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = params.status.as_deref() {
        if !VALID_WEBHOOK_STATUSES.contains(&status) {
            return Err(AppError::BadRequest(format!(
                "Invalid status '{status}'. Must be one of: {}",
                VALID_WEBHOOK_STATUSES.join(", ")
            )));
        }
    }
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let events =
        WebhookEventRepo::list(&state.pool, params.status.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/admin/webhook-events/{id}/replay
///
/// Re-apply a stored verified update. Safe to repeat.
pub async fn replay_webhook_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = webhook::replay(&state, id).await?;
    tracing::info!(
        event_id = id,
        outcome = %event.status,
        user_id = admin.user_id,
        "Webhook event replayed",
    );
    Ok(Json(DataResponse { data: event }))
}

// ---------------------------------------------------------------------------
// Affiliates
// ---------------------------------------------------------------------------

/// PUT /api/admin/affiliates/{id}
///
/// Change an affiliate's commission rate (0-100) or status.
pub async fn update_affiliate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAffiliate>,
) -> AppResult<impl IntoResponse> {
    if let Some(rate) = input.commission_rate {
        validate_commission_rate(rate)?;
    }
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    let affiliate = AffiliateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Affiliate",
            id,
        }))?;

    tracing::info!(
        affiliate_id = id,
        status = %affiliate.status,
        commission_rate = affiliate.commission_rate,
        user_id = admin.user_id,
        "Affiliate updated",
    );
    Ok(Json(DataResponse { data: affiliate }))
}

/// POST /api/admin/affiliates/{id}/payout
pub async fn payout_affiliate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let payout = AffiliateRepo::payout(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Affiliate",
            id,
        }))?;

    tracing::info!(
        affiliate_id = id,
        amount_cents = payout.amount_cents,
        commissions_paid = payout.commissions_paid,
        user_id = admin.user_id,
        "Affiliate paid out",
    );
    Ok(Json(DataResponse { data: payout }))
}
