//! Handlers for the `/checkout` resource.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use coursemart_db::repositories::SaleRepo;
use serde::Deserialize;
use serde_json::json;

use crate::checkout::{self, webhook, ProcessCheckout, StartSession};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCreator;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionStatusParams {
    pub session_id: String,
}

/// POST /api/checkout/process
///
/// Charge the buyer and record the sale. Card payments usually grant access
/// immediately; PIX and boleto return payment instructions and settle later.
pub async fn process(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProcessCheckout>,
) -> AppResult<impl IntoResponse> {
    let outcome = checkout::process(&state, auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/checkout/create-checkout-session
pub async fn create_checkout_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartSession>,
) -> AppResult<impl IntoResponse> {
    let session = checkout::create_session(&state, auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/checkout/session-status?session_id=
pub async fn session_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SessionStatusParams>,
) -> AppResult<impl IntoResponse> {
    let status = checkout::session_status(&state, auth.user_id, &params.session_id).await?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/checkout/webhook
///
/// Raw body plus the provider's signature header. Always answers 200 so the
/// provider stops retrying; the outcome is kept in the webhook ledger.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(state.gateway.signature_header())
        .and_then(|v| v.to_str().ok());

    if let Some(event) = webhook::receive(&state, signature, &body).await {
        tracing::debug!(event_id = event.id, status = %event.status, "Webhook acknowledged");
    }

    Json(json!({ "received": true }))
}

/// GET /api/checkout/sales
///
/// Sales of the caller's courses.
pub async fn sales(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sales = SaleRepo::list_by_instructor(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: sales }))
}

/// GET /api/checkout/purchases
pub async fn purchases(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let purchases = SaleRepo::list_by_buyer(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: purchases }))
}
