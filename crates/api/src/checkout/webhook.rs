//! Webhook intake and the webhook ledger.
//!
//! Deliveries are always acknowledged to the provider. What actually
//! happened to each one is recorded in `webhook_events`, which is also what
//! an admin replays from.

use coursemart_core::error::CoreError;
use coursemart_core::payment::PaymentStatus;
use coursemart_core::types::DbId;
use coursemart_db::models::webhook_event::{
    WebhookEvent, WEBHOOK_FAILED, WEBHOOK_IGNORED, WEBHOOK_PROCESSED, WEBHOOK_RECEIVED,
    WEBHOOK_REJECTED,
};
use coursemart_db::repositories::{CheckoutRepo, NewWebhookEvent, Reconciliation, WebhookEventRepo};
use coursemart_payments::GatewayError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Verify, record, and apply one delivery.
///
/// Never fails: every outcome ends up in the ledger and the log. Returns the
/// ledger entry, or `None` if the ledger itself could not be written.
pub async fn receive(state: &AppState, signature: Option<&str>, body: &[u8]) -> Option<WebhookEvent> {
    let provider = state.gateway.provider();
    let payload: Option<serde_json::Value> = serde_json::from_slice(body).ok();

    let update = match state.gateway.handle_webhook(body, signature).await {
        Ok(Some(update)) => update,
        Ok(None) => {
            tracing::debug!(provider, "Webhook event carries no payment update");
            return record(state, provider, None, None, WEBHOOK_IGNORED, payload.as_ref(), None).await;
        }
        Err(e @ (GatewayError::Signature(_) | GatewayError::MalformedPayload(_))) => {
            tracing::warn!(provider, error = %e, "Rejected webhook delivery");
            let error = e.to_string();
            return record(state, provider, None, None, WEBHOOK_REJECTED, payload.as_ref(), Some(&error))
                .await;
        }
        Err(e) => {
            tracing::error!(provider, error = %e, "Webhook could not be interpreted");
            let error = e.to_string();
            return record(state, provider, None, None, WEBHOOK_FAILED, payload.as_ref(), Some(&error))
                .await;
        }
    };

    let event = record(
        state,
        provider,
        Some(&update.transaction_id),
        Some(update.status),
        WEBHOOK_RECEIVED,
        payload.as_ref(),
        None,
    )
    .await?;

    if let Some(reference) = update.payment_reference.as_deref() {
        match CheckoutRepo::link_payment_reference(&state.pool, &update.transaction_id, reference).await {
            Ok(true) => {
                tracing::debug!(
                    event_id = event.id,
                    transaction_id = %update.transaction_id,
                    reference,
                    "Linked payment reference",
                );
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(event_id = event.id, reference, error = %e, "Could not link payment reference");
            }
        }
    }

    match apply(state, event.id, &update.transaction_id, update.status).await {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(event_id = event.id, error = %e, "Could not record webhook outcome");
            Some(event)
        }
    }
}

/// Re-apply a stored, verified update through the same idempotent
/// reconciliation as a live delivery.
pub async fn replay(state: &AppState, event_id: DbId) -> AppResult<WebhookEvent> {
    let event = WebhookEventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WebhookEvent",
            id: event_id,
        }))?;

    let (Some(transaction_id), Some(status)) = (&event.transaction_id, &event.payment_status) else {
        return Err(AppError::BadRequest(format!(
            "Webhook event {event_id} carries no verified payment update"
        )));
    };
    let status = PaymentStatus::from_str_value(status).map_err(AppError::InternalError)?;

    tracing::info!(event_id, transaction_id = %transaction_id, "Replaying webhook event");
    apply(state, event.id, transaction_id, status).await
}

/// Reconcile the sale and store the outcome on the ledger entry.
async fn apply(
    state: &AppState,
    event_id: DbId,
    transaction_id: &str,
    status: PaymentStatus,
) -> AppResult<WebhookEvent> {
    let (outcome, error) =
        match CheckoutRepo::apply_payment_update(&state.pool, transaction_id, status).await {
            Ok(Reconciliation::UnknownTransaction) => {
                tracing::info!(event_id, transaction_id, "Webhook for unknown transaction");
                (WEBHOOK_IGNORED, Some("Unknown transaction".to_string()))
            }
            Ok(Reconciliation::Unchanged { sale }) => {
                tracing::debug!(
                    event_id,
                    sale_id = sale.id,
                    sale_status = %sale.status,
                    incoming = status.as_str(),
                    "Webhook left sale unchanged",
                );
                (WEBHOOK_PROCESSED, None)
            }
            Ok(Reconciliation::Applied {
                sale,
                transition,
                grant,
                commission_reversed,
            }) => {
                tracing::info!(
                    event_id,
                    sale_id = sale.id,
                    transaction_id,
                    sale_status = %sale.status,
                    ?transition,
                    enrolled = grant.enrolled,
                    commission_cents = grant.commission.as_ref().map(|c| c.commission_cents),
                    commission_reversed,
                    "Sale reconciled",
                );
                (WEBHOOK_PROCESSED, None)
            }
            Err(e) => {
                tracing::error!(event_id, transaction_id, error = %e, "Webhook reconciliation failed");
                (WEBHOOK_FAILED, Some(e.to_string()))
            }
        };

    WebhookEventRepo::set_outcome(&state.pool, event_id, outcome, error.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WebhookEvent",
            id: event_id,
        }))
}

async fn record(
    state: &AppState,
    provider: &str,
    transaction_id: Option<&str>,
    payment_status: Option<PaymentStatus>,
    status: &str,
    payload: Option<&serde_json::Value>,
    error: Option<&str>,
) -> Option<WebhookEvent> {
    let input = NewWebhookEvent {
        provider,
        transaction_id,
        payment_status: payment_status.map(|s| s.as_str()),
        status,
        payload,
        error,
    };
    match WebhookEventRepo::create(&state.pool, &input).await {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(provider, status, error = %e, "Could not write webhook ledger entry");
            None
        }
    }
}
