//! Route definitions for `/admin`. Every handler requires the admin role.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /webhook-events               -> list_webhook_events
/// POST /webhook-events/{id}/replay   -> replay_webhook_event
/// PUT  /affiliates/{id}              -> update_affiliate
/// POST /affiliates/{id}/payout       -> payout_affiliate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook-events", get(admin::list_webhook_events))
        .route(
            "/webhook-events/{id}/replay",
            post(admin::replay_webhook_event),
        )
        .route("/affiliates/{id}", put(admin::update_affiliate))
        .route("/affiliates/{id}/payout", post(admin::payout_affiliate))
}
