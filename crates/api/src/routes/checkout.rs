//! Route definitions for the `/checkout` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

/// Routes mounted at `/checkout`.
///
/// ```text
/// POST /process                  -> process
/// POST /create-checkout-session  -> create_checkout_session
/// GET  /session-status           -> session_status
/// POST /webhook                  -> webhook (public, signature-checked)
/// GET  /sales                    -> sales (creator)
/// GET  /purchases                -> purchases
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process", post(checkout::process))
        .route(
            "/create-checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/session-status", get(checkout::session_status))
        .route("/webhook", post(checkout::webhook))
        .route("/sales", get(checkout::sales))
        .route("/purchases", get(checkout::purchases))
}
