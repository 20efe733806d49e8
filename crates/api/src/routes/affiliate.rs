//! Route definitions for the `/affiliate` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::affiliate;
use crate::state::AppState;

/// Routes mounted at `/affiliate`.
///
/// ```text
/// POST /register         -> register
/// GET  /me               -> me
/// GET  /sales            -> sales
/// GET  /validate/{code}  -> validate_code (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(affiliate::register))
        .route("/me", get(affiliate::me))
        .route("/sales", get(affiliate::sales))
        .route("/validate/{code}", get(affiliate::validate_code))
}
