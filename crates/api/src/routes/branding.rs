use axum::routing::get;
use axum::Router;

use crate::handlers::branding;
use crate::state::AppState;

/// Routes mounted at `/branding`.
///
/// ```text
/// GET /me             -> get_mine (creator)
/// PUT /me             -> upsert_mine (creator)
/// GET /{creator_id}   -> get_for_creator (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(branding::get_mine).put(branding::upsert_mine))
        .route("/{creator_id}", get(branding::get_for_creator))
}
