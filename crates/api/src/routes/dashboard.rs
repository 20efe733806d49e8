use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`. All require auth.
///
/// ```text
/// GET /my-courses       -> my_courses
/// GET /stats            -> stats
/// GET /recommendations  -> recommendations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-courses", get(dashboard::my_courses))
        .route("/stats", get(dashboard::stats))
        .route("/recommendations", get(dashboard::recommendations))
}
