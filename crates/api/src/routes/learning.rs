use axum::routing::{get, post};
use axum::Router;

use crate::handlers::learning;
use crate::state::AppState;

/// Routes mounted at `/learning`. All require an enrollment in the course.
///
/// ```text
/// GET  /courses/{course_id}                   -> course_outline
/// POST /courses/{course_id}/lessons/complete  -> complete_lesson
/// GET  /courses/{course_id}/progress          -> progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses/{course_id}", get(learning::course_outline))
        .route(
            "/courses/{course_id}/lessons/complete",
            post(learning::complete_lesson),
        )
        .route("/courses/{course_id}/progress", get(learning::progress))
}
