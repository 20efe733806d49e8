//! Route definitions for the `/courses` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /       -> list_courses (public)
/// POST   /       -> create_course (creator)
/// GET    /mine   -> my_courses (creator)
/// GET    /{id}   -> get_course (public)
/// PUT    /{id}   -> update_course (owner or admin)
/// DELETE /{id}   -> delete_course (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(courses::list_courses).post(courses::create_course),
        )
        .route("/mine", get(courses::my_courses))
        .route(
            "/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
}
