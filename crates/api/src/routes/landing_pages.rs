use axum::routing::get;
use axum::Router;

use crate::handlers::landing_pages;
use crate::state::AppState;

/// Routes mounted at `/landing-pages`.
///
/// ```text
/// GET    /                -> list_pages (creator)
/// POST   /                -> create_page (creator)
/// GET    /public/{slug}   -> public_page (public)
/// GET    /{id}            -> get_page (owner)
/// PUT    /{id}            -> update_page (owner)
/// DELETE /{id}            -> delete_page (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(landing_pages::list_pages).post(landing_pages::create_page),
        )
        .route("/public/{slug}", get(landing_pages::public_page))
        .route(
            "/{id}",
            get(landing_pages::get_page)
                .put(landing_pages::update_page)
                .delete(landing_pages::delete_page),
        )
}
