use axum::routing::get;
use axum::Router;

use crate::handlers::app_config;
use crate::state::AppState;

/// Routes mounted at `/config`.
///
/// ```text
/// GET    /        -> list_configs (admin)
/// POST   /        -> create_config (admin)
/// GET    /{key}   -> get_config (public)
/// PUT    /{key}   -> update_config (admin)
/// DELETE /{key}   -> delete_config (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(app_config::list_configs).post(app_config::create_config),
        )
        .route(
            "/{key}",
            get(app_config::get_config)
                .put(app_config::update_config)
                .delete(app_config::delete_config),
        )
}
