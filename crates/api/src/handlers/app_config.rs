//! Handlers for the `/config` resource: key/value application settings.
//!
//! Reading a single key is public; everything else is admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursemart_db::models::app_config::{AppConfig, CreateAppConfig, UpdateAppConfig};
use coursemart_db::repositories::AppConfigRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_KEY_LENGTH: usize = 100;

/// GET /api/config
pub async fn list_configs(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let configs = AppConfigRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: configs }))
}

/// GET /api/config/{key}
pub async fn get_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<AppConfig>>> {
    let config = AppConfigRepo::find_by_key(&state.pool, &key)
        .await?
        .ok_or_else(|| missing(&key))?;
    Ok(Json(DataResponse { data: config }))
}

/// POST /api/config
pub async fn create_config(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAppConfig>,
) -> AppResult<impl IntoResponse> {
    validate_key(&input.key)?;
    let config = AppConfigRepo::create(&state.pool, &input).await?;
    tracing::info!(key = %config.key, user_id = admin.user_id, "Config created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: config })))
}

/// PUT /api/config/{key}
pub async fn update_config(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpdateAppConfig>,
) -> AppResult<Json<DataResponse<AppConfig>>> {
    let config = AppConfigRepo::update(&state.pool, &key, &input)
        .await?
        .ok_or_else(|| missing(&key))?;
    tracing::info!(key = %key, user_id = admin.user_id, "Config updated");
    Ok(Json(DataResponse { data: config }))
}

/// DELETE /api/config/{key}
pub async fn delete_config(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    if !AppConfigRepo::delete(&state.pool, &key).await? {
        return Err(missing(&key));
    }
    tracing::info!(key = %key, user_id = admin.user_id, "Config deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn missing(key: &str) -> AppError {
    AppError::NotFound(format!("Config key '{key}' not found"))
}

/// Keys are dotted or dashed identifiers such as `checkout.max_installments`.
fn validate_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid config key '{key}'. Use letters, digits, '.', '_' or '-' (max {MAX_KEY_LENGTH})"
        )))
    }
}
