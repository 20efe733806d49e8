//! Handlers for the `/branding` resource (one branding per creator).

use axum::extract::{Path, State};
use axum::Json;
use coursemart_core::branding::{validate_colors, validate_typography};
use coursemart_core::types::DbId;
use coursemart_db::models::branding::{Branding, UpsertBranding};
use coursemart_db::repositories::BrandingRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireCreator;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/branding/me
pub async fn get_mine(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Branding>>> {
    find(&state, user.user_id).await
}

/// PUT /api/branding/me
///
/// Create or replace the caller's branding.
pub async fn upsert_mine(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Json(input): Json<UpsertBranding>,
) -> AppResult<Json<DataResponse<Branding>>> {
    validate_colors(&input.colors)?;
    validate_typography(&input.typography)?;

    let branding = BrandingRepo::upsert(&state.pool, user.user_id, &input).await?;
    tracing::info!(creator_id = user.user_id, "Branding saved");
    Ok(Json(DataResponse { data: branding }))
}

/// GET /api/branding/{creator_id}
///
/// Public, so landing pages can be themed.
pub async fn get_for_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Branding>>> {
    find(&state, creator_id).await
}

async fn find(state: &AppState, creator_id: DbId) -> AppResult<Json<DataResponse<Branding>>> {
    let branding = BrandingRepo::find_by_creator(&state.pool, creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No branding for creator {creator_id}")))?;
    Ok(Json(DataResponse { data: branding }))
}
