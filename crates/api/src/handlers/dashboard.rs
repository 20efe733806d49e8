//! Handlers for the `/dashboard` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use coursemart_core::roles::is_creator_or_admin;
use coursemart_core::search::clamp_limit;
use coursemart_db::models::dashboard::{CreatorStats, StudentStats};
use coursemart_db::repositories::{CourseRepo, DashboardRepo, EnrollmentRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_RECOMMENDATIONS: i64 = 6;
const MAX_RECOMMENDATIONS: i64 = 24;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub learning: StudentStats,
    /// Present for creators and admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaching: Option<CreatorStats>,
}

/// GET /api/dashboard/my-courses
pub async fn my_courses(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let courses = EnrollmentRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/dashboard/stats
pub async fn stats(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let learning = DashboardRepo::student_stats(&state.pool, auth.user_id).await?;
    let teaching = if is_creator_or_admin(&auth.role) {
        Some(DashboardRepo::creator_stats(&state.pool, auth.user_id).await?)
    } else {
        None
    };
    Ok(Json(DataResponse {
        data: DashboardStats { learning, teaching },
    }))
}

/// GET /api/dashboard/recommendations?limit=
pub async fn recommendations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_RECOMMENDATIONS, MAX_RECOMMENDATIONS);
    let courses = CourseRepo::recommendations(&state.pool, auth.user_id, limit).await?;
    Ok(Json(DataResponse { data: courses }))
}
