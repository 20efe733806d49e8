//! Handlers for the `/landing-pages` resource.
//!
//! Creators manage their own pages; `GET /landing-pages/public/{slug}` serves
//! published pages to anyone.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursemart_core::error::CoreError;
use coursemart_core::landing::{validate_hero, validate_sections, validate_slug};
use coursemart_core::types::DbId;
use coursemart_db::models::landing_page::{CreateLandingPage, LandingPage, UpdateLandingPage};
use coursemart_db::repositories::{CourseRepo, LandingPageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCreator;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/landing-pages
pub async fn list_pages(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pages = LandingPageRepo::list_by_creator(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: pages }))
}

/// POST /api/landing-pages
pub async fn create_page(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Json(input): Json<CreateLandingPage>,
) -> AppResult<impl IntoResponse> {
    validate_slug(&input.slug)?;
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    validate_hero(&input.hero)?;
    validate_sections(&input.sections)?;
    if let Some(course_id) = input.course_id {
        ensure_course_owned(&state, &user, course_id).await?;
    }

    let page = LandingPageRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(
        landing_page_id = page.id,
        slug = %page.slug,
        creator_id = user.user_id,
        "Landing page created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

/// GET /api/landing-pages/{id}
pub async fn get_page(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    let page = load_owned(&state, &user, id).await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/landing-pages/{id}
pub async fn update_page(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLandingPage>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    load_owned(&state, &user, id).await?;

    if let Some(slug) = &input.slug {
        validate_slug(slug)?;
    }
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    if let Some(hero) = &input.hero {
        validate_hero(hero)?;
    }
    if let Some(sections) = &input.sections {
        validate_sections(sections)?;
    }
    if let Some(course_id) = input.course_id {
        ensure_course_owned(&state, &user, course_id).await?;
    }

    let page = LandingPageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(landing_page_id = id, creator_id = user.user_id, "Landing page updated");
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/landing-pages/{id}
pub async fn delete_page(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state, &user, id).await?;
    if !LandingPageRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(landing_page_id = id, creator_id = user.user_id, "Landing page deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/landing-pages/public/{slug}
pub async fn public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    let page = LandingPageRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Landing page '{slug}' not found")))?;
    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "LandingPage",
        id,
    })
}

/// Pages of other creators look missing rather than forbidden.
async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<LandingPage> {
    LandingPageRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|page| page.creator_id == user.user_id || user.is_admin())
        .ok_or(not_found(id))
}

async fn ensure_course_owned(state: &AppState, user: &AuthUser, course_id: DbId) -> AppResult<()> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    if course.instructor_id != user.user_id && !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "A landing page can only promote your own course".into(),
        )));
    }
    Ok(())
}
