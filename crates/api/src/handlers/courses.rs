//! Handlers for the `/courses` resource.
//!
//! The catalog (`GET /courses`, `GET /courses/{id}`) is public and only shows
//! published courses. Authoring requires the creator role, and changes to an
//! existing course are limited to its instructor or an admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursemart_core::course::{
    slugify, validate_course_title, validate_level, validate_modules, CourseStatus, LEVEL_BEGINNER,
};
use coursemart_core::error::CoreError;
use coursemart_core::landing::validate_slug;
use coursemart_core::money::validate_price;
use coursemart_core::types::DbId;
use coursemart_db::models::course::{Course, CourseFilter, CreateCourse, UpdateCourse};
use coursemart_db::repositories::{CourseRepo, NewCourse};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCreator;
use crate::response::DataResponse;
use crate::state::AppState;

/// How many numbered variants of a derived slug are tried before giving up.
const MAX_SLUG_ATTEMPTS: u32 = 50;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/courses?category=&search=&limit=&offset=
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::list_published(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/courses/{id}
///
/// Drafts are invisible here; instructors see them through `/courses/mine`.
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .filter(Course::is_published)
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/courses/mine
pub async fn my_courses(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::list_by_instructor(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

/// POST /api/courses
pub async fn create_course(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<impl IntoResponse> {
    validate_course_title(&input.title)?;
    validate_price(input.price_cents)?;
    validate_modules(&input.modules)?;
    let level = input.level.as_deref().unwrap_or(LEVEL_BEGINNER);
    validate_level(level)?;
    let status = match input.status.as_deref() {
        Some(s) => CourseStatus::from_str_value(s).map_err(CoreError::Validation)?,
        None => CourseStatus::Draft,
    };

    let slug = match input.slug.as_deref() {
        Some(slug) => {
            validate_slug(slug)?;
            if CourseRepo::slug_exists(&state.pool, slug).await? {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Slug '{slug}' is already taken"
                ))));
            }
            slug.to_string()
        }
        None => available_slug(&state, &input.title).await?,
    };

    let course = CourseRepo::create(
        &state.pool,
        &NewCourse {
            instructor_id: user.user_id,
            title: input.title.trim(),
            slug: &slug,
            description: input.description.as_deref(),
            thumbnail_url: input.thumbnail_url.as_deref(),
            category: input.category.as_deref(),
            level,
            price_cents: input.price_cents,
            status: status.as_str(),
            modules: &input.modules,
        },
    )
    .await?;

    tracing::info!(
        course_id = course.id,
        instructor_id = user.user_id,
        slug = %course.slug,
        "Course created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/courses/{id}
pub async fn update_course(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    load_owned(&state, &user, id).await?;

    if let Some(title) = &input.title {
        validate_course_title(title)?;
    }
    if let Some(price) = input.price_cents {
        validate_price(price)?;
    }
    if let Some(level) = &input.level {
        validate_level(level)?;
    }
    if let Some(status) = &input.status {
        CourseStatus::from_str_value(status).map_err(CoreError::Validation)?;
    }
    if let Some(modules) = &input.modules {
        validate_modules(modules)?;
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(course_id = id, user_id = user.user_id, "Course updated");
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/courses/{id}
///
/// Courses that have been sold or have students cannot be removed.
pub async fn delete_course(
    RequireCreator(user): RequireCreator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state, &user, id).await?;

    if CourseRepo::enrollment_count(&state.pool, id).await? > 0
        || !CourseRepo::delete(&state.pool, id).await?
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Course has enrollments or sales and cannot be deleted".into(),
        )));
    }

    tracing::info!(course_id = id, user_id = user.user_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Course",
        id,
    })
}

/// Load a course the caller may modify: its instructor, or any admin.
async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Course> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    if course.instructor_id != user.user_id && !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the course instructor can modify this course".into(),
        )));
    }
    Ok(course)
}

/// Slug derived from the title, numbered (`-2`, `-3`, ...) when taken.
async fn available_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = slugify(title);
    if base.is_empty() {
        return Err(AppError::BadRequest(
            "Title must contain letters or digits to derive a slug".into(),
        ));
    }
    if !CourseRepo::slug_exists(&state.pool, &base).await? {
        return Ok(base);
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{base}-{n}");
        if !CourseRepo::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "No free slug derived from '{base}'"
    ))))
}
