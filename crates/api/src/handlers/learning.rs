//! Handlers for the `/learning` resource: the enrolled learner's view of a
//! course and lesson completion.
//!
//! Progress is always computed against the course as it is now, so editing
//! a course after enrollment changes every learner's percentage.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use coursemart_core::course::{contains_lesson, total_lessons};
use coursemart_core::error::CoreError;
use coursemart_core::progress::{build_outline, mark_completed, progress_for, ModuleOutline};
use coursemart_core::types::{DbId, Timestamp};
use coursemart_db::models::course::Course;
use coursemart_db::models::enrollment::Enrollment;
use coursemart_db::repositories::{CourseRepo, EnrollmentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompleteLessonRequest {
    pub module_id: String,
    pub lesson_id: String,
}

#[derive(Debug, Serialize)]
pub struct CourseOutline {
    pub course_id: DbId,
    pub title: String,
    pub progress: i16,
    pub modules: Vec<ModuleOutline>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub module_id: String,
    pub lesson_id: String,
    /// `false` when the lesson had already been completed.
    pub newly_completed: bool,
    pub progress: i16,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub course_id: DbId,
    pub progress: i16,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/learning/courses/{course_id}
///
/// Course structure with `completed` and `unlocked` flags per lesson.
pub async fn course_outline(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseOutline>>> {
    let (course, enrollment) = load_enrolled(&state, auth.user_id, course_id).await?;
    let completed = &enrollment.completed_lessons.0;

    Ok(Json(DataResponse {
        data: CourseOutline {
            course_id: course.id,
            progress: progress_for(&course.modules, completed),
            modules: build_outline(&course.modules, completed),
            title: course.title,
        },
    }))
}

/// POST /api/learning/courses/{course_id}/lessons/complete
///
/// Idempotent: completing a lesson twice reports the same progress.
pub async fn complete_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CompleteLessonRequest>,
) -> AppResult<Json<DataResponse<CompletionResponse>>> {
    let (course, enrollment) = load_enrolled(&state, auth.user_id, course_id).await?;

    if !contains_lesson(&course.modules, &input.module_id, &input.lesson_id) {
        return Err(AppError::NotFound(format!(
            "Lesson '{}' in module '{}' is not part of course {course_id}",
            input.lesson_id, input.module_id
        )));
    }

    let mut completed = enrollment.completed_lessons.0.clone();
    let outcome = mark_completed(
        &course.modules,
        &mut completed,
        &input.module_id,
        &input.lesson_id,
        Utc::now(),
    );

    let completed_at = if outcome.newly_completed || outcome.progress != enrollment.progress {
        let updated = EnrollmentRepo::record_progress(
            &state.pool,
            enrollment.id,
            &completed,
            outcome.progress,
            Utc::now(),
        )
        .await?;
        tracing::info!(
            user_id = auth.user_id,
            course_id,
            lesson_id = %input.lesson_id,
            progress = outcome.progress,
            "Lesson completed",
        );
        updated.completed_at
    } else {
        enrollment.completed_at
    };

    Ok(Json(DataResponse {
        data: CompletionResponse {
            module_id: input.module_id,
            lesson_id: input.lesson_id,
            newly_completed: outcome.newly_completed,
            progress: outcome.progress,
            completed_at,
        },
    }))
}

/// GET /api/learning/courses/{course_id}/progress
pub async fn progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProgressResponse>>> {
    let (course, enrollment) = load_enrolled(&state, auth.user_id, course_id).await?;
    let completed = &enrollment.completed_lessons.0;
    let done = completed
        .iter()
        .filter(|c| contains_lesson(&course.modules, &c.module_id, &c.lesson_id))
        .count();

    Ok(Json(DataResponse {
        data: ProgressResponse {
            course_id,
            progress: progress_for(&course.modules, completed),
            completed_lessons: done,
            total_lessons: total_lessons(&course.modules),
            enrolled_at: enrollment.enrolled_at,
            completed_at: enrollment.completed_at,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The course and the caller's enrollment in it. 404 for a missing course,
/// 403 when the caller is not enrolled.
async fn load_enrolled(
    state: &AppState,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<(Course, Enrollment)> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    let enrollment = EnrollmentRepo::find(&state.pool, user_id, course_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "You are not enrolled in this course".into(),
            ))
        })?;
    Ok((course, enrollment))
}
