//! Lesson completion, progress percentage, and the lesson unlock rule.
//!
//! Progress is always computed against the course's live structure: only
//! completion markers for lessons that still exist count, and the total is
//! the current lesson count.

use serde::{Deserialize, Serialize};

use crate::course::{flatten_lessons, total_lessons, CourseModule, Lesson};
use crate::types::Timestamp;

/// A completion marker stored on an enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedLesson {
    pub module_id: String,
    pub lesson_id: String,
    pub completed_at: Timestamp,
}

/// Whether `(module_id, lesson_id)` is already marked complete.
pub fn is_completed(completed: &[CompletedLesson], module_id: &str, lesson_id: &str) -> bool {
    completed
        .iter()
        .any(|c| c.module_id == module_id && c.lesson_id == lesson_id)
}

/// Percent complete, `round(100 * completed / total)`, clamped to `[0, 100]`.
///
/// A course with no lessons reports 0.
pub fn compute_progress(completed: usize, total: usize) -> i16 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round() as i16;
    pct.clamp(0, 100)
}

/// Progress of an enrollment against the current course structure.
pub fn progress_for(modules: &[CourseModule], completed: &[CompletedLesson]) -> i16 {
    let done = flatten_lessons(modules)
        .into_iter()
        .filter(|(module_id, lesson)| is_completed(completed, module_id, &lesson.id))
        .count();
    compute_progress(done, total_lessons(modules))
}

/// Outcome of marking a lesson complete.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// `false` when the lesson had already been marked (no-op).
    pub newly_completed: bool,
    pub progress: i16,
}

/// Mark a lesson complete in `completed`, returning the new progress.
///
/// Idempotent: a second call for the same lesson leaves the list untouched
/// and reports the current progress.
pub fn mark_completed(
    modules: &[CourseModule],
    completed: &mut Vec<CompletedLesson>,
    module_id: &str,
    lesson_id: &str,
    now: Timestamp,
) -> CompletionOutcome {
    let newly_completed = !is_completed(completed, module_id, lesson_id);
    if newly_completed {
        completed.push(CompletedLesson {
            module_id: module_id.to_string(),
            lesson_id: lesson_id.to_string(),
            completed_at: now,
        });
    }
    CompletionOutcome {
        newly_completed,
        progress: progress_for(modules, completed),
    }
}

// ---------------------------------------------------------------------------
// Course outline with unlock state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LessonOutline {
    pub id: String,
    pub title: String,
    pub duration_secs: u32,
    pub completed: bool,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutline {
    pub id: String,
    pub title: String,
    pub lessons: Vec<LessonOutline>,
}

/// Whether the lesson at `index` of the flattened sequence is unlocked.
///
/// The first lesson is always unlocked. Every later lesson unlocks once its
/// immediate predecessor in the flattened sequence is complete; anything
/// whose predecessor cannot be resolved stays locked.
fn unlocked_at(flat: &[(&str, &Lesson)], completed: &[CompletedLesson], index: usize) -> bool {
    match index.checked_sub(1) {
        None => true,
        Some(prev) => flat
            .get(prev)
            .is_some_and(|(module_id, lesson)| is_completed(completed, module_id, &lesson.id)),
    }
}

/// Build the learner-facing outline: structure plus completed/unlocked flags.
pub fn build_outline(modules: &[CourseModule], completed: &[CompletedLesson]) -> Vec<ModuleOutline> {
    let flat = flatten_lessons(modules);
    let mut index = 0usize;
    modules
        .iter()
        .map(|module| ModuleOutline {
            id: module.id.clone(),
            title: module.title.clone(),
            lessons: module
                .lessons
                .iter()
                .map(|lesson| {
                    let unlocked = unlocked_at(&flat, completed, index);
                    index += 1;
                    LessonOutline {
                        id: lesson.id.clone(),
                        title: lesson.title.clone(),
                        duration_secs: lesson.duration_secs,
                        completed: is_completed(completed, &module.id, &lesson.id),
                        unlocked,
                    }
                })
                .collect(),
        })
        .collect()
}
