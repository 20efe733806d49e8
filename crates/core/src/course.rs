//! Course structure types and validation.
//!
//! A course embeds an ordered list of modules, each holding an ordered list
//! of lessons. The structure is stored as JSONB and validated here before
//! every write.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";

pub const VALID_COURSE_STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_PUBLISHED];

pub const LEVEL_BEGINNER: &str = "beginner";
pub const LEVEL_INTERMEDIATE: &str = "intermediate";
pub const LEVEL_ADVANCED: &str = "advanced";

pub const VALID_LEVELS: &[&str] = &[LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

/// Maximum length of a course, module, or lesson title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum number of modules in one course.
pub const MAX_MODULES: usize = 100;

/// Maximum number of lessons in one module.
pub const MAX_LESSONS_PER_MODULE: usize = 200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Publication status of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
}

impl CourseStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_PUBLISHED => Ok(Self::Published),
            _ => Err(format!(
                "Invalid course status '{s}'. Must be one of: {}",
                VALID_COURSE_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::Published => STATUS_PUBLISHED,
        }
    }
}

/// A module: an ordered group of lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A single lesson inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration_secs: u32,
    pub content: LessonContent,
}

/// Lesson payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonContent {
    Video { media_url: String },
    Text { body: String },
    Quiz { questions: Vec<QuizQuestion> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_title(kind: &str, title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{kind} title must not be empty")));
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "{kind} title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a course title.
pub fn validate_course_title(title: &str) -> Result<(), CoreError> {
    validate_title("Course", title)
}

/// Validate a course level.
pub fn validate_level(level: &str) -> Result<(), CoreError> {
    if VALID_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid level '{level}'. Must be one of: {}",
            VALID_LEVELS.join(", ")
        )))
    }
}

/// Validate the module/lesson tree of a course.
///
/// Module ids must be unique within the course and lesson ids unique within
/// their module. Titles must be non-empty, media references non-empty, and
/// quiz answers must point at an existing option.
pub fn validate_modules(modules: &[CourseModule]) -> Result<(), CoreError> {
    if modules.len() > MAX_MODULES {
        return Err(CoreError::Validation(format!(
            "A course may have at most {MAX_MODULES} modules"
        )));
    }

    let mut module_ids = HashSet::new();
    for module in modules {
        if module.id.trim().is_empty() {
            return Err(CoreError::Validation("Module id must not be empty".into()));
        }
        if !module_ids.insert(module.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate module id '{}'",
                module.id
            )));
        }
        validate_title("Module", &module.title)?;

        if module.lessons.len() > MAX_LESSONS_PER_MODULE {
            return Err(CoreError::Validation(format!(
                "Module '{}' has more than {MAX_LESSONS_PER_MODULE} lessons",
                module.id
            )));
        }

        let mut lesson_ids = HashSet::new();
        for lesson in &module.lessons {
            if lesson.id.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Lesson id must not be empty (module '{}')",
                    module.id
                )));
            }
            if !lesson_ids.insert(lesson.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate lesson id '{}' in module '{}'",
                    lesson.id, module.id
                )));
            }
            validate_title("Lesson", &lesson.title)?;
            validate_lesson_content(&lesson.id, &lesson.content)?;
        }
    }
    Ok(())
}

fn validate_lesson_content(lesson_id: &str, content: &LessonContent) -> Result<(), CoreError> {
    match content {
        LessonContent::Video { media_url } if media_url.trim().is_empty() => Err(
            CoreError::Validation(format!("Lesson '{lesson_id}' has an empty media reference")),
        ),
        LessonContent::Quiz { questions } => {
            for (i, q) in questions.iter().enumerate() {
                if q.options.len() < 2 {
                    return Err(CoreError::Validation(format!(
                        "Question {i} of lesson '{lesson_id}' needs at least two options"
                    )));
                }
                if q.correct_option >= q.options.len() {
                    return Err(CoreError::Validation(format!(
                        "Question {i} of lesson '{lesson_id}' points at a missing option"
                    )));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Structure queries
// ---------------------------------------------------------------------------

/// Total number of lessons across all modules.
pub fn total_lessons(modules: &[CourseModule]) -> usize {
    modules.iter().map(|m| m.lessons.len()).sum()
}

/// Total running time of the course in seconds.
pub fn total_duration_secs(modules: &[CourseModule]) -> u64 {
    modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .map(|l| u64::from(l.duration_secs))
        .sum()
}

/// Whether `(module_id, lesson_id)` names a lesson of this course.
pub fn contains_lesson(modules: &[CourseModule], module_id: &str, lesson_id: &str) -> bool {
    modules
        .iter()
        .find(|m| m.id == module_id)
        .is_some_and(|m| m.lessons.iter().any(|l| l.id == lesson_id))
}

/// The lesson sequence flattened in module order, as `(module_id, lesson)` pairs.
pub fn flatten_lessons(modules: &[CourseModule]) -> Vec<(&str, &Lesson)> {
    modules
        .iter()
        .flat_map(|m| m.lessons.iter().map(move |l| (m.id.as_str(), l)))
        .collect()
}

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
