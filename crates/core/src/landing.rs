//! Landing page content blocks.
//!
//! Hero, sections, and layout are stored as JSONB but are always read and
//! written through these tagged types so malformed shapes are rejected at
//! the API boundary.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of sections on one landing page.
pub const MAX_SECTIONS: usize = 30;

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 100;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroBlock {
    pub headline: String,
    #[serde(default)]
    pub subheadline: Option<String>,
    #[serde(default)]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub cta: Option<CallToAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub author: String,
    pub quote: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// A landing page section, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    Text {
        #[serde(default)]
        heading: Option<String>,
        body: String,
    },
    Features {
        #[serde(default)]
        heading: Option<String>,
        items: Vec<FeatureItem>,
    },
    Testimonials {
        items: Vec<Testimonial>,
    },
    Pricing {
        #[serde(default)]
        heading: Option<String>,
        show_installments: bool,
    },
    Faq {
        items: Vec<FaqEntry>,
    },
    Cta(CallToAction),
    Video {
        media_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentWidth {
    Narrow,
    #[default]
    Wide,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub color_scheme: ColorScheme,
    #[serde(default)]
    pub content_width: ContentWidth,
    #[serde(default = "default_true")]
    pub show_navbar: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::default(),
            content_width: ContentWidth::default(),
            show_navbar: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a public slug (`lowercase-words-and-digits`).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > MAX_SLUG_LENGTH || !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits and single dashes \
             (max {MAX_SLUG_LENGTH} characters)"
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_cta(cta: &CallToAction) -> Result<(), CoreError> {
    require_text("Call to action label", &cta.label)?;
    require_text("Call to action url", &cta.url)
}

pub fn validate_hero(hero: &HeroBlock) -> Result<(), CoreError> {
    require_text("Hero headline", &hero.headline)?;
    if let Some(cta) = &hero.cta {
        validate_cta(cta)?;
    }
    Ok(())
}

pub fn validate_sections(sections: &[Section]) -> Result<(), CoreError> {
    if sections.len() > MAX_SECTIONS {
        return Err(CoreError::Validation(format!(
            "A landing page may have at most {MAX_SECTIONS} sections"
        )));
    }
    for section in sections {
        match section {
            Section::Text { body, .. } => require_text("Text section body", body)?,
            Section::Features { items, .. } if items.is_empty() => {
                return Err(CoreError::Validation(
                    "Features section needs at least one item".into(),
                ))
            }
            Section::Testimonials { items } if items.is_empty() => {
                return Err(CoreError::Validation(
                    "Testimonials section needs at least one item".into(),
                ))
            }
            Section::Faq { items } => {
                for entry in items {
                    require_text("FAQ question", &entry.question)?;
                    require_text("FAQ answer", &entry.answer)?;
                }
            }
            Section::Cta(cta) => validate_cta(cta)?,
            Section::Video { media_url } => require_text("Video section media url", media_url)?,
            _ => {}
        }
    }
    Ok(())
}
