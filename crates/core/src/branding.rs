//! Creator branding: color palette and typography.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MIN_BASE_FONT_PX: u16 = 10;
pub const MAX_BASE_FONT_PX: u16 = 32;

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for BrandColors {
    fn default() -> Self {
        Self {
            primary: "#6366f1".into(),
            secondary: "#0ea5e9".into(),
            accent: "#f59e0b".into(),
            background: "#ffffff".into(),
            text: "#111827".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub base_size_px: u16,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            heading_font: "Inter".into(),
            body_font: "Inter".into(),
            base_size_px: 16,
        }
    }
}

/// Validate every palette entry as a `#rrggbb` color.
pub fn validate_colors(colors: &BrandColors) -> Result<(), CoreError> {
    for (name, value) in [
        ("primary", &colors.primary),
        ("secondary", &colors.secondary),
        ("accent", &colors.accent),
        ("background", &colors.background),
        ("text", &colors.text),
    ] {
        if !HEX_COLOR_RE.is_match(value) {
            return Err(CoreError::Validation(format!(
                "Color '{name}' must be a #rrggbb hex value, got '{value}'"
            )));
        }
    }
    Ok(())
}

pub fn validate_typography(typography: &Typography) -> Result<(), CoreError> {
    if typography.heading_font.trim().is_empty() || typography.body_font.trim().is_empty() {
        return Err(CoreError::Validation("Font names must not be empty".into()));
    }
    if !(MIN_BASE_FONT_PX..=MAX_BASE_FONT_PX).contains(&typography.base_size_px) {
        return Err(CoreError::Validation(format!(
            "Base font size must be between {MIN_BASE_FONT_PX} and {MAX_BASE_FONT_PX} px"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_colors(&BrandColors::default()).is_ok());
        assert!(validate_typography(&Typography::default()).is_ok());
    }

    #[test]
    fn bad_color_rejected() {
        let colors = BrandColors {
            accent: "orange".into(),
            ..BrandColors::default()
        };
        let err = validate_colors(&colors).unwrap_err();
        assert!(err.to_string().contains("accent"));
    }

    #[test]
    fn font_size_bounds() {
        let t = Typography {
            base_size_px: 8,
            ..Typography::default()
        };
        assert!(validate_typography(&t).is_err());
    }
}
