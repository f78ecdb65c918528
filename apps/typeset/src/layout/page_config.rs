//! Page geometry and typographic constants shared by layout, pagination and rendering.

use serde::{Deserialize, Serialize};

use crate::errors::RenderError;

/// A4 width in PDF user units.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 height in PDF user units.
pub const PAGE_HEIGHT: f32 = 842.0;
/// Margin on all four sides.
pub const PAGE_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Body text, contact lines, list items and job-entry heads.
    pub base_font_size: f32,
    /// Header name.
    pub name_font_size: f32,
    pub section_title_size: f32,
    /// Line advance as a multiple of the font size (10pt body -> 12pt advance).
    pub leading: f32,
    /// Left indent of list item text.
    pub list_indent: f32,
    /// Distance from the bullet glyph to the item text.
    pub bullet_gap: f32,
    /// Free space required below a section start before it may begin on the current page.
    pub section_low_water: f32,
    /// Free space required below a single text line.
    pub line_low_water: f32,
    /// Vertical space after the header block.
    pub header_gap: f32,
    /// Vertical space before each section title.
    pub section_gap: f32,
    /// Vertical space between the title rule and the first content line.
    pub title_gap: f32,
    /// Vertical space between consecutive blocks of one section.
    pub block_gap: f32,
    /// Distance of the title rule below the title baseline.
    pub rule_offset: f32,
    /// Flate-compress page content streams.
    pub compress: bool,
}

/// Returns the default page config: A4, 50-unit margins, Helvetica 10pt body.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width: PAGE_WIDTH,
        page_height: PAGE_HEIGHT,
        margin: PAGE_MARGIN,
        base_font_size: 10.0,
        name_font_size: 18.0,
        section_title_size: 12.0,
        leading: 1.2,
        list_indent: 15.0,
        bullet_gap: 10.0,
        section_low_water: 100.0,
        line_low_water: 50.0,
        header_gap: 18.0,
        section_gap: 10.0,
        title_gap: 6.0,
        block_gap: 4.0,
        rule_offset: 5.0,
        compress: true,
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        default_page_config()
    }
}

impl PageConfig {
    /// Width available to text between the left and right margins.
    pub fn column_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Baseline-to-baseline advance for a line set at `font_size`.
    pub fn line_advance(&self, font_size: f32) -> f32 {
        font_size * self.leading
    }

    /// Top of the text area on a fresh page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Rejects geometry that cannot hold a single line of body text.
    pub fn validate(&self) -> Result<(), RenderError> {
        let sizes = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("base_font_size", self.base_font_size),
            ("name_font_size", self.name_font_size),
            ("section_title_size", self.section_title_size),
            ("leading", self.leading),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let spacings = [
            ("margin", self.margin),
            ("list_indent", self.list_indent),
            ("bullet_gap", self.bullet_gap),
            ("section_low_water", self.section_low_water),
            ("line_low_water", self.line_low_water),
            ("header_gap", self.header_gap),
            ("section_gap", self.section_gap),
            ("title_gap", self.title_gap),
            ("block_gap", self.block_gap),
            ("rule_offset", self.rule_offset),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value < 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if self.column_width() <= self.list_indent {
            return Err(RenderError::InvalidConfig(format!(
                "margins of {} leave no column on a {}-unit page",
                self.margin, self.page_width
            )));
        }
        let usable = self.page_height - 2.0 * self.margin;
        if usable < self.line_advance(self.base_font_size) + self.line_low_water {
            return Err(RenderError::InvalidConfig(format!(
                "page height {} cannot hold a single body line",
                self.page_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_a4_with_fifty_unit_margins() {
        let config = default_page_config();
        assert_eq!(config.page_width, 595.0);
        assert_eq!(config.page_height, 842.0);
        assert_eq!(config.margin, 50.0);
        assert_eq!(config.column_width(), 495.0);
        assert_eq!(config.top(), 792.0);
    }

    #[test]
    fn test_body_line_advance_is_twelve_points() {
        let config = default_page_config();
        assert!((config.line_advance(config.base_font_size) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(default_page_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite_font_size() {
        let config = PageConfig {
            base_font_size: f32::NAN,
            ..default_page_config()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_margins_wider_than_page() {
        let config = PageConfig {
            margin: 300.0,
            ..default_page_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("leave no column"), "got {err}");
    }
}
