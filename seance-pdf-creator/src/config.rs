//! Report options
//!
//! Page geometry, typography sizes, theme colours and asset locations. Every
//! field has a default so a partial JSON file only overrides what it names.

use crate::geometry::Rgb;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Layout and asset settings for one renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    // Page geometry, in points
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Distance from the page bottom to the footer baseline.
    pub footer_offset: f32,
    /// Space kept free above the footer; blocks never draw into it.
    pub footer_safety_margin: f32,

    // Typography
    pub title_font_size: f32,
    pub banner_font_size: f32,
    pub body_font_size: f32,
    pub subject_font_size: f32,
    pub footer_font_size: f32,
    pub line_spacing: f32,

    // Theme
    pub banner_color: Rgb,
    pub banner_text_color: Rgb,
    pub row_background: Rgb,
    pub frame_color: Rgb,
    pub highlight_color: Rgb,
    pub muted_color: Rgb,
    pub text_color: Rgb,

    // Content
    pub title: String,
    pub institution: String,

    // Assets
    pub assets_dir: PathBuf,
    /// Also look for fonts in the usual system font folders.
    pub use_system_fonts: bool,

    // Pagination
    pub max_blocks_per_page: usize,
    /// Minimum free height needed to start a block on the current page.
    pub min_block_space: f32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            // A4
            page_width: 595.28,
            page_height: 841.89,
            margin: 42.0,
            footer_offset: 26.0,
            footer_safety_margin: 56.0,

            title_font_size: 18.0,
            banner_font_size: 12.0,
            body_font_size: 10.0,
            subject_font_size: 8.0,
            footer_font_size: 8.0,
            line_spacing: 1.3,

            banner_color: Rgb(76, 140, 110),
            banner_text_color: Rgb::WHITE,
            row_background: Rgb(240, 246, 242),
            frame_color: Rgb(76, 140, 110),
            highlight_color: Rgb(230, 126, 34),
            muted_color: Rgb(128, 128, 128),
            text_color: Rgb(33, 33, 33),

            title: "Rapport de la séance".to_string(),
            institution: "Enseigner & Évaluer en 1P-2P".to_string(),

            assets_dir: PathBuf::from("assets"),
            use_system_fonts: true,

            max_blocks_per_page: 1,
            min_block_space: 180.0,
        }
    }
}

impl ReportOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid report options")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read report options from {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn with_assets_dir(mut self, assets_dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    pub fn images_dir(&self) -> PathBuf {
        self.assets_dir.join("images")
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.assets_dir.join("fonts")
    }

    /// Line height for a font size.
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_spacing
    }

    /// Left edge and width of the content column.
    pub fn content_column(&self) -> (f32, f32) {
        (self.margin, (self.page_width - 2.0 * self.margin).max(120.0))
    }

    /// Lowest y a block may reach before the footer area.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.footer_safety_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = ReportOptions::from_json_str(
            r#"{"institution": "École des Tilleuls", "max_blocks_per_page": 2, "banner_color": [10, 20, 30]}"#,
        )
        .unwrap();
        assert_eq!(options.institution, "École des Tilleuls");
        assert_eq!(options.max_blocks_per_page, 2);
        assert_eq!(options.banner_color, Rgb(10, 20, 30));
        assert_eq!(options.title, "Rapport de la séance");
        assert_eq!(options.page_width, ReportOptions::default().page_width);
    }

    #[test]
    fn asset_folders_live_under_assets_dir() {
        let options = ReportOptions::default().with_assets_dir("/srv/seance");
        assert_eq!(options.images_dir(), PathBuf::from("/srv/seance/images"));
        assert_eq!(options.fonts_dir(), PathBuf::from("/srv/seance/fonts"));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(ReportOptions::from_json_str("{ not json").is_err());
    }
}
