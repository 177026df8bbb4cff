//! Optional image assets: logo, header figures and Likert icons
//!
//! Every asset is optional. A file that is missing or cannot be decoded is
//! logged and skipped; callers decide what to draw instead.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::observation::Level;

pub const LOGO_CANDIDATES: [&str; 2] = ["logo.png", "logo.jpg"];
pub const LEFT_FIGURE_CANDIDATES: [&str; 2] = ["figure_gauche.png", "figure_gauche.jpg"];
pub const RIGHT_FIGURE_CANDIDATES: [&str; 2] = ["figure_droite.png", "figure_droite.jpg"];

/// Candidate file names for a Likert level, tried in order.
pub fn likert_icon_candidates(level: Level) -> &'static [&'static str] {
    match level {
        Level::Seed => &["graine.png", "seed.png", "niveau_1.png", "graine.jpg"],
        Level::Sprout => &["pousse.png", "sprout.png", "niveau_2.png", "pousse.jpg"],
        Level::Bloom => &["fleur.png", "flower.png", "niveau_3.png", "fleur.jpg"],
    }
}

/// A decoded raster image ready to be written as a PDF image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// Stable key used to share one XObject between uses.
    pub key: String,
    pub width: u32,
    pub height: u32,
    /// 8-bit RGB samples, row-major.
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples, `None` when the image is fully opaque.
    pub alpha: Option<Vec<u8>>,
}

impl ImageAsset {
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .map_err(|e| anyhow!("cannot decode image {}: {}", path.display(), e))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in decoded.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(alpha)
        };

        Ok(Self {
            key: path.to_string_lossy().into_owned(),
            width,
            height,
            rgb,
            alpha,
        })
    }
}

/// First candidate under `dir` that loads.
pub fn resolve_image(dir: &Path, candidates: &[&str]) -> Option<ImageAsset> {
    for name in candidates {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match ImageAsset::load(&path) {
            Ok(asset) => {
                log::debug!("Resolved asset {}", path.display());
                return Some(asset);
            }
            Err(e) => log::warn!("Skipping asset: {}", e),
        }
    }
    None
}

/// Fill gaps in per-level icons with any other level's icon so the scale
/// never shows an empty box while at least one icon exists.
pub fn complete_icon_set(found: [Option<ImageAsset>; 3]) -> [Option<ImageAsset>; 3] {
    let spare = found.iter().flatten().next().cloned();
    found.map(|icon| icon.or_else(|| spare.clone()))
}

/// Everything the report header and the Likert widget may draw.
#[derive(Debug, Clone, Default)]
pub struct ReportAssets {
    pub logo: Option<ImageAsset>,
    pub left_figure: Option<ImageAsset>,
    pub right_figure: Option<ImageAsset>,
    pub likert_icons: [Option<ImageAsset>; 3],
}

impl ReportAssets {
    /// Resolve all assets under `images_dir`. Never fails.
    pub fn load(images_dir: &Path) -> Self {
        if !images_dir.is_dir() {
            log::warn!(
                "Image folder {} not found; header images skipped, Likert scale uses digits",
                images_dir.display()
            );
            return Self::default();
        }

        let icons =
            Level::ALL.map(|level| resolve_image(images_dir, likert_icon_candidates(level)));
        let likert_icons = complete_icon_set(icons);
        if likert_icons.iter().all(Option::is_none) {
            log::info!("No Likert icons in {}; using digits", images_dir.display());
        }

        Self {
            logo: resolve_image(images_dir, &LOGO_CANDIDATES),
            left_figure: resolve_image(images_dir, &LEFT_FIGURE_CANDIDATES),
            right_figure: resolve_image(images_dir, &RIGHT_FIGURE_CANDIDATES),
            likert_icons,
        }
    }

    pub fn likert_icon(&self, level: Level) -> Option<&ImageAsset> {
        self.likert_icons[level.index()].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(key: &str) -> ImageAsset {
        ImageAsset {
            key: key.to_string(),
            width: 1,
            height: 1,
            rgb: vec![0, 128, 0],
            alpha: None,
        }
    }

    #[test]
    fn missing_levels_borrow_another_icon() {
        let icons = complete_icon_set([None, Some(pixel("pousse")), None]);
        assert!(icons.iter().all(|icon| icon.as_ref().map(|i| i.key.as_str()) == Some("pousse")));
    }

    #[test]
    fn no_icons_stay_empty() {
        let icons = complete_icon_set([None, None, None]);
        assert!(icons.iter().all(Option::is_none));
    }

    #[test]
    fn missing_folder_yields_no_assets() {
        let assets = ReportAssets::load(Path::new("/nonexistent/images"));
        assert!(assets.logo.is_none());
        assert!(assets.likert_icon(Level::Bloom).is_none());
    }

    #[test]
    fn icons_and_logo_are_decoded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut icon = image::RgbaImage::new(4, 2);
        for p in icon.pixels_mut() {
            *p = image::Rgba([200, 10, 10, 128]);
        }
        icon.save(dir.path().join("fleur.png")).unwrap();
        image::RgbImage::new(3, 3).save(dir.path().join("logo.png")).unwrap();

        let assets = ReportAssets::load(dir.path());
        let logo = assets.logo.as_ref().unwrap();
        assert_eq!((logo.width, logo.height), (3, 3));
        assert!(logo.alpha.is_none());

        // only the flower exists, the other levels reuse it
        let seed = assets.likert_icon(Level::Seed).unwrap();
        assert_eq!((seed.width, seed.height), (4, 2));
        assert_eq!(seed.alpha.as_ref().unwrap().len(), 8);
        assert!(seed.key.ends_with("fleur.png"));
    }
}
