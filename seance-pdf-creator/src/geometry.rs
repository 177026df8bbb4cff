//! Geometry primitives for report drawing
//!
//! Stateless path construction in top-down page coordinates (origin at the
//! top-left corner, y growing downwards). The document layer flips the y axis
//! when it turns these segments into PDF path operators.

use serde::{Deserialize, Serialize};

/// Cubic Bézier control-point distance for a quarter circle of radius 1.
pub const ARC_KAPPA: f32 = 4.0 / 3.0 * (std::f32::consts::SQRT_2 - 1.0);

/// RGB colour with 0-255 channels, as written in report options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Channels scaled to the 0.0-1.0 range PDF colour operators expect.
    pub fn components(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// Axis-aligned box in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Which corners of a rectangle get rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corners {
    All,
    /// Top corners rounded, bottom corners square (banner headers).
    Top,
}

/// How a closed path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Stroke,
    Fill,
    FillStroke,
}

impl PaintStyle {
    /// Parse the classic one/two letter style codes (`D`, `F`, `DF`, `FD`).
    /// Anything unknown strokes.
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "F" => PaintStyle::Fill,
            "DF" | "FD" => PaintStyle::FillStroke,
            _ => PaintStyle::Stroke,
        }
    }

    /// PDF path painting operator.
    pub fn operator(self) -> &'static str {
        match self {
            PaintStyle::Stroke => "S",
            PaintStyle::Fill => "f",
            PaintStyle::FillStroke => "B",
        }
    }
}

/// One segment of a path in top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CurveTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// Clamp a corner radius so opposite arcs never overlap.
pub fn clamp_radius(rect: &Rect, radius: f32) -> f32 {
    let limit = (rect.width.min(rect.height) / 2.0).max(0.0);
    radius.max(0.0).min(limit)
}

/// Build the closed outline of a rounded rectangle.
///
/// The path starts on the top edge and runs clockwise on the page. With
/// `Corners::Top` the two bottom corners are square so the shape can sit flush
/// on a box body drawn right below it.
pub fn rounded_rect_path(rect: Rect, radius: f32, corners: Corners) -> Vec<PathSegment> {
    let r = clamp_radius(&rect, radius);
    let k = ARC_KAPPA * r;
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);

    let mut path = Vec::with_capacity(10);
    path.push(PathSegment::MoveTo(x + r, y));
    path.push(PathSegment::LineTo(x + w - r, y));
    // top-right
    path.push(PathSegment::CurveTo(
        x + w - r + k,
        y,
        x + w,
        y + r - k,
        x + w,
        y + r,
    ));

    match corners {
        Corners::All => {
            path.push(PathSegment::LineTo(x + w, y + h - r));
            // bottom-right
            path.push(PathSegment::CurveTo(
                x + w,
                y + h - r + k,
                x + w - r + k,
                y + h,
                x + w - r,
                y + h,
            ));
            path.push(PathSegment::LineTo(x + r, y + h));
            // bottom-left
            path.push(PathSegment::CurveTo(
                x + r - k,
                y + h,
                x,
                y + h - r + k,
                x,
                y + h - r,
            ));
        }
        Corners::Top => {
            path.push(PathSegment::LineTo(x + w, y + h));
            path.push(PathSegment::LineTo(x, y + h));
        }
    }

    path.push(PathSegment::LineTo(x, y + r));
    // top-left
    path.push(PathSegment::CurveTo(x, y + r - k, x + r - k, y, x + r, y));
    path.push(PathSegment::Close);
    path
}

/// Fit an image of `(width, height)` pixels inside `frame`, keeping its aspect
/// ratio and centring it.
pub fn fit_centered(frame: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return frame;
    }
    let scale = (frame.width / width as f32).min(frame.height / height as f32);
    let w = width as f32 * scale;
    let h = height as f32 * scale;
    Rect::new(
        frame.x + (frame.width - w) / 2.0,
        frame.y + (frame.height - h) / 2.0,
        w,
        h,
    )
}
