//! Three-level Likert scale widget (seed / sprout / flower)

use anyhow::Result;

use crate::assets::ImageAsset;
use crate::document::{DocumentContext, TextStyle};
use crate::fonts::FontStyle;
use crate::geometry::{fit_centered, Corners, PaintStyle, Rect, Rgb};
use crate::observation::Level;

pub const BOX_SIZE: f32 = 22.0;
pub const BOX_GAP: f32 = 4.0;
const BOX_RADIUS: f32 = 3.0;
const ICON_INSET: f32 = 3.0;
const DIGIT_SIZE: f32 = 11.0;
const SELECTED_LINE_WIDTH: f32 = 1.6;
const NEUTRAL_LINE_WIDTH: f32 = 0.5;
const NEUTRAL_STROKE: Rgb = Rgb(180, 180, 180);

/// What a box of the scale shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikertCell {
    /// Asset key of the icon drawn.
    Icon(String),
    /// ASCII digit drawn when no icon resolved.
    Digit(char),
}

/// Width and height of the whole widget.
pub fn widget_size() -> (f32, f32) {
    (3.0 * BOX_SIZE + 2.0 * BOX_GAP, BOX_SIZE)
}

/// Digit shown for a level when no icon is available.
pub fn fallback_digit(level: Level) -> char {
    match level {
        Level::Seed => '1',
        Level::Sprout => '2',
        Level::Bloom => '3',
    }
}

/// Draw the scale with its top-left corner at `(x, y)`, highlighting
/// `selected`. Returns what each box contains, lowest level first.
pub fn draw_likert(
    doc: &mut DocumentContext<'_>,
    x: f32,
    y: f32,
    selected: Level,
    icons: &[Option<ImageAsset>; 3],
    highlight: Rgb,
    digit_color: Rgb,
) -> Result<Vec<LikertCell>> {
    let fonts = doc.fonts();
    let mut cells = Vec::with_capacity(3);

    for level in Level::ALL {
        let cell = Rect::new(
            x + level.index() as f32 * (BOX_SIZE + BOX_GAP),
            y,
            BOX_SIZE,
            BOX_SIZE,
        );

        match &icons[level.index()] {
            Some(icon) => {
                let inner = Rect::new(
                    cell.x + ICON_INSET,
                    cell.y + ICON_INSET,
                    cell.width - 2.0 * ICON_INSET,
                    cell.height - 2.0 * ICON_INSET,
                );
                doc.image(icon, fit_centered(inner, icon.width, icon.height))?;
                cells.push(LikertCell::Icon(icon.key.clone()));
            }
            None => {
                let digit = fallback_digit(level);
                let text = digit.to_string();
                let width = fonts.text_width(&text, FontStyle::Bold, DIGIT_SIZE);
                let style = TextStyle::new(FontStyle::Bold, DIGIT_SIZE, digit_color);
                doc.text(cell.x + (cell.width - width) / 2.0, cell.y, cell.height, &text, style);
                cells.push(LikertCell::Digit(digit));
            }
        }

        // outline last so it stays on top of the icon
        if level == selected {
            doc.set_stroke_color(highlight);
            doc.set_line_width(SELECTED_LINE_WIDTH);
        } else {
            doc.set_stroke_color(NEUTRAL_STROKE);
            doc.set_line_width(NEUTRAL_LINE_WIDTH);
        }
        doc.rounded_rect(cell, BOX_RADIUS, Corners::All, PaintStyle::Stroke);
    }

    Ok(cells)
}
