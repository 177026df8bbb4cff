//! Font management for report text
//!
//! Loads an accent-capable TrueType family with fontdue when one is available
//! and falls back to the PDF core Helvetica fonts otherwise. Every piece of
//! text goes through [`FontFace::prepare`] before it is measured or drawn, so
//! characters the active font cannot show are replaced the same way on both
//! sides.

use anyhow::{anyhow, Result};
use fontdue::{Font, FontSettings};
use lopdf::{Object, StringFormat};
use std::path::{Path, PathBuf};

/// Weight used by a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// PDF core font used when no TrueType file could be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width in 1/1000 em for a WinAnsi-encodable character.
    fn char_width(self, ch: char) -> u16 {
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        let base = base_letter(ch);
        if (' '..='~').contains(&base) {
            return table[base as usize - 32];
        }
        match ch {
            '\u{2019}' | '\u{2018}' => 278,
            '\u{201C}' | '\u{201D}' => 500,
            '\u{2026}' | '\u{2014}' | '\u{2030}' => 1000,
            '\u{2013}' | '\u{20AC}' | '«' | '»' | '\u{2022}' => 556,
            'œ' | 'Œ' => 1000,
            'æ' => 889,
            'Æ' => 1000,
            '°' => 400,
            '\u{a0}' => 278,
            'ß' => 611,
            _ => 556,
        }
    }
}

/// A TrueType font loaded with fontdue, kept with its raw bytes for embedding.
#[derive(Clone)]
pub struct EmbeddedFont {
    pub font: Font,
    pub name: String,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl EmbeddedFont {
    fn load(name: &str, path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let font = Font::from_bytes(data.clone(), FontSettings::default())
            .map_err(|e| anyhow!("Failed to load font from {}: {}", path.display(), e))?;
        Ok(Self {
            font,
            name: name.to_string(),
            path: path.to_path_buf(),
            data,
        })
    }

    fn has_glyph(&self, ch: char) -> bool {
        (ch as u32) <= 0xFFFF && self.font.lookup_glyph_index(ch) != 0
    }

    /// Advance width in 1/1000 em, the unit of the PDF `/W` array.
    pub fn glyph_width(&self, ch: char) -> f32 {
        self.font.metrics(ch, 1000.0).advance_width
    }

    /// PostScript-safe name for `/BaseFont`.
    pub fn pdf_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                out.push(ch);
            } else if ch.is_whitespace() {
                out.push('-');
            }
        }
        if out.is_empty() {
            "ReportFont".to_string()
        } else {
            out
        }
    }
}

/// One usable face: either embedded TrueType or a core font.
#[derive(Clone)]
pub enum FontFace {
    Embedded(EmbeddedFont),
    Builtin(BuiltinFont),
}

impl FontFace {
    pub fn is_embedded(&self) -> bool {
        matches!(self, FontFace::Embedded(_))
    }

    fn supports(&self, ch: char) -> bool {
        match self {
            FontFace::Embedded(font) => font.has_glyph(ch),
            FontFace::Builtin(_) => win_ansi_code(ch).is_some(),
        }
    }

    /// Replace or drop characters this face cannot show.
    pub fn prepare(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch == '\t' {
                out.push(' ');
            } else if ch == '\n' || self.supports(ch) {
                out.push(ch);
            } else if let Some(replacement) = substitute(ch) {
                for r in replacement.chars() {
                    if self.supports(r) {
                        out.push(r);
                    }
                }
            }
            // anything else (emoji, variation selectors) is dropped
        }
        out
    }

    /// Width in points of prepared text at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self {
            FontFace::Embedded(font) => text.chars().map(|ch| font.glyph_width(ch)).sum(),
            FontFace::Builtin(builtin) => {
                text.chars().map(|ch| builtin.char_width(ch) as f32).sum()
            }
        };
        units * size / 1000.0
    }

    /// Encode prepared text as a `Tj` string operand.
    pub fn encode(&self, text: &str) -> Object {
        match self {
            FontFace::Embedded(_) => {
                // CID == UTF-16 code unit, matching the CIDToGIDMap written for the font
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            FontFace::Builtin(_) => {
                let bytes = text.chars().filter_map(win_ansi_code).collect();
                Object::String(bytes, StringFormat::Literal)
            }
        }
    }
}

/// Fonts for one renderer: a regular face and an optional distinct bold face.
#[derive(Clone)]
pub struct FontContext {
    regular: FontFace,
    bold: FontFace,
}

impl FontContext {
    pub const REGULAR_RESOURCE: &'static str = "F1";
    pub const BOLD_RESOURCE: &'static str = "F2";

    /// Try TrueType candidates from `fonts_dir` (and system locations when
    /// allowed), falling back to Helvetica. Never fails.
    pub fn initialize(fonts_dir: &Path, use_system_fonts: bool) -> Self {
        let regular =
            Self::load_first(&font_candidates(fonts_dir, FontStyle::Regular, use_system_fonts));
        let bold = Self::load_first(&font_candidates(fonts_dir, FontStyle::Bold, use_system_fonts));

        match (regular, bold) {
            (Some(regular), bold) => {
                log::info!(
                    "Loaded report fonts: regular={}, bold={}",
                    regular.name,
                    bold.as_ref().map(|b| b.name.as_str()).unwrap_or("(regular)")
                );
                let regular = FontFace::Embedded(regular);
                let bold = bold.map(FontFace::Embedded).unwrap_or_else(|| regular.clone());
                Self { regular, bold }
            }
            (None, _) => {
                log::warn!(
                    "No TrueType font found under {}; using Helvetica, accented text outside WinAnsi will be simplified",
                    fonts_dir.display()
                );
                Self::builtin()
            }
        }
    }

    /// Core fonts only.
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::Builtin(BuiltinFont::Helvetica),
            bold: FontFace::Builtin(BuiltinFont::HelveticaBold),
        }
    }

    fn load_first(candidates: &[(String, PathBuf)]) -> Option<EmbeddedFont> {
        for (name, path) in candidates {
            if !path.exists() {
                continue;
            }
            match EmbeddedFont::load(name, path) {
                Ok(font) => {
                    log::debug!("Loading font {} from {}", name, path.display());
                    return Some(font);
                }
                Err(e) => log::warn!("Skipping font {}: {}", path.display(), e),
            }
        }
        None
    }

    pub fn face(&self, style: FontStyle) -> &FontFace {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }

    /// True when the bold weight has its own font object.
    pub fn has_distinct_bold(&self) -> bool {
        match (&self.regular, &self.bold) {
            (FontFace::Embedded(r), FontFace::Embedded(b)) => r.path != b.path,
            _ => true,
        }
    }

    /// Resource name used in content streams for `style`.
    pub fn resource_name(&self, style: FontStyle) -> &'static str {
        match style {
            FontStyle::Bold if self.has_distinct_bold() => Self::BOLD_RESOURCE,
            _ => Self::REGULAR_RESOURCE,
        }
    }

    /// Face behind a resource name written by [`FontContext::resource_name`].
    pub fn face_for_resource(&self, resource: &str) -> &FontFace {
        if resource == Self::BOLD_RESOURCE {
            &self.bold
        } else {
            &self.regular
        }
    }

    pub fn prepare(&self, text: &str, style: FontStyle) -> String {
        self.face(style).prepare(text)
    }

    /// Width in points of prepared text.
    pub fn text_width(&self, text: &str, style: FontStyle, size: f32) -> f32 {
        self.face(style).text_width(text, size)
    }

    pub fn uses_builtin_fallback(&self) -> bool {
        !self.regular.is_embedded()
    }
}

fn font_candidates(
    fonts_dir: &Path,
    style: FontStyle,
    use_system_fonts: bool,
) -> Vec<(String, PathBuf)> {
    let (bundled, system): (&[(&str, &str)], &[(&str, &str)]) = match style {
        FontStyle::Regular => (
            &[
                ("DejaVu Sans", "DejaVuSans.ttf"),
                ("Liberation Sans", "LiberationSans-Regular.ttf"),
                ("Arial", "arial.ttf"),
            ],
            &[
                ("DejaVu Sans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
                ("Liberation Sans", "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf"),
                ("Liberation Sans", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
                ("Arial", "C:\\Windows\\Fonts\\arial.ttf"),
                ("Arial", "/Library/Fonts/Arial.ttf"),
            ],
        ),
        FontStyle::Bold => (
            &[
                ("DejaVu Sans Bold", "DejaVuSans-Bold.ttf"),
                ("Liberation Sans Bold", "LiberationSans-Bold.ttf"),
                ("Arial Bold", "arialbd.ttf"),
            ],
            &[
                ("DejaVu Sans Bold", "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                ("Liberation Sans Bold", "/usr/share/fonts/truetype/liberation2/LiberationSans-Bold.ttf"),
                ("Liberation Sans Bold", "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
                ("Arial Bold", "C:\\Windows\\Fonts\\arialbd.ttf"),
                ("Arial Bold", "/Library/Fonts/Arial Bold.ttf"),
            ],
        ),
    };

    let mut candidates: Vec<(String, PathBuf)> = bundled
        .iter()
        .map(|(name, file)| (name.to_string(), fonts_dir.join(file)))
        .collect();
    if use_system_fonts {
        candidates.extend(
            system
                .iter()
                .map(|(name, path)| (name.to_string(), PathBuf::from(path))),
        );
    }
    candidates
}

/// Plain-text stand-ins for characters a font may lack.
fn substitute(ch: char) -> Option<&'static str> {
    Some(match ch {
        '≥' => ">=",
        '≤' => "<=",
        '\u{2019}' | '\u{2018}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '«' | '»' => "\"",
        '\u{2026}' => "...",
        '\u{2013}' | '\u{2014}' | '\u{2212}' => "-",
        '\u{2022}' => "-",
        '\u{a0}' | '\u{202f}' | '\u{2009}' => " ",
        'œ' => "oe",
        'Œ' => "OE",
        _ => return None,
    })
}

/// WinAnsiEncoding positions outside the Latin-1 ranges.
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// WinAnsiEncoding byte for `ch`, if the encoding has one.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => WIN_ANSI_EXTRAS.iter().find(|(c, _)| *c == ch).map(|&(_, byte)| byte),
    }
}

/// Character behind a WinAnsiEncoding byte.
pub fn win_ansi_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        _ => WIN_ANSI_EXTRAS.iter().find(|&&(_, b)| b == byte).map(|&(ch, _)| ch),
    }
}

/// Unaccented letter with the same Helvetica advance as `ch`.
fn base_letter(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'Š' => 'S',
        'š' => 's',
        'Ž' => 'Z',
        'ž' => 'z',
        _ => ch,
    }
}

/// Helvetica advance widths for ' '..='~' (WinAnsi), 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold advance widths for ' '..='~' (WinAnsi), 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];
