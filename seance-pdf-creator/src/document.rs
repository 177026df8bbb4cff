//! Per-render PDF document context
//!
//! Owns the lopdf object graph, the content of every page, the drawing cursor
//! and the resources used so far. A context is created for one render call and
//! consumed by [`DocumentContext::finish`]; nothing in it outlives the call.
//!
//! Drawing methods take top-down coordinates in points (origin at the top-left
//! corner of the page); the y axis is flipped when operators are emitted.

use anyhow::{anyhow, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

use crate::assets::ImageAsset;
use crate::fonts::{win_ansi_char, EmbeddedFont, FontContext, FontFace, FontStyle};
use crate::geometry::{rounded_rect_path, Corners, PaintStyle, PathSegment, Rect, Rgb};
use crate::typography::WrappedText;

/// Placeholder replaced by the page count when the document is finished.
pub const TOTAL_PAGES_ALIAS: &str = "{nb}";

/// Drawing cursor, top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

/// Font, size and colour of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontStyle,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(font: FontStyle, size: f32, color: Rgb) -> Self {
        Self { font, size, color }
    }
}

struct RegisteredImage {
    name: String,
    id: ObjectId,
}

pub struct DocumentContext<'a> {
    fonts: &'a FontContext,
    document: Document,
    pages_id: ObjectId,
    page_width: f32,
    page_height: f32,
    pages: Vec<Content>,
    cursor: Cursor,
    images: HashMap<String, RegisteredImage>,
    used_chars: BTreeMap<&'static str, BTreeSet<char>>,
}

impl<'a> DocumentContext<'a> {
    pub fn new(fonts: &'a FontContext, page_width: f32, page_height: f32) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        Self {
            fonts,
            document,
            pages_id,
            page_width,
            page_height,
            pages: Vec::new(),
            cursor: Cursor::default(),
            images: HashMap::new(),
            used_chars: BTreeMap::new(),
        }
    }

    pub fn fonts(&self) -> &'a FontContext {
        self.fonts
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    /// Start a new page and return its 1-based number.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Content { operations: Vec::new() });
        self.pages.len()
    }

    /// Number of the page being drawn, 0 before the first page.
    pub fn page_number(&self) -> usize {
        self.pages.len()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.cursor = Cursor { x, y };
    }

    /// Move the cursor down by `dy`.
    pub fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    fn pdf_y(&self, y: f32) -> f32 {
        self.page_height - y
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.operations.push(Operation::new(operator, operands));
        }
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        let [r, g, b] = color.components();
        self.push("rg", vec![r.into(), g.into(), b.into()]);
    }

    pub fn set_stroke_color(&mut self, color: Rgb) {
        let [r, g, b] = color.components();
        self.push("RG", vec![r.into(), g.into(), b.into()]);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.push("w", vec![width.into()]);
    }

    /// Emit a path built by the geometry module and paint it.
    pub fn draw_path(&mut self, path: &[PathSegment], style: PaintStyle) {
        for segment in path {
            match *segment {
                PathSegment::MoveTo(x, y) => {
                    let y = self.pdf_y(y);
                    self.push("m", vec![x.into(), y.into()]);
                }
                PathSegment::LineTo(x, y) => {
                    let y = self.pdf_y(y);
                    self.push("l", vec![x.into(), y.into()]);
                }
                PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    let (y1, y2, y3) = (self.pdf_y(y1), self.pdf_y(y2), self.pdf_y(y3));
                    self.push(
                        "c",
                        vec![x1.into(), y1.into(), x2.into(), y2.into(), x3.into(), y3.into()],
                    );
                }
                PathSegment::Close => self.push("h", vec![]),
            }
        }
        self.push(style.operator(), vec![]);
    }

    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, corners: Corners, style: PaintStyle) {
        let path = rounded_rect_path(rect, radius, corners);
        self.draw_path(&path, style);
    }

    pub fn rect(&mut self, rect: Rect, style: PaintStyle) {
        let y = self.pdf_y(rect.bottom());
        self.push(
            "re",
            vec![rect.x.into(), y.into(), rect.width.into(), rect.height.into()],
        );
        self.push(style.operator(), vec![]);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (y1, y2) = (self.pdf_y(y1), self.pdf_y(y2));
        self.push("m", vec![x1.into(), y1.into()]);
        self.push("l", vec![x2.into(), y2.into()]);
        self.push("S", vec![]);
    }

    /// Draw one line of prepared text inside a line box starting at `top`.
    pub fn text(&mut self, x: f32, top: f32, line_height: f32, text: &str, style: TextStyle) {
        if text.trim().is_empty() {
            return;
        }
        let fonts = self.fonts;
        let resource = fonts.resource_name(style.font);
        let face = fonts.face(style.font);

        let used = self.used_chars.entry(resource).or_default();
        used.extend(text.chars());
        if text.contains(TOTAL_PAGES_ALIAS) {
            used.extend('0'..='9');
        }

        let baseline = top + line_height / 2.0 + 0.3 * style.size;
        let pdf_y = self.pdf_y(baseline);
        let [r, g, b] = style.color.components();
        let operand = face.encode(text);

        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(resource.as_bytes().to_vec()), style.size.into()]);
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.push("Td", vec![x.into(), pdf_y.into()]);
        self.push("Tj", vec![operand]);
        self.push("ET", vec![]);
    }

    /// Draw every line of a wrapped block, one line height apart.
    pub fn text_lines(&mut self, x: f32, top: f32, wrapped: &WrappedText, style: TextStyle) {
        for (index, line) in wrapped.lines.iter().enumerate() {
            let line_top = top + index as f32 * wrapped.line_height;
            self.text(x, line_top, wrapped.line_height, line, style);
        }
    }

    /// Draw an image stretched to `frame`.
    pub fn image(&mut self, asset: &ImageAsset, frame: Rect) -> Result<()> {
        let name = self.register_image(asset)?;
        let y = self.pdf_y(frame.bottom());
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                frame.width.into(),
                0.into(),
                0.into(),
                frame.height.into(),
                frame.x.into(),
                y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(name.into_bytes())]);
        self.push("Q", vec![]);
        Ok(())
    }

    /// Write an image XObject once per asset key and return its resource name.
    fn register_image(&mut self, asset: &ImageAsset) -> Result<String> {
        if let Some(registered) = self.images.get(&asset.key) {
            return Ok(registered.name.clone());
        }

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(asset.width as i64),
            "Height" => Object::Integer(asset.height as i64),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        };

        if let Some(alpha) = &asset.alpha {
            let mask_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(asset.width as i64),
                "Height" => Object::Integer(asset.height as i64),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            };
            let mask_id = self.document.add_object(flate_stream(mask_dict, alpha)?);
            image_dict.set("SMask", Object::Reference(mask_id));
        }

        let id = self.document.add_object(flate_stream(image_dict, &asset.rgb)?);
        let name = format!("Im{}", self.images.len() + 1);
        log::debug!("Embedded image {} as /{}", asset.key, name);
        self.images.insert(
            asset.key.clone(),
            RegisteredImage {
                name: name.clone(),
                id,
            },
        );
        Ok(name)
    }

    /// Substitute the page-count alias, write fonts, resources and the page
    /// tree, and serialise the document.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            self.add_page();
        }
        let total = self.pages.len();
        self.substitute_total_pages(total);

        let font_dict = self.write_fonts()?;
        let mut xobjects = Dictionary::new();
        for registered in self.images.values() {
            xobjects.set(registered.name.as_str(), Object::Reference(registered.id));
        }
        let mut resources = dictionary! { "Font" => font_dict };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        let resources_id = self.document.add_object(resources);

        let mut kids = Vec::with_capacity(total);
        let pages = std::mem::take(&mut self.pages);
        for content in &pages {
            let content_id = self
                .document
                .add_object(flate_stream(Dictionary::new(), &content.encode()?)?);
            let page = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    self.page_width.into(),
                    self.page_height.into(),
                ],
                "Contents" => content_id,
                "Resources" => resources_id,
            };
            kids.push(Object::Reference(self.document.add_object(page)));
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(total as i64),
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let info_id = self.document.add_object(dictionary! {
            "Producer" => Object::string_literal("Seance PDF Creator"),
            "Title" => Object::String(utf16_text_string(title), StringFormat::Hexadecimal),
        });
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        log::info!("Rendered report: {} page(s), {} bytes", total, bytes.len());
        Ok(bytes)
    }

    fn substitute_total_pages(&mut self, total: usize) {
        let fonts = self.fonts;
        let replacement = total.to_string();

        for page in &mut self.pages {
            let mut face: &FontFace = fonts.face(FontStyle::Regular);
            for op in &mut page.operations {
                match op.operator.as_str() {
                    "Tf" => {
                        if let Some(Object::Name(name)) = op.operands.first() {
                            face = fonts.face_for_resource(&String::from_utf8_lossy(name));
                        }
                    }
                    "Tj" => {
                        if let Some(Object::String(bytes, _)) = op.operands.first_mut() {
                            let alias = string_bytes(face.encode(TOTAL_PAGES_ALIAS));
                            let value = string_bytes(face.encode(&replacement));
                            *bytes = replace_bytes(bytes, &alias, &value);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Font resource dictionary for every font resource in use.
    fn write_fonts(&mut self) -> Result<Dictionary> {
        let fonts = self.fonts;
        let mut font_dict = Dictionary::new();
        let mut resources = vec![(FontContext::REGULAR_RESOURCE, FontStyle::Regular)];
        if fonts.has_distinct_bold() {
            resources.push((FontContext::BOLD_RESOURCE, FontStyle::Bold));
        }

        for (resource, style) in resources {
            let font_id = match fonts.face(style) {
                FontFace::Builtin(builtin) => self.document.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => builtin.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                }),
                FontFace::Embedded(font) => {
                    let used = self.used_chars.get(resource).cloned().unwrap_or_default();
                    self.add_type0_font(font, &used)?
                }
            };
            font_dict.set(resource, Object::Reference(font_id));
        }
        Ok(font_dict)
    }

    /// Composite font: Type0 over a CIDFontType2 with the TrueType program
    /// embedded, CID = UTF-16 code unit.
    fn add_type0_font(&mut self, font: &EmbeddedFont, used: &BTreeSet<char>) -> Result<ObjectId> {
        let base_font = font.pdf_name();

        let mut font_file = dictionary! { "Length1" => Object::Integer(font.data.len() as i64) };
        font_file.set("Filter", "FlateDecode");
        let font_file_id = self
            .document
            .add_object(Stream::new(font_file, deflate(&font.data)?));

        let descriptor_id = self.document.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font.as_str(),
            "Flags" => Object::Integer(32),
            "FontBBox" => vec![(-200).into(), (-300).into(), 1200.into(), 1000.into()],
            "ItalicAngle" => Object::Integer(0),
            "Ascent" => Object::Integer(900),
            "Descent" => Object::Integer(-250),
            "CapHeight" => Object::Integer(700),
            "StemV" => Object::Integer(80),
            "FontFile2" => font_file_id,
        });

        let mut widths = Vec::with_capacity(used.len() * 2);
        for &ch in used {
            if (ch as u32) > 0xFFFF {
                continue;
            }
            widths.push(Object::Integer(ch as i64));
            widths.push(Object::Array(vec![font.glyph_width(ch).round().into()]));
        }

        let cid_to_gid_id = self
            .document
            .add_object(flate_stream(Dictionary::new(), &cid_to_gid_map(font))?);

        let cid_font_id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font.as_str(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => Object::Integer(0),
            },
            "FontDescriptor" => descriptor_id,
            "DW" => Object::Integer(1000),
            "W" => widths,
            "CIDToGIDMap" => cid_to_gid_id,
        });

        let to_unicode_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), IDENTITY_TO_UNICODE.to_vec()));

        Ok(self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font.as_str(),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        }))
    }
}

/// Full BMP CID -> glyph index map, two bytes per CID.
fn cid_to_gid_map(font: &EmbeddedFont) -> Vec<u8> {
    let mut map = vec![0u8; 65536 * 2];
    for cid in 0u32..=0xFFFF {
        if let Some(ch) = char::from_u32(cid) {
            let gid = font.font.lookup_glyph_index(ch);
            let offset = cid as usize * 2;
            map[offset..offset + 2].copy_from_slice(&gid.to_be_bytes());
        }
    }
    map
}

const IDENTITY_TO_UNICODE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0000> <FFFF> <0000>
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn flate_stream(mut dict: Dictionary, data: &[u8]) -> Result<Stream> {
    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, deflate(data)?))
}

fn string_bytes(object: Object) -> Vec<u8> {
    match object {
        Object::String(bytes, _) => bytes,
        _ => Vec::new(),
    }
}

fn replace_bytes(haystack: &[u8], needle: &[u8], value: &[u8]) -> Vec<u8> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(value);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// PDF text string in UTF-16BE with byte order mark.
fn utf16_text_string(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// Read back the text operands of every page, in order; used by tests and
/// diagnostics. Hex strings are the UTF-16 code units written for embedded
/// fonts, literal strings are WinAnsi bytes written for the core fonts.
pub fn page_texts(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let document = Document::load_mem(bytes)?;
    let mut pages = Vec::new();
    for (_, page_id) in document.get_pages() {
        let content = Content::decode(&document.get_page_content(page_id)?)
            .map_err(|e| anyhow!("cannot decode page content: {}", e))?;
        let texts = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, StringFormat::Hexadecimal)) => {
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                        .collect();
                    Some(String::from_utf16_lossy(&units))
                }
                Some(Object::String(bytes, _)) => {
                    Some(bytes.iter().copied().filter_map(win_ansi_char).collect())
                }
                _ => None,
            })
            .collect();
        pages.push(texts);
    }
    Ok(pages)
}
