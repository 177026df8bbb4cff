//! Observation report layout
//!
//! Turns a list of observations into pages: a header on the first page, a
//! footer on every page and one framed block per observation. Pagination is
//! deliberately conservative: a new block starts on a fresh page once the
//! current page holds `max_blocks_per_page` blocks or too little room is left.

use anyhow::Result;
use chrono::NaiveDate;

use crate::assets::ReportAssets;
use crate::config::ReportOptions;
use crate::document::{DocumentContext, TextStyle, TOTAL_PAGES_ALIAS};
use crate::fonts::{FontContext, FontStyle};
use crate::geometry::{fit_centered, Corners, PaintStyle, Rect, Rgb};
use crate::likert::{self, LikertCell};
use crate::observation::{partition_comment, Level, Observation, ObservableRow};
use crate::typography::WrappedText;

const CORNER_RADIUS: f32 = 8.0;
const BANNER_PADDING: f32 = 8.0;
const BLOCK_PADDING: f32 = 10.0;
const BLOCK_GAP: f32 = 14.0;
const FRAME_LINE_WIDTH: f32 = 1.2;
const ROW_PADDING: f32 = 5.0;
const ROW_SPACING: f32 = 4.0;
const ROW_RADIUS: f32 = 4.0;
const SECTION_GAP: f32 = 4.0;
const BULLET_INDENT: f32 = 10.0;
const FIGURE_SIZE: f32 = 64.0;
const LOGO_WIDTH: f32 = 90.0;
const LOGO_HEIGHT: f32 = 56.0;
const DATE_BANNER_HEIGHT: f32 = 22.0;
const DATE_FONT_SIZE: f32 = 11.0;

/// Page-level state of a render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    /// Nothing laid out yet; the next page gets the header.
    FirstPage,
    SubsequentPage,
}

/// Rendered document plus a description of what went on each page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
}

impl RenderedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Blocks started on each page (continuations excluded).
    pub fn blocks_per_page(&self) -> Vec<usize> {
        self.pages
            .iter()
            .map(|p| p.blocks.iter().filter(|b| !b.continued).count())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageSummary {
    pub number: usize,
    pub has_header: bool,
    pub blocks: Vec<BlockSummary>,
    /// Footer page label after the total-pages alias was resolved.
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockSummary {
    pub title: String,
    /// The block started on an earlier page and continues here.
    pub continued: bool,
    pub rows: Vec<RowSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSummary {
    pub label: String,
    pub level: Level,
    pub subjects: Vec<String>,
    pub cells: Vec<LikertCell>,
}

/// Report renderer with fonts and assets resolved once.
///
/// Immutable after construction; every [`ReportRenderer::render`] call builds
/// its own document context, so one renderer can serve parallel callers.
pub struct ReportRenderer {
    options: ReportOptions,
    fonts: FontContext,
    assets: ReportAssets,
}

impl ReportRenderer {
    pub fn new(options: ReportOptions) -> Self {
        let fonts = FontContext::initialize(&options.fonts_dir(), options.use_system_fonts);
        let assets = ReportAssets::load(&options.images_dir());
        Self::with_resources(options, fonts, assets)
    }

    /// Build a renderer around already loaded fonts and assets.
    pub fn with_resources(
        options: ReportOptions,
        fonts: FontContext,
        assets: ReportAssets,
    ) -> Self {
        Self {
            options,
            fonts,
            assets,
        }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    pub fn render(
        &self,
        observations: &[Observation],
        report_date: NaiveDate,
    ) -> Result<RenderedReport> {
        log::info!(
            "Rendering report for {} with {} observation(s)",
            report_date,
            observations.len()
        );

        let mut session = LayoutSession::new(self, report_date);
        session.start_page()?;
        for observation in observations {
            session.prepare_block_page()?;
            session.draw_block(observation)?;
        }
        session.finish()
    }
}

/// Suggested download name for a report.
pub fn report_filename(report_date: NaiveDate) -> String {
    format!("rapport_seance_{}.pdf", report_date.format("%Y-%m-%d"))
}

/// State of one render call.
struct LayoutSession<'r> {
    renderer: &'r ReportRenderer,
    doc: DocumentContext<'r>,
    report_date: NaiveDate,
    state: PageState,
    blocks_on_page: usize,
    /// Top of the block frame segment on the current page.
    frame_top: f32,
    pages: Vec<PageSummary>,
}

impl<'r> LayoutSession<'r> {
    fn new(renderer: &'r ReportRenderer, report_date: NaiveDate) -> Self {
        let options = &renderer.options;
        Self {
            renderer,
            doc: DocumentContext::new(&renderer.fonts, options.page_width, options.page_height),
            report_date,
            state: PageState::FirstPage,
            blocks_on_page: 0,
            frame_top: options.margin,
            pages: Vec::new(),
        }
    }

    fn options(&self) -> &'r ReportOptions {
        &self.renderer.options
    }

    fn fonts(&self) -> &'r FontContext {
        &self.renderer.fonts
    }

    fn wrap(&self, text: &str, font: FontStyle, size: f32, width: f32) -> WrappedText {
        let fonts = self.fonts();
        let prepared = fonts.prepare(text, font);
        let measure = |s: &str| fonts.text_width(s, font, size);
        WrappedText::wrap(&prepared, width, self.options().line_height(size), &measure)
    }

    fn body_column(&self) -> (f32, f32) {
        let (x, width) = self.options().content_column();
        (x + BLOCK_PADDING, width - 2.0 * BLOCK_PADDING)
    }

    fn current_block(&mut self) -> Option<&mut BlockSummary> {
        self.pages.last_mut().and_then(|p| p.blocks.last_mut())
    }

    fn start_page(&mut self) -> Result<()> {
        let number = self.doc.add_page();
        let options = self.options();
        self.doc.set_cursor(options.margin, options.margin);
        self.blocks_on_page = 0;
        self.pages.push(PageSummary {
            number,
            ..PageSummary::default()
        });

        self.draw_footer(number);
        if self.state == PageState::FirstPage {
            self.draw_header()?;
            if let Some(page) = self.pages.last_mut() {
                page.has_header = true;
            }
            self.state = PageState::SubsequentPage;
        }
        log::debug!("Started page {}", number);
        Ok(())
    }

    /// Break the page before a block when the page is full.
    fn prepare_block_page(&mut self) -> Result<()> {
        let options = self.options();
        let remaining = options.content_bottom() - self.doc.cursor().y;
        if self.blocks_on_page >= options.max_blocks_per_page.max(1)
            || remaining < options.min_block_space
        {
            self.start_page()?;
        }
        Ok(())
    }

    /// Continue the current block on a new page when `height` does not fit.
    fn ensure_room(&mut self, height: f32) -> Result<()> {
        let y = self.doc.cursor().y;
        let bottom = self.options().content_bottom();
        // a segment that holds nothing yet cannot be split any further
        if y + height <= bottom || y <= self.frame_top + BLOCK_PADDING + 0.5 {
            return Ok(());
        }

        self.draw_frame(self.frame_top, y + BLOCK_PADDING / 2.0);
        let title = self.current_block().map(|b| b.title.clone()).unwrap_or_default();
        self.start_page()?;
        self.blocks_on_page = 1;
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(BlockSummary {
                title,
                continued: true,
                rows: Vec::new(),
            });
        }
        self.frame_top = self.doc.cursor().y;
        self.doc.advance(BLOCK_PADDING);
        Ok(())
    }

    fn draw_header(&mut self) -> Result<()> {
        let options = self.options();
        let assets = &self.renderer.assets;
        let fonts = self.fonts();
        let (x, width) = options.content_column();
        let mut y = options.margin;

        let mut images_height: f32 = 0.0;
        if let Some(figure) = &assets.left_figure {
            let frame = Rect::new(x, y, FIGURE_SIZE, FIGURE_SIZE);
            self.doc.image(figure, fit_centered(frame, figure.width, figure.height))?;
            images_height = images_height.max(FIGURE_SIZE);
        }
        if let Some(figure) = &assets.right_figure {
            let frame = Rect::new(x + width - FIGURE_SIZE, y, FIGURE_SIZE, FIGURE_SIZE);
            self.doc.image(figure, fit_centered(frame, figure.width, figure.height))?;
            images_height = images_height.max(FIGURE_SIZE);
        }
        if let Some(logo) = &assets.logo {
            let frame = Rect::new(x + (width - LOGO_WIDTH) / 2.0, y, LOGO_WIDTH, LOGO_HEIGHT);
            self.doc.image(logo, fit_centered(frame, logo.width, logo.height))?;
            images_height = images_height.max(LOGO_HEIGHT);
        }
        if images_height > 0.0 {
            y += images_height + 8.0;
        }

        let title_size = options.title_font_size;
        let title = self.wrap(&options.title, FontStyle::Bold, title_size, width);
        let title_style = TextStyle::new(FontStyle::Bold, title_size, options.text_color);
        for (index, line) in title.lines.iter().enumerate() {
            let line_width = fonts.text_width(line, FontStyle::Bold, title_size);
            let line_top = y + index as f32 * title.line_height;
            let line_x = x + (width - line_width) / 2.0;
            self.doc.text(line_x, line_top, title.line_height, line, title_style);
        }
        y += title.height() + 6.0;

        let date_text = fonts.prepare(
            &format!("Date : {}", self.report_date.format("%d/%m/%Y")),
            FontStyle::Bold,
        );
        let date_width = fonts.text_width(&date_text, FontStyle::Bold, DATE_FONT_SIZE);
        let banner_width = (date_width + 28.0).min(width);
        let banner_x = x + (width - banner_width) / 2.0;
        let banner = Rect::new(banner_x, y, banner_width, DATE_BANNER_HEIGHT);
        self.doc.set_fill_color(options.banner_color);
        self.doc.rounded_rect(banner, DATE_BANNER_HEIGHT / 2.0, Corners::All, PaintStyle::Fill);
        self.doc.text(
            x + (width - date_width) / 2.0,
            y,
            DATE_BANNER_HEIGHT,
            &date_text,
            TextStyle::new(FontStyle::Bold, DATE_FONT_SIZE, options.banner_text_color),
        );
        y += DATE_BANNER_HEIGHT + 16.0;

        self.doc.set_cursor(x, y);
        Ok(())
    }

    /// Institution text on the left, `page/total` on the right. The total is
    /// an alias resolved when the document is finished.
    fn draw_footer(&mut self, page_number: usize) {
        let options = self.options();
        let fonts = self.fonts();
        let (x, width) = options.content_column();
        let size = options.footer_font_size;
        let line_height = options.line_height(size);
        let baseline = options.page_height - options.footer_offset;
        let top = baseline - line_height / 2.0 - 0.3 * size;
        let style = TextStyle::new(FontStyle::Regular, size, options.muted_color);

        self.doc.set_stroke_color(Rgb(210, 210, 210));
        self.doc.set_line_width(0.5);
        self.doc.line(x, top - 4.0, x + width, top - 4.0);

        let institution = fonts.prepare(&options.institution, FontStyle::Regular);
        self.doc.text(x, top, line_height, &institution, style);

        let label = format!("{page_number}/{TOTAL_PAGES_ALIAS}");
        // the total is unknown yet; assume it has as many digits as this page
        let label_width =
            fonts.text_width(&format!("{page_number}/{page_number}"), FontStyle::Regular, size);
        self.doc.text(x + width - label_width, top, line_height, &label, style);
    }

    fn draw_frame(&mut self, top: f32, bottom: f32) {
        let options = self.options();
        let (x, width) = options.content_column();
        self.doc.set_stroke_color(options.frame_color);
        self.doc.set_line_width(FRAME_LINE_WIDTH);
        self.doc.rounded_rect(
            Rect::new(x, top, width, (bottom - top).max(0.0)),
            CORNER_RADIUS,
            Corners::All,
            PaintStyle::Stroke,
        );
    }

    fn draw_block(&mut self, observation: &Observation) -> Result<()> {
        let options = self.options();
        let (x, width) = options.content_column();
        let top = self.doc.cursor().y;

        self.blocks_on_page += 1;
        self.frame_top = top;
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(BlockSummary {
                title: observation.learning_title.clone(),
                ..BlockSummary::default()
            });
        }

        // banner
        let size = options.banner_font_size;
        let title_width = width - 2.0 * BANNER_PADDING;
        let mut title = self.wrap(&observation.learning_title, FontStyle::Bold, size, title_width);
        // the banner keeps room for one body line below it on this page
        let room = options.content_bottom()
            - top
            - 2.0 * BANNER_PADDING
            - SECTION_GAP
            - options.line_height(options.body_font_size)
            - BLOCK_PADDING;
        let max_lines = ((room / title.line_height).floor() as usize).max(1);
        if title.lines.len() > max_lines {
            log::warn!(
                "Title of {:?} cut to {} line(s) to fit the page",
                observation.learning_title,
                max_lines
            );
            self.truncate_lines(&mut title, max_lines, FontStyle::Bold, size, title_width);
        }
        let banner_height = title.height() + 2.0 * BANNER_PADDING;
        self.doc.set_fill_color(options.banner_color);
        self.doc.rounded_rect(
            Rect::new(x, top, width, banner_height),
            CORNER_RADIUS,
            Corners::Top,
            PaintStyle::Fill,
        );
        self.doc.text_lines(
            x + BANNER_PADDING,
            top + BANNER_PADDING,
            &title,
            TextStyle::new(FontStyle::Bold, size, options.banner_text_color),
        );
        self.doc.set_cursor(x, top + banner_height + SECTION_GAP + 2.0);

        // label lines
        self.label_line("Domaine", &observation.domain)?;
        self.label_line("Composante", &observation.component)?;
        self.label_line("Activités", &observation.activities.join(", "))?;
        self.label_line(
            "Compétences transversales mobilisées",
            &observation.transversal_skills_mobilized.join(", "),
        )?;
        self.label_line(
            "Processus cognitifs mobilisés",
            &observation.cognitive_processes_mobilized.join(", "),
        )?;

        // observables
        let rows = observation.observable_rows();
        if !rows.is_empty() {
            self.sub_heading("Observables")?;
            for row in &rows {
                self.observable_row(row)?;
            }
        }

        // comments
        let subjects: Vec<&str> = rows
            .iter()
            .flat_map(|row| row.subjects.iter().map(String::as_str))
            .collect();
        let comments = partition_comment(&observation.comment, &subjects);
        if !comments.class.is_empty() {
            self.label_line("Commentaire", &comments.class.join(" "))?;
        }
        if !comments.students.is_empty() {
            self.sub_heading("Commentaire (élèves)")?;
            for (student, fragments) in &comments.students {
                self.bullet(&format!("{} : {}", student, fragments.join(" ")))?;
            }
        }

        // highlights
        let skill = observation.highlighted_skill();
        let process = observation.highlighted_process();
        if skill.is_some() || process.is_some() {
            self.sub_heading("Points mis en avant")?;
            if let Some(skill) = skill {
                self.bullet(&format!("Compétence : {skill}"))?;
            }
            if let Some(process) = process {
                self.bullet(&format!("Processus : {process}"))?;
            }
        }

        let bottom = self.doc.cursor().y + BLOCK_PADDING / 2.0;
        self.draw_frame(self.frame_top, bottom);
        self.doc.set_cursor(x, bottom + BLOCK_GAP);
        Ok(())
    }

    /// Keep the first `max_lines` lines, ending the last one with an ellipsis
    /// that still fits `width`.
    fn truncate_lines(
        &self,
        text: &mut WrappedText,
        max_lines: usize,
        font: FontStyle,
        size: f32,
        width: f32,
    ) {
        let fonts = self.fonts();
        text.lines.truncate(max_lines);
        let ellipsis = fonts.prepare("\u{2026}", font);
        if let Some(last) = text.lines.last_mut() {
            while !last.is_empty()
                && fonts.text_width(&format!("{last}{ellipsis}"), font, size) > width
            {
                last.pop();
            }
            let kept = last.trim_end().len();
            last.truncate(kept);
            last.push_str(&ellipsis);
        }
    }

    /// `Label : value`, label in bold, value wrapped with a hanging indent.
    /// Nothing is drawn for an empty value.
    fn label_line(&mut self, label: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Ok(());
        }
        let options = self.options();
        let fonts = self.fonts();
        let size = options.body_font_size;
        let line_height = options.line_height(size);
        let (x, width) = self.body_column();

        let label_text = fonts.prepare(&format!("{label} : "), FontStyle::Bold);
        let label_width = fonts.text_width(&label_text, FontStyle::Bold, size);
        // very long labels push the value below them
        let (value_x, value_width, value_offset) = if width - label_width < width * 0.35 {
            (x, width, line_height)
        } else {
            (x + label_width, width - label_width, 0.0)
        };
        let value = self.wrap(value, FontStyle::Regular, size, value_width);
        let label_style = TextStyle::new(FontStyle::Bold, size, options.text_color);
        let value_style = TextStyle::new(FontStyle::Regular, size, options.text_color);

        // the label stays with the first value line; later lines may move to
        // the next page one at a time
        self.ensure_room(value_offset + line_height)?;
        let top = self.doc.cursor().y;
        self.doc.text(x, top, line_height, &label_text, label_style);
        self.doc.advance(value_offset);
        for (index, line) in value.lines.iter().enumerate() {
            if index > 0 {
                self.ensure_room(line_height)?;
            }
            let line_top = self.doc.cursor().y;
            self.doc.text(value_x, line_top, line_height, line, value_style);
            self.doc.advance(line_height);
        }
        Ok(())
    }

    fn sub_heading(&mut self, heading: &str) -> Result<()> {
        let options = self.options();
        let size = options.body_font_size + 1.0;
        let (x, width) = self.body_column();
        let text = self.wrap(heading, FontStyle::Bold, size, width);

        // keep the heading with at least one following line
        let following_line = options.line_height(options.body_font_size);
        self.ensure_room(SECTION_GAP + text.height() + following_line)?;
        self.doc.advance(SECTION_GAP);
        let top = self.doc.cursor().y;
        self.doc.text_lines(
            x,
            top,
            &text,
            TextStyle::new(FontStyle::Bold, size, options.banner_color),
        );
        self.doc.advance(text.height());
        Ok(())
    }

    fn bullet(&mut self, text: &str) -> Result<()> {
        let options = self.options();
        let fonts = self.fonts();
        let size = options.body_font_size;
        let (x, width) = self.body_column();
        let wrapped = self.wrap(text, FontStyle::Regular, size, width - BULLET_INDENT);
        let style = TextStyle::new(FontStyle::Regular, size, options.text_color);

        let marker = fonts.prepare("\u{2022}", FontStyle::Regular);
        for (index, line) in wrapped.lines.iter().enumerate() {
            self.ensure_room(wrapped.line_height)?;
            let top = self.doc.cursor().y;
            if index == 0 {
                self.doc.text(x + 2.0, top, wrapped.line_height, &marker, style);
            }
            self.doc.text(x + BULLET_INDENT, top, wrapped.line_height, line, style);
            self.doc.advance(wrapped.line_height);
        }
        Ok(())
    }

    /// One grouped rating: filled background, label and subjects on the left,
    /// Likert scale on the right, both centred vertically.
    fn observable_row(&mut self, row: &ObservableRow) -> Result<()> {
        let options = self.options();
        let (x, width) = self.body_column();
        let (widget_width, widget_height) = likert::widget_size();
        let column_width = (width - widget_width - 3.0 * ROW_PADDING).max(40.0);

        let label = self.wrap(&row.label, FontStyle::Regular, options.body_font_size, column_width);
        let subjects = self.wrap(
            &row.subjects_text(),
            FontStyle::Regular,
            options.subject_font_size,
            column_width,
        );
        let text_height = label.height() + subjects.height();
        let content_height = text_height.max(widget_height);
        let row_height = content_height + 2.0 * ROW_PADDING;

        self.ensure_room(row_height)?;
        let top = self.doc.cursor().y;

        self.doc.set_fill_color(options.row_background);
        self.doc.rounded_rect(
            Rect::new(x, top, width, row_height),
            ROW_RADIUS,
            Corners::All,
            PaintStyle::Fill,
        );

        let text_top = top + ROW_PADDING + (content_height - text_height) / 2.0;
        self.doc.text_lines(
            x + ROW_PADDING,
            text_top,
            &label,
            TextStyle::new(FontStyle::Regular, options.body_font_size, options.text_color),
        );
        self.doc.text_lines(
            x + ROW_PADDING,
            text_top + label.height(),
            &subjects,
            TextStyle::new(FontStyle::Regular, options.subject_font_size, options.muted_color),
        );

        let widget_x = x + width - ROW_PADDING - widget_width;
        let widget_y = top + ROW_PADDING + (content_height - widget_height) / 2.0;
        let cells = likert::draw_likert(
            &mut self.doc,
            widget_x,
            widget_y,
            row.level,
            &self.renderer.assets.likert_icons,
            options.highlight_color,
            options.text_color,
        )?;

        if let Some(block) = self.current_block() {
            block.rows.push(RowSummary {
                label: row.label.clone(),
                level: row.level,
                subjects: row.subjects.clone(),
                cells,
            });
        }
        self.doc.set_cursor(x, top + row_height + ROW_SPACING);
        Ok(())
    }

    fn finish(self) -> Result<RenderedReport> {
        let total = self.pages.len();
        let mut pages = self.pages;
        for page in &mut pages {
            page.footer = format!("{}/{}", page.number, total);
        }
        let bytes = self.doc.finish(&self.renderer.options.title)?;
        Ok(RenderedReport { bytes, pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_renderer(options: ReportOptions) -> ReportRenderer {
        ReportRenderer::with_resources(options, FontContext::builtin(), ReportAssets::default())
    }

    fn observation(title: &str) -> Observation {
        Observation {
            domain: "Corps et motricité".to_string(),
            component: "Motricité globale".to_string(),
            learning_title: title.to_string(),
            ..Observation::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn filename_uses_iso_date() {
        assert_eq!(report_filename(date()), "rapport_seance_2026-10-18.pdf");
    }

    #[test]
    fn one_block_per_page_by_default() {
        let renderer = offline_renderer(ReportOptions::default());
        let observations = vec![
            observation("Sauter sur un pied"),
            observation("Courir et s'arrêter"),
        ];
        let report = renderer.render(&observations, date()).unwrap();

        assert_eq!(report.page_count(), 2);
        assert_eq!(report.blocks_per_page(), vec![1, 1]);
        assert!(report.pages[0].has_header);
        assert!(!report.pages[1].has_header);
        assert_eq!(report.pages[1].footer, "2/2");
    }

    #[test]
    fn several_blocks_share_a_page_when_allowed() {
        let options = ReportOptions {
            max_blocks_per_page: 3,
            ..ReportOptions::default()
        };
        let renderer = offline_renderer(options);
        let observations: Vec<_> = (0..3).map(|i| observation(&format!("Critère {i}"))).collect();
        let report = renderer.render(&observations, date()).unwrap();
        assert_eq!(report.blocks_per_page(), vec![3]);
    }

    #[test]
    fn block_taller_than_the_page_continues_on_the_next() {
        let renderer = offline_renderer(ReportOptions::default());
        let mut long = observation("Suivre une consigne complexe");
        long.rated_observables = (0..40)
            .map(|i| format!("Élève {i}: 🌸 Épanoui(e) - Observable numéro {i}"))
            .collect();
        let report = renderer.render(&[long], date()).unwrap();

        assert!(report.page_count() >= 2);
        assert_eq!(report.blocks_per_page()[0], 1);
        assert!(report.pages[1].blocks[0].continued);
        let rows: usize = report
            .pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .map(|b| b.rows.len())
            .sum();
        assert_eq!(rows, 40);
    }

    #[test]
    fn no_observations_yields_a_header_only_page() {
        let renderer = offline_renderer(ReportOptions::default());
        let report = renderer.render(&[], date()).unwrap();
        assert_eq!(report.page_count(), 1);
        assert!(report.pages[0].blocks.is_empty());
        assert_eq!(report.pages[0].footer, "1/1");
    }

    #[test]
    fn renderer_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportRenderer>();
    }
}
