//! # Page Layout
//!
//! Flows a note's sections onto fixed-size pages in the two-column Cornell
//! grid: section headings in the narrow left column, rendered content in the
//! wide right column.
//!
//! Layout is page-native. Every block renderer knows the page bottom and
//! breaks inside itself (a table repeats its header, a code box closes and
//! reopens), so nothing is laid out on an infinite canvas and sliced later.
//!
//! For each section the flow controller:
//!
//! 1. estimates its height and starts a new page when it will not fit,
//!    unless the cursor is already near the top;
//! 2. paints the heading in the left column;
//! 3. paints the text blocks, then the images, in the right column;
//! 4. records where the section started and ended, and every page after the
//!    first as a continuation of it.
//!
//! After all sections, one decorative pass draws the column divider on
//! every page a section touched and a rule under each section but the
//! last; another re-stamps the section heading at the top of each
//! continuation page. A "Related Notes" list closes the document when the
//! note links to others.

pub mod blocks;
pub mod context;
pub mod estimate;
pub mod image;

pub use context::{DrawCommand, LayoutElement, LayoutPage, RenderContext};

use crate::config::ExportOptions;
use crate::font::{FontContext, FontVariant};
use crate::markdown::{parse_sections, strip_images};
use crate::model::{
    Color, ContinuationPages, FontRole, FontSettings, Note, PageGeometry, Section, SectionBoundary, StyledSpan,
};
use crate::text::{wrap_spans, TextKind, TextStyle};

use self::blocks::{draw_line, render_content, LINE_HEIGHT};
use self::estimate::estimate_section_height;
use self::image::render_images;

const TITLE_FONT_SIZE: f64 = 24.0;
const TITLE_BASELINE: f64 = 20.0;
const SUMMARY_TOP: f64 = 30.0;
const SUMMARY_WIDTH: f64 = 180.0;
const NO_SUMMARY_Y: f64 = 35.0;
/// Gap left below the top margin when a section opens a new page.
const SECTION_TOP_GAP: f64 = 8.0;
const RELATED_NOTES_HEADING: &str = "Related Notes";

/// A fully laid-out note.
#[derive(Debug, Clone)]
pub struct NoteLayout {
    pub pages: Vec<LayoutPage>,
    pub sections: Vec<Section>,
    pub boundaries: Vec<SectionBoundary>,
    pub continuation_pages: ContinuationPages,
}

impl NoteLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lays notes out with one set of fonts and one page geometry.
pub struct LayoutEngine<'a> {
    fonts: &'a FontContext,
    settings: FontSettings,
    geometry: PageGeometry,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontContext, settings: FontSettings, geometry: PageGeometry) -> Self {
        Self {
            fonts,
            settings,
            geometry,
        }
    }

    /// Lay out `note` (its markdown already pre-processed) and append the
    /// `related` note titles.
    pub fn layout(&self, note: &Note, related: &[String]) -> NoteLayout {
        let mut ctx = RenderContext::new(self.fonts, &self.settings, self.geometry);

        self.render_header(&mut ctx, &note.title, &note.summary);

        let sections = parse_sections(&note.markdown);
        let mut boundaries = Vec::new();
        let mut continuation_pages = ContinuationPages::new();

        for (index, section) in sections.iter().enumerate() {
            if section.content.trim().is_empty() {
                log::debug!("section '{}' has no content, skipping", section.heading);
                continue;
            }
            let boundary = self.render_section(&mut ctx, index, section);
            for page in boundary.start_page + 1..=boundary.end_page {
                continuation_pages.insert(page, index);
            }
            ctx.y = boundary.end_y + 0.5;
            boundaries.push(boundary);
        }

        let cursor = ctx.y;
        self.draw_dividers(&mut ctx, &boundaries);
        self.restamp_continuations(&mut ctx, &sections, &continuation_pages);

        let last_page = ctx.page_count() - 1;
        ctx.set_page(last_page);
        ctx.y = cursor;
        if !related.is_empty() {
            self.render_related_notes(&mut ctx, related);
        }

        NoteLayout {
            pages: ctx.into_pages(),
            sections,
            boundaries,
            continuation_pages,
        }
    }

    fn select(&self, role: FontRole, variant: FontVariant) -> crate::font::StandardFont {
        self.fonts.select(self.settings.family_for(role), variant)
    }

    /// Title, optional summary and the rule under them.
    fn render_header(&self, ctx: &mut RenderContext, title: &str, summary: &str) {
        let margin = self.geometry.margin;

        ctx.set_font(self.select(FontRole::Title, FontVariant::Bold), TITLE_FONT_SIZE);
        ctx.text(title, margin, TITLE_BASELINE);

        let mut y = SUMMARY_TOP;
        if summary.is_empty() {
            y = NO_SUMMARY_Y;
        } else {
            let style = TextStyle::body(&self.settings);
            let lines = wrap_spans(&[StyledSpan::plain(summary)], SUMMARY_WIDTH, self.fonts, &style);
            for (i, line) in lines.iter().enumerate() {
                draw_line(ctx, line, margin, y + i as f64 * LINE_HEIGHT + 2.0, &style);
            }
            y += lines.len() as f64 * LINE_HEIGHT + 6.0;
        }

        ctx.set_draw_color(Color::gray(230));
        ctx.line(margin, y + 2.0, self.geometry.right_edge(), y + 2.0);
        ctx.y = y + 8.0;
    }

    fn heading_style(&self) -> TextStyle {
        TextStyle::new(
            self.settings.family_for(FontRole::Title),
            self.settings.body_font_size,
            TextKind::Heading,
            &self.settings,
        )
    }

    /// Paint a section heading in the left column with its top at `top`.
    /// Returns the number of lines it took.
    fn draw_section_heading(&self, ctx: &mut RenderContext, heading: &str, top: f64) -> usize {
        let style = self.heading_style();
        let width = self.geometry.key_points_width - 10.0;
        let lines = wrap_spans(&[StyledSpan::plain(heading)], width, self.fonts, &style);
        let x = self.geometry.margin + 5.0;
        for (i, line) in lines.iter().enumerate() {
            draw_line(ctx, line, x, top + 5.0 + i as f64 * LINE_HEIGHT + 2.0, &style);
        }
        lines.len()
    }

    fn render_section(&self, ctx: &mut RenderContext, index: usize, section: &Section) -> SectionBoundary {
        let margin = self.geometry.margin;
        let estimate = estimate_section_height(section);
        let available = ctx.remaining();
        if !ctx.is_near_top() && estimate > available {
            log::debug!(
                "section '{}' estimated at {:.1}mm, {:.1}mm available: starting a new page",
                section.heading,
                estimate,
                available
            );
            ctx.add_page();
            ctx.y = margin + SECTION_TOP_GAP;
        }

        let start_y = ctx.y;
        let start_page = ctx.current_page();

        let heading_lines = self.draw_section_heading(ctx, &section.heading, start_y);
        let heading_end = start_y + heading_lines as f64 * LINE_HEIGHT + 5.0;

        ctx.y = start_y + 5.0;
        let x = self.geometry.content_x();
        let width = self.geometry.text_width();
        render_content(ctx, &strip_images(&section.content), x, width);
        if ctx.current_page() == start_page {
            ctx.y = ctx.y.max(heading_end);
        }

        ctx.y += 3.0;
        render_images(ctx, &section.content, x, width);

        SectionBoundary {
            index,
            start_y,
            start_page,
            end_y: ctx.y,
            end_page: ctx.current_page(),
        }
    }

    /// Column dividers on every page a section touched, and a rule under
    /// every section but the last.
    fn draw_dividers(&self, ctx: &mut RenderContext, boundaries: &[SectionBoundary]) {
        let g = self.geometry;
        let divider_x = g.divider_x();

        for b in boundaries {
            for page in b.start_page..=b.end_page {
                ctx.set_page(page);
                ctx.set_draw_color(Color::gray(240));
                ctx.set_line_width(0.2);
                let top = if page == b.start_page { b.start_y } else { g.margin };
                let bottom = if page == b.end_page { b.end_y } else { g.bottom() };
                ctx.line(divider_x, top, divider_x, bottom);
            }
        }

        if let Some((_, rest)) = boundaries.split_last() {
            for b in rest {
                ctx.set_page(b.end_page);
                ctx.set_draw_color(Color::gray(240));
                ctx.line(g.margin, b.end_y, g.right_edge(), b.end_y);
            }
        }
    }

    fn restamp_continuations(&self, ctx: &mut RenderContext, sections: &[Section], pages: &ContinuationPages) {
        for (&page, &index) in pages {
            let Some(section) = sections.get(index) else {
                continue;
            };
            ctx.set_page(page);
            self.draw_section_heading(ctx, &section.heading, self.geometry.margin);
        }
    }

    fn render_related_notes(&self, ctx: &mut RenderContext, related: &[String]) {
        let margin = self.geometry.margin;
        ctx.y += 20.0;
        let estimate = 20.0 + related.len() as f64 * LINE_HEIGHT;
        if !ctx.fits(estimate) {
            ctx.add_page();
            ctx.y = margin + 10.0;
        }

        ctx.set_font(
            self.select(FontRole::Title, FontVariant::Bold),
            self.settings.title_font_size,
        );
        ctx.set_text_color(Color::BLACK);
        let heading_y = ctx.y;
        ctx.text(RELATED_NOTES_HEADING, margin, heading_y);
        ctx.y += 10.0;

        let body = self.select(FontRole::Body, FontVariant::Normal);
        ctx.set_font(body, self.settings.body_font_size);
        for title in related {
            if ctx.ensure_room(LINE_HEIGHT) {
                ctx.set_font(body, self.settings.body_font_size);
            }
            let y = ctx.y;
            ctx.text(&format!("\u{2022} {}", title), margin + 5.0, y);
            ctx.y += LINE_HEIGHT;
        }
    }
}

/// Lay out `note` with the fonts and page geometry from `options`.
pub fn layout_note(note: &Note, options: &ExportOptions, related: &[String]) -> NoteLayout {
    let fonts = FontContext::new();
    let settings = FontSettings::for_preference(options.font);
    LayoutEngine::new(&fonts, settings, options.page).layout(note, related)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(markdown: &str) -> NoteLayout {
        layout_note(&Note::new("Title", "", markdown), &ExportOptions::default(), &[])
    }

    #[test]
    fn single_short_section() {
        let result = layout("# Heading\nSome *italic* and **bold** text.");
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.page_count(), 1);
        assert!(result.continuation_pages.is_empty());
        let b = result.boundaries[0];
        assert_eq!((b.start_y, b.start_page, b.end_page), (43.0, 0, 0));
    }

    #[test]
    fn header_positions() {
        let result = layout_note(
            &Note::new("Title", "A short summary.", "# H\nbody"),
            &ExportOptions::default(),
            &[],
        );
        let first = &result.pages[0].elements[0];
        assert_eq!((first.x, first.y), (15.0, 20.0));
        // one summary line: 30 + 6 + 6 = 42, content from 50
        assert_eq!(result.boundaries[0].start_y, 50.0);
    }

    #[test]
    fn empty_sections_are_skipped() {
        let result = layout("# Empty\n\n# Full\ntext");
        assert_eq!(result.sections.len(), 2);
        assert_eq!(result.boundaries.len(), 1);
        assert_eq!(result.boundaries[0].index, 1);
    }

    #[test]
    fn section_that_does_not_fit_starts_a_new_page() {
        let filler: String = (0..20).map(|i| format!("line {}\n", i)).collect();
        let markdown = format!("# First\n{}# Second\n{}", filler, filler);
        let result = layout(&markdown);
        let second = result.boundaries[1];
        assert_eq!(second.start_page, 1);
        assert_eq!(second.start_y, 23.0);
        assert!(result.continuation_pages.is_empty());
    }

    #[test]
    fn tall_section_near_the_top_does_not_break_first() {
        let mut options = ExportOptions::default();
        options.page.margin = 25.0;
        let filler: String = (0..80).map(|i| format!("line {}\n", i)).collect();
        let result = layout_note(&Note::new("Title", "", &format!("# Tall\n{}", filler)), &options, &[]);
        let b = result.boundaries[0];
        // 43 is within 20mm of the 25mm margin
        assert_eq!((b.start_page, b.start_y), (0, 43.0));
        assert!(b.spans_pages());
        assert!(result.pages[0].texts().any(|t| t == "Tall"));
    }

    #[test]
    fn long_section_marks_continuation_pages_and_restamps_heading() {
        let filler: String = (0..80).map(|i| format!("paragraph {}\n", i)).collect();
        let result = layout(&format!("# Long\n{}", filler));
        let b = result.boundaries[0];
        assert!(b.spans_pages());
        assert!(!result.continuation_pages.contains_key(&b.start_page));
        for page in b.start_page..=b.end_page {
            if page > b.start_page {
                assert_eq!(result.continuation_pages.get(&page), Some(&0));
            }
            let stamped = result.pages[page].texts().filter(|t| *t == "Long").count();
            assert_eq!(stamped, 1, "heading on page {}", page);
        }
    }

    #[test]
    fn related_notes_close_the_document() {
        let related = vec!["Alpha".to_string(), "Beta".to_string()];
        let result = layout_note(&Note::new("T", "", "# A\ntext"), &ExportOptions::default(), &related);
        let texts: Vec<_> = result.pages.last().unwrap().texts().collect();
        let n = texts.len();
        assert_eq!(&texts[n - 3..], &["Related Notes", "\u{2022} Alpha", "\u{2022} Beta"]);
    }

    #[test]
    fn dividers_and_rules() {
        let result = layout("# A\none\n# B\ntwo");
        let lines = result.pages[0]
            .elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Line { .. }))
            .count();
        // header rule, two dividers, one rule between the sections
        assert_eq!(lines, 4);
    }
}
