//! Pipe tables.
//!
//! Columns share the width equally. Every cell is wrapped independently and
//! a row is as tall as its tallest cell. When a row does not fit, the table
//! continues on a new page with the header row repeated above it.

use crate::layout::blocks::text::{draw_line, LINE_HEIGHT};
use crate::layout::context::RenderContext;
use crate::markdown::parse_inline;
use crate::model::{Color, ColumnAlign, Line, StyledSpan, Table};
use crate::text::{span_font, wrap_spans, TextKind, TextStyle};

const CELL_PADDING: f64 = 3.0;
const MIN_ROW_HEIGHT: f64 = 8.0;
const TABLE_FAMILY: &str = "helvetica";

/// Column geometry and styles shared by every row of one table.
struct TableFrame<'t> {
    table: &'t Table,
    x: f64,
    total_width: f64,
    column_width: f64,
    header_style: TextStyle,
    cell_style: TextStyle,
}

impl TableFrame<'_> {
    fn wrap_row(&self, ctx: &RenderContext, cells: &[String], style: &TextStyle) -> Vec<Vec<Line>> {
        (0..self.table.column_count())
            .map(|col| {
                let text = cells.get(col).map(|c| c.trim()).unwrap_or("");
                wrap_spans(
                    &parse_inline(text),
                    self.column_width - CELL_PADDING * 2.0,
                    ctx.fonts,
                    style,
                )
            })
            .collect()
    }

    fn row_height(cells: &[Vec<Line>]) -> f64 {
        cells
            .iter()
            .map(|lines| (lines.len() as f64 * LINE_HEIGHT + CELL_PADDING).max(MIN_ROW_HEIGHT))
            .fold(MIN_ROW_HEIGHT, f64::max)
    }

    fn line_x(&self, column: usize, width: f64) -> f64 {
        let cell_x = self.x + column as f64 * self.column_width;
        match self.table.alignment(column) {
            ColumnAlign::Left => cell_x + CELL_PADDING,
            ColumnAlign::Center => cell_x + (self.column_width - width) / 2.0,
            ColumnAlign::Right => cell_x + self.column_width - CELL_PADDING - width,
        }
    }

    /// Paint a wrapped row with its top at the cursor. Lines hang from the
    /// top padding rather than sitting on a baseline.
    fn draw_row(&self, ctx: &mut RenderContext, cells: &[Vec<Line>], style: &TextStyle) {
        let (font, size) = span_font(ctx.fonts, style, &StyledSpan::plain(""));
        let ascent = ctx.fonts.ascent(font, size);
        let top = ctx.y + CELL_PADDING;
        for (column, lines) in cells.iter().enumerate() {
            for (i, line) in lines.iter().enumerate() {
                let x = self.line_x(column, line.width);
                draw_line(ctx, line, x, top + i as f64 * LINE_HEIGHT + ascent, style);
            }
        }
    }

    fn draw_header(&self, ctx: &mut RenderContext) {
        let header = self.wrap_row(ctx, &self.table.header, &self.header_style);
        self.draw_row(ctx, &header, &self.header_style);
        ctx.y += Self::row_height(&header);

        ctx.set_draw_color(Color::gray(200));
        ctx.set_line_width(0.2);
        ctx.line(self.x, ctx.y, self.x + self.total_width, ctx.y);
    }
}

/// Paint `table` at the cursor, leaving the cursor 4 mm below it.
pub fn render_table(ctx: &mut RenderContext, table: &Table, x: f64, max_width: f64) {
    if table.column_count() == 0 {
        return;
    }

    let size = ctx.settings.body_font_size - 1.0;
    let total_width = max_width - 10.0;
    let frame = TableFrame {
        table,
        x,
        total_width,
        column_width: total_width / table.column_count() as f64,
        header_style: TextStyle::new(TABLE_FAMILY, size, TextKind::Heading, ctx.settings),
        cell_style: TextStyle::new(TABLE_FAMILY, size, TextKind::Body, ctx.settings),
    };

    // header plus one row
    ctx.ensure_room(MIN_ROW_HEIGHT * 2.0);
    frame.draw_header(ctx);

    let last = table.rows.len().saturating_sub(1);
    for (index, row) in table.rows.iter().enumerate() {
        let cells = frame.wrap_row(ctx, row, &frame.cell_style);
        let height = TableFrame::row_height(&cells);

        if ctx.ensure_room(height) {
            log::debug!("table continues on page {}, repeating header", ctx.page_count());
            frame.draw_header(ctx);
        }

        frame.draw_row(ctx, &cells, &frame.cell_style);
        ctx.y += height;

        if index < last {
            ctx.set_draw_color(Color::gray(220));
            ctx.set_line_width(0.1);
            ctx.line(x, ctx.y, x + total_width, ctx.y);
            ctx.set_line_width(0.2);
        }
    }

    ctx.y += 4.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::layout::context::DrawCommand;
    use crate::model::{FontSettings, PageGeometry};

    fn table(rows: usize) -> Table {
        Table {
            header: vec!["Name".into(), "Qty".into(), "Price".into()],
            alignments: vec![ColumnAlign::Left, ColumnAlign::Center, ColumnAlign::Right],
            rows: (0..rows)
                .map(|i| vec![format!("item {}", i), "1".into(), "9.99".into()])
                .collect(),
        }
    }

    fn line_count(page: &crate::layout::context::LayoutPage) -> usize {
        page.elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Line { .. }))
            .count()
    }

    #[test]
    fn single_page_table() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 50.0;
        render_table(&mut ctx, &table(3), 65.0, 125.0);
        // header + 3 rows at 9 mm (6 + 3 padding), then 4
        assert_eq!(ctx.y, 50.0 + 4.0 * 9.0 + 4.0);
        let pages = ctx.into_pages();
        // header rule plus a rule between each pair of rows
        assert_eq!(line_count(&pages[0]), 3);
    }

    #[test]
    fn alignment_offsets() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        render_table(&mut ctx, &table(1), 65.0, 125.0);
        let pages = ctx.into_pages();
        let find = |needle: &str| {
            pages[0]
                .elements
                .iter()
                .find(|e| matches!(&e.draw, DrawCommand::Text { text, .. } if text == needle))
                .map(|e| (e.x, e.width))
                .unwrap()
        };
        let column_width = 115.0 / 3.0;
        let (name_x, _) = find("item 0");
        assert!((name_x - (65.0 + CELL_PADDING)).abs() < 1e-9);
        let (qty_x, qty_w) = find("1");
        assert!((qty_x + qty_w / 2.0 - (65.0 + column_width * 1.5)).abs() < 1e-9);
        let (price_x, price_w) = find("9.99");
        assert!((price_x + price_w - (65.0 + column_width * 3.0 - CELL_PADDING)).abs() < 1e-9);
    }

    #[test]
    fn header_repeats_after_page_break() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 200.0;
        render_table(&mut ctx, &table(20), 65.0, 125.0);
        let pages = ctx.into_pages();
        assert_eq!(pages.len(), 2);
        for page in &pages {
            let headers = page.texts().filter(|t| *t == "Name").count();
            assert_eq!(headers, 1);
        }
        let rows: usize = pages
            .iter()
            .map(|p| p.texts().filter(|t| t.starts_with("item ")).count())
            .sum();
        assert_eq!(rows, 20);
    }

    #[test]
    fn wrapped_header_sets_row_height_on_every_page() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let geometry = PageGeometry::default();
        let long = "A very long header cell that certainly wraps across several lines";
        let mut wide = table(20);
        wide.header[0] = long.to_string();

        let style = TextStyle::new(TABLE_FAMILY, settings.body_font_size - 1.0, TextKind::Heading, &settings);
        let inner = 115.0 / 3.0 - CELL_PADDING * 2.0;
        let lines = wrap_spans(&parse_inline(long), inner, &fonts, &style).len();
        assert!(lines >= 3);
        let header_height = lines as f64 * LINE_HEIGHT + CELL_PADDING;

        let mut ctx = RenderContext::new(&fonts, &settings, geometry);
        ctx.y = 200.0;
        render_table(&mut ctx, &wide, 65.0, 125.0);
        let pages = ctx.into_pages();
        assert!(pages.len() >= 2);

        for (index, page) in pages.iter().enumerate() {
            let top = if index == 0 { 200.0 } else { geometry.margin };
            let rules: Vec<f64> = page
                .elements
                .iter()
                .filter(|e| matches!(e.draw, DrawCommand::Line { color, .. } if color == Color::gray(200)))
                .map(|e| e.y)
                .collect();
            assert_eq!(rules.len(), 1, "page {}", index);
            assert!((rules[0] - (top + header_height)).abs() < 1e-9, "page {}", index);
        }
    }

    #[test]
    fn table_without_room_for_two_rows_starts_on_next_page() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 270.0;
        render_table(&mut ctx, &table(1), 65.0, 125.0);
        let pages = ctx.into_pages();
        assert!(pages[0].elements.is_empty());
        assert_eq!(pages[1].texts().next(), Some("Name"));
    }
}
