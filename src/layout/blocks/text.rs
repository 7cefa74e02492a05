//! Formatted text: paragraphs, sub-headings, and the line painter every
//! other renderer shares.

use crate::layout::context::{RectStyle, RenderContext};
use crate::markdown::parse_inline;
use crate::model::{Color, Line};
use crate::text::{span_font, wrap_spans, TextStyle};

/// Vertical pitch of wrapped text lines.
pub const LINE_HEIGHT: f64 = 6.0;

/// Paint one wrapped line with its baseline at `baseline`, starting at `x`.
///
/// Each span sets its own face, so the line is correct whatever state the
/// context was left in. Code spans get a light backdrop.
pub fn draw_line(ctx: &mut RenderContext, line: &Line, x: f64, baseline: f64, style: &TextStyle) {
    let mut cursor = x;
    for span in &line.spans {
        let (font, size) = span_font(ctx.fonts, style, span);
        ctx.set_font(font, size);
        let width = ctx.measure(&span.text);
        if span.code {
            ctx.set_fill_color(Color::gray(248));
            ctx.rect(cursor - 1.0, baseline - 5.0, width + 2.0, LINE_HEIGHT - 1.0, RectStyle::Fill);
        }
        ctx.set_text_color(style.color);
        ctx.text(&span.text, cursor, baseline);
        cursor += width;
    }
}

/// Parse, wrap and paint one line of markdown text at the cursor.
///
/// Each wrapped line checks for room first and moves to a new page when it
/// would cross the bottom margin. Leaves the cursor 2 mm below the last line.
pub fn render_formatted_text(ctx: &mut RenderContext, text: &str, x: f64, max_width: f64, style: &TextStyle) {
    let lines = wrap_spans(&parse_inline(text), max_width, ctx.fonts, style);
    for line in &lines {
        ctx.ensure_room(LINE_HEIGHT);
        let baseline = ctx.y + 2.0;
        draw_line(ctx, line, x, baseline, style);
        ctx.y += LINE_HEIGHT;
    }
    ctx.y += 2.0;
}

pub fn render_paragraph(ctx: &mut RenderContext, text: &str, x: f64, max_width: f64) {
    let style = TextStyle::body(ctx.settings);
    render_formatted_text(ctx, text, x, max_width, &style);
}

pub fn render_heading(ctx: &mut RenderContext, level: usize, text: &str, x: f64, max_width: f64) {
    let style = TextStyle::heading(ctx.settings, level);
    render_formatted_text(ctx, text, x, max_width, &style);
}
