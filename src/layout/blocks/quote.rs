use crate::layout::blocks::text::render_formatted_text;
use crate::layout::context::RenderContext;
use crate::model::Color;
use crate::text::TextStyle;

const INDENT: f64 = 5.0;

/// Paint quoted lines in muted italics, indented from both sides.
pub fn render_quote(ctx: &mut RenderContext, lines: &[String], x: f64, max_width: f64) {
    let style = TextStyle::quote(ctx.settings);
    for line in lines {
        render_formatted_text(ctx, line, x + INDENT, max_width - INDENT * 2.0, &style);
    }
    ctx.set_text_color(Color::BLACK);
}
