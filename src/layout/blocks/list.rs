use crate::font::FontVariant;
use crate::layout::blocks::text::{render_formatted_text, LINE_HEIGHT};
use crate::layout::context::RenderContext;
use crate::model::Color;
use crate::text::TextStyle;

const INDENT: f64 = 5.0;

/// Marker for item `index` (zero-based).
pub fn list_marker(index: usize, ordered: bool) -> String {
    if ordered {
        format!("{}.", index + 1)
    } else {
        "\u{2022}".to_string()
    }
}

/// Paint a flat list. Item text hangs at the marker width plus an indent.
pub fn render_list(ctx: &mut RenderContext, items: &[String], ordered: bool, x: f64, max_width: f64) {
    let style = TextStyle::body(ctx.settings);
    let marker_font = ctx.fonts.select(&style.family, FontVariant::Normal);

    for (index, item) in items.iter().enumerate() {
        ctx.ensure_room(LINE_HEIGHT);
        ctx.set_font(marker_font, style.size);
        ctx.set_text_color(Color::BLACK);

        let marker = list_marker(index, ordered);
        let marker_width = if ordered {
            ctx.measure(&format!("{} ", marker))
        } else {
            ctx.measure(&format!("{}  ", marker))
        };
        let baseline = ctx.y + 2.0;
        ctx.text(&marker, x, baseline);

        render_formatted_text(
            ctx,
            item.trim(),
            x + marker_width + INDENT,
            max_width - marker_width - INDENT,
            &style,
        );
    }

    ctx.y += 2.0;
}
