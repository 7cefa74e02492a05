//! Block renderers: one per block type, all drawing at the context cursor
//! and leaving it below what they painted.
//!
//! Every renderer handles its own page breaks. A fresh page starts from the
//! default drawing state, so renderers set their face and colors again after
//! any break instead of relying on what was active before it.

pub mod code;
pub mod list;
pub mod quote;
pub mod table;
pub mod text;

pub use code::render_code;
pub use list::{list_marker, render_list};
pub use quote::render_quote;
pub use table::render_table;
pub use text::{draw_line, render_formatted_text, render_heading, render_paragraph, LINE_HEIGHT};

use crate::layout::context::RenderContext;
use crate::markdown::{segment_blocks, Segment};
use crate::model::Block;

/// Paint one block at the cursor.
pub fn render_block(ctx: &mut RenderContext, block: &Block, x: f64, max_width: f64) {
    match block {
        Block::Paragraph(text) => render_paragraph(ctx, text, x, max_width),
        Block::Heading { level, text } => render_heading(ctx, *level, text, x, max_width),
        Block::List { items, ordered } => render_list(ctx, items, *ordered, x, max_width),
        Block::Table(table) => render_table(ctx, table, x, max_width),
        Block::Code(lines) => render_code(ctx, lines, x, max_width),
        Block::Blockquote(lines) => render_quote(ctx, lines, x, max_width),
    }
}

/// Paint a section's text content (images already stripped). Blank lines
/// add a third of a line.
pub fn render_content(ctx: &mut RenderContext, content: &str, x: f64, max_width: f64) {
    for segment in segment_blocks(content) {
        match segment {
            Segment::Blank => ctx.y += LINE_HEIGHT / 3.0,
            Segment::Block(block) => render_block(ctx, &block, x, max_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{FontSettings, PageGeometry};

    #[test]
    fn content_walks_every_segment() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 40.0;
        render_content(&mut ctx, "one\n\n- a\n- b\n\n> quoted", 65.0, 125.0);
        // paragraph 8, blank 2, list 8+8+2, blank 2, quote 8
        assert_eq!(ctx.y, 40.0 + 8.0 + 2.0 + 18.0 + 2.0 + 8.0);
        let pages = ctx.into_pages();
        let texts: Vec<_> = pages[0].texts().collect();
        assert_eq!(texts, vec!["one", "\u{2022}", "a", "\u{2022}", "b", "quoted"]);
    }
}
