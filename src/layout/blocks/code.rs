use crate::font::FontVariant;
use crate::layout::context::{RectStyle, RenderContext};
use crate::model::{Color, FontRole};

const CODE_LINE_HEIGHT: f64 = 4.5;
const BOX_PADDING: f64 = 8.0;
const TEXT_INSET: f64 = 4.0;
const FIRST_BASELINE: f64 = 6.0;

/// Open a code box at the cursor sized for `lines` remaining lines, clipped
/// to the bottom margin, and set the code face. Returns the box height.
fn open_box(ctx: &mut RenderContext, x: f64, width: f64, lines: usize) -> f64 {
    let height = (lines as f64 * CODE_LINE_HEIGHT + BOX_PADDING).min(ctx.remaining());
    ctx.set_fill_color(Color::gray(248));
    ctx.set_draw_color(Color::gray(220));
    ctx.set_line_width(0.5);
    ctx.rect(x, ctx.y, width, height, RectStyle::FillStroke);

    let family = ctx.settings.family_for(FontRole::Code).to_string();
    let font = ctx.fonts.select(&family, FontVariant::Normal);
    ctx.set_font(font, ctx.settings.code_font_size);
    ctx.set_text_color(Color::gray(40));
    height
}

/// Paint a fenced code block verbatim inside a shaded box.
///
/// A block that does not fit whole starts on a new page unless the cursor
/// is already near the top. A block taller than the rest of the page closes
/// its box at the bottom margin and opens a new one on the next page.
pub fn render_code(ctx: &mut RenderContext, lines: &[String], x: f64, width: f64) {
    let full_height = lines.len() as f64 * CODE_LINE_HEIGHT + BOX_PADDING;
    if !ctx.fits(full_height) && !ctx.is_near_top() {
        ctx.add_page();
    }

    let mut top = ctx.y;
    let mut box_height = open_box(ctx, x, width, lines.len());
    let mut text_y = top + FIRST_BASELINE;

    for (i, line) in lines.iter().enumerate() {
        if text_y + CODE_LINE_HEIGHT > ctx.bottom() {
            ctx.add_page();
            top = ctx.y;
            box_height = open_box(ctx, x, width, lines.len() - i);
            text_y = top + FIRST_BASELINE;
        }
        ctx.text(line, x + TEXT_INSET, text_y);
        text_y += CODE_LINE_HEIGHT;
    }

    ctx.set_line_width(0.2);
    ctx.set_text_color(Color::BLACK);
    ctx.y = (top + box_height).max(text_y) + 4.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontContext, StandardFont};
    use crate::layout::context::DrawCommand;
    use crate::model::{FontSettings, PageGeometry};

    fn code(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("    line {}", i)).collect()
    }

    fn boxes(page: &crate::layout::context::LayoutPage) -> Vec<f64> {
        page.elements
            .iter()
            .filter_map(|e| match e.draw {
                DrawCommand::Rect { .. } => Some(e.height),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn short_block_fits() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 50.0;
        render_code(&mut ctx, &code(2), 65.0, 125.0);
        // box 2*4.5+8 = 17; text ends at 50+6+9 = 65 < 67
        assert_eq!(ctx.y, 50.0 + 17.0 + 4.0);

        let pages = ctx.into_pages();
        assert_eq!(boxes(&pages[0]), vec![17.0]);
        match &pages[0].elements[1].draw {
            DrawCommand::Text { text, font, size, color } => {
                assert_eq!(text, "    line 0");
                assert_eq!(*font, StandardFont::Courier);
                assert_eq!(*size, 9.0);
                assert_eq!(*color, Color::gray(40));
            }
            other => panic!("expected code text, got {:?}", other),
        }
    }

    #[test]
    fn block_that_does_not_fit_moves_to_next_page() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 250.0;
        render_code(&mut ctx, &code(10), 65.0, 125.0);
        let pages = ctx.into_pages();
        assert!(pages[0].elements.is_empty());
        assert_eq!(boxes(&pages[1]), vec![53.0]);
    }

    #[test]
    fn tall_block_at_the_top_edge_starts_in_place() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        // margin 15 plus the 20mm near-top band
        ctx.y = 35.0;
        assert!(ctx.is_near_top());
        render_code(&mut ctx, &code(80), 65.0, 125.0);
        let pages = ctx.into_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(boxes(&pages[0]), vec![247.0]);
        assert_eq!(pages[0].elements[0].y, 35.0);
        assert_eq!(pages[0].texts().next(), Some("    line 0"));
    }

    #[test]
    fn tall_block_splits_into_boxes() {
        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 20.0;
        render_code(&mut ctx, &code(80), 65.0, 125.0);
        assert_eq!(ctx.page_count(), 2);
        let pages = ctx.into_pages();
        let first = boxes(&pages[0]);
        let second = boxes(&pages[1]);
        assert_eq!(first, vec![262.0]);
        assert_eq!(second.len(), 1);

        let on_first = pages[0].texts().count();
        let on_second = pages[1].texts().count();
        assert_eq!(on_first + on_second, 80);
        // the second box is sized for what is left
        assert_eq!(second[0], on_second as f64 * 4.5 + 8.0);
    }
}
