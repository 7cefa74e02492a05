//! Section height estimation.
//!
//! A cheap prediction of how tall a section will render, made before any of
//! it is painted so the flow controller can move the whole section to a new
//! page up front. It walks the same segmentation the renderers paint from.

use crate::markdown::{image_tag_count, segment_blocks, strip_images, Segment};
use crate::model::{Block, Section};

const LINE_HEIGHT: f64 = 6.0;
const HEADING_CHARS_PER_LINE: usize = 30;
const TEXT_CHARS_PER_LINE: usize = 80;
const TABLE_ROW_HEIGHT: f64 = 8.0;
const IMAGE_HEIGHT: f64 = 40.0;

fn lines_for(chars: usize, per_line: usize) -> f64 {
    chars.div_ceil(per_line) as f64
}

/// Estimated height of one block in millimetres.
pub fn estimate_block(block: &Block) -> f64 {
    match block {
        Block::Table(table) => table.source_rows() as f64 * TABLE_ROW_HEIGHT + 10.0,
        Block::Code(lines) => lines.len() as f64 * LINE_HEIGHT + 10.0,
        Block::List { items, .. } => items.len() as f64 * LINE_HEIGHT + 5.0,
        Block::Blockquote(lines) => lines.len() as f64 * LINE_HEIGHT + 5.0,
        Block::Heading { .. } => LINE_HEIGHT * 1.5 + 5.0,
        Block::Paragraph(text) => {
            lines_for(text.chars().count(), TEXT_CHARS_PER_LINE) * LINE_HEIGHT + 2.0
        }
    }
}

/// Estimated height of a whole section: its left-column heading, every
/// block and blank line of its text, and a fixed allowance per image.
pub fn estimate_section_height(section: &Section) -> f64 {
    let heading = lines_for(section.heading.chars().count(), HEADING_CHARS_PER_LINE) * LINE_HEIGHT + 10.0;

    let body: f64 = segment_blocks(&strip_images(&section.content))
        .iter()
        .map(|segment| match segment {
            Segment::Blank => LINE_HEIGHT / 3.0,
            Segment::Block(block) => estimate_block(block),
        })
        .sum();

    let images = image_tag_count(&section.content) as f64 * IMAGE_HEIGHT;

    heading + body + images
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(heading: &str, content: &str) -> Section {
        Section {
            heading: heading.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn heading_only() {
        // ceil(5/30) = 1 line
        assert_eq!(estimate_section_height(&section("Short", "")), 6.0 + 10.0 + 2.0);
        let long = "x".repeat(61);
        assert_eq!(estimate_section_height(&section(&long, "")), 18.0 + 10.0 + 2.0);
    }

    #[test]
    fn every_block_kind() {
        let content = "\
text line
## Sub
- a
- b
> q
| h |
|---|
| r |
```
code
```";
        let expected = (6.0 + 2.0) + 14.0 + (12.0 + 5.0) + (6.0 + 5.0) + (3.0 * 8.0 + 10.0) + (6.0 + 10.0);
        assert_eq!(estimate_section_height(&section("H", content)), 16.0 + expected);
    }

    #[test]
    fn images_add_a_fixed_allowance() {
        let content = r#"<img src="data:image/png;base64,AA"> ![x](y.png)"#;
        // what is left after stripping is whitespace, a blank line
        assert_eq!(estimate_section_height(&section("H", content)), 16.0 + 2.0 + 80.0);
    }

    #[test]
    fn long_paragraph_counts_wrapped_lines() {
        let text = "w".repeat(161);
        assert_eq!(estimate_block(&Block::Paragraph(text)), 3.0 * 6.0 + 2.0);
    }

    #[test]
    fn estimate_and_renderer_share_run_boundaries() {
        use crate::font::FontContext;
        use crate::layout::blocks::render_content;
        use crate::layout::context::RenderContext;
        use crate::model::{FontSettings, PageGeometry};

        // a lone pipe line is a paragraph to both
        let content = "| lone |\nafter";
        assert_eq!(estimate_section_height(&section("H", content)), 16.0 + 8.0 + 8.0);

        let fonts = FontContext::new();
        let settings = FontSettings::default();
        let mut ctx = RenderContext::new(&fonts, &settings, PageGeometry::default());
        ctx.y = 40.0;
        render_content(&mut ctx, content, 65.0, 125.0);
        assert_eq!(ctx.y, 40.0 + 16.0);
        assert_eq!(ctx.pages()[0].texts().collect::<Vec<_>>(), vec!["| lone |", "after"]);
    }
}
