//! Image placement after a section's text.
//!
//! Images are loaded one at a time in document order. Each keeps its aspect
//! ratio, spans the column unless that would make it taller than
//! [`MAX_IMAGE_HEIGHT`], and may carry a `Figure:` caption from its alt text.
//! An image that cannot be loaded leaves a grey placeholder line instead.

use crate::font::FontVariant;
use crate::image_loader::{load_image, LoadedImage};
use crate::layout::blocks::draw_line;
use crate::layout::context::RenderContext;
use crate::markdown::{extract_images, ImageRef};
use crate::model::{Color, FontRole, StyledSpan};
use crate::text::{wrap_spans, TextKind, TextStyle};

pub const MAX_IMAGE_HEIGHT: f64 = 80.0;
const IMAGE_GAP: f64 = 5.0;
const CAPTION_LINE_HEIGHT: f64 = 5.0;
const DEFAULT_ALT: &str = "Image";
const PLACEHOLDER_SOURCES: [&str; 2] = ["/placeholder.svg", "/generic-placeholder-icon.png"];

/// Whether `src` is something the loader can try at all.
fn is_loadable_source(src: &str) -> bool {
    src.starts_with("data:")
        || src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("file://")
        || src.starts_with('/')
        || src.starts_with("./")
        || src.starts_with("../")
}

/// Display size in millimetres for an image of `aspect` (height / width).
pub fn fit_image(aspect: f64, max_width: f64) -> (f64, f64) {
    let mut width = max_width;
    let mut height = width * aspect;
    if height > MAX_IMAGE_HEIGHT {
        height = MAX_IMAGE_HEIGHT;
        width = height / aspect;
    }
    (width, height)
}

/// Paint every image referenced in `content` at the cursor.
pub fn render_images(ctx: &mut RenderContext, content: &str, x: f64, max_width: f64) {
    for image in extract_images(content) {
        render_image(ctx, &image, x, max_width);
    }
}

fn render_image(ctx: &mut RenderContext, image: &ImageRef, x: f64, max_width: f64) {
    if PLACEHOLDER_SOURCES.iter().any(|p| image.src.contains(p)) {
        return;
    }
    if image.src.starts_with("cornell-image://") {
        log::warn!("image not found in storage: {}", &image.src["cornell-image://".len()..]);
        return;
    }
    if !is_loadable_source(&image.src) {
        log::debug!("skipping image with unsupported source");
        return;
    }

    let alt = image.alt.as_deref().unwrap_or(DEFAULT_ALT);
    match load_image(&image.src) {
        Ok(loaded) if loaded.width_px > 0 && loaded.height_px > 0 => {
            place_image(ctx, loaded, alt, x, max_width)
        }
        Ok(_) => {
            log::warn!("image '{}' has no pixels", alt);
            render_placeholder(ctx, alt, x);
        }
        Err(e) => {
            log::warn!("image '{}' could not be loaded: {}", alt, e);
            render_placeholder(ctx, alt, x);
        }
    }
}

fn place_image(ctx: &mut RenderContext, image: LoadedImage, alt: &str, x: f64, max_width: f64) {
    let (width, height) = fit_image(image.aspect_ratio(), max_width);

    ctx.ensure_room(height + 10.0);
    ctx.y += IMAGE_GAP;
    ctx.image(image, x, ctx.y, width, height);

    if alt.is_empty() || alt == DEFAULT_ALT {
        ctx.y += height;
    } else {
        ctx.y += height + 3.0;
        ctx.ensure_room(6.0);
        let style = TextStyle::new(
            ctx.settings.family_for(FontRole::Body),
            ctx.settings.small_font_size,
            TextKind::Quote,
            ctx.settings,
        )
        .with_color(Color::gray(100));
        let caption = [StyledSpan::plain(format!("Figure: {}", alt))];
        for line in wrap_spans(&caption, max_width, ctx.fonts, &style) {
            let baseline = ctx.y;
            draw_line(ctx, &line, x, baseline, &style);
            ctx.y += CAPTION_LINE_HEIGHT;
        }
        ctx.set_text_color(Color::BLACK);
    }

    ctx.y += IMAGE_GAP;
}

fn render_placeholder(ctx: &mut RenderContext, alt: &str, x: f64) {
    let font = ctx.fonts.select(ctx.settings.family_for(FontRole::Body), FontVariant::Normal);
    ctx.set_font(font, ctx.settings.small_font_size);
    ctx.set_text_color(Color::gray(150));
    let baseline = ctx.y;
    ctx.text(&format!("[Image could not be loaded: {}]", alt), x, baseline);
    ctx.set_text_color(Color::BLACK);
    ctx.y += 8.0;
}
