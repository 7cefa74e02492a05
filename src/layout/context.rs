//! The render context threaded through every block renderer.
//!
//! It owns the pages laid out so far, the index of the page being drawn on,
//! the vertical cursor and the active drawing state. A fresh page starts from
//! the default drawing state, so anything that spans a page break has to set
//! its font and colors again after [`RenderContext::add_page`].

use crate::font::{FontContext, StandardFont};
use crate::image_loader::LoadedImage;
use crate::model::{Color, FontSettings, PageGeometry};

/// A cursor this close to the top margin counts as "at the top of a page".
pub const NEAR_TOP: f64 = 20.0;

/// A laid-out page: absolute positions in millimetres from the top-left.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Every text run on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.draw {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A positioned drawing operation.
///
/// For text, `(x, y)` is the start of the baseline. For lines it is the first
/// endpoint and `(x + width, y + height)` the second. Rects and images use
/// their top-left corner.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Rect {
        fill: Option<Color>,
        stroke: Option<Color>,
        line_width: f64,
    },
    Line {
        color: Color,
        line_width: f64,
    },
    Text {
        text: String,
        font: StandardFont,
        size: f64,
        color: Color,
    },
    Image {
        image_data: LoadedImage,
    },
}

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    Fill,
    Stroke,
    FillStroke,
}

/// Font, colors and line width in effect for the next drawing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub font: StandardFont,
    pub font_size: f64,
    pub text_color: Color,
    pub fill_color: Color,
    pub draw_color: Color,
    pub line_width: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            font: StandardFont::Helvetica,
            font_size: 16.0,
            text_color: Color::BLACK,
            fill_color: Color::BLACK,
            draw_color: Color::BLACK,
            line_width: 0.2,
        }
    }
}

pub struct RenderContext<'a> {
    pub fonts: &'a FontContext,
    pub settings: &'a FontSettings,
    pub geometry: PageGeometry,
    /// Vertical cursor on the current page.
    pub y: f64,
    pages: Vec<LayoutPage>,
    current: usize,
    state: DrawState,
}

impl<'a> RenderContext<'a> {
    /// A context holding one empty page with the cursor at the top margin.
    pub fn new(fonts: &'a FontContext, settings: &'a FontSettings, geometry: PageGeometry) -> Self {
        let mut ctx = Self {
            fonts,
            settings,
            geometry,
            y: geometry.margin,
            pages: Vec::new(),
            current: 0,
            state: DrawState::default(),
        };
        ctx.push_page();
        ctx
    }

    fn push_page(&mut self) {
        self.pages.push(LayoutPage {
            width: self.geometry.width,
            height: self.geometry.height,
            elements: Vec::new(),
        });
        self.current = self.pages.len() - 1;
    }

    /// Start a new page: the cursor moves to the top margin and the drawing
    /// state is back to its defaults.
    pub fn add_page(&mut self) {
        self.push_page();
        self.y = self.geometry.margin;
        self.state = DrawState::default();
        log::debug!("started page {}", self.pages.len());
    }

    /// Switch drawing to an existing page without touching the cursor.
    pub fn set_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        } else {
            log::warn!("page {} does not exist ({} pages)", index, self.pages.len());
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<LayoutPage> {
        self.pages
    }

    /// Lowest Y content may reach on any page.
    pub fn bottom(&self) -> f64 {
        self.geometry.bottom()
    }

    pub fn remaining(&self) -> f64 {
        self.bottom() - self.y
    }

    /// Whether `height` more millimetres fit below the cursor.
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.bottom()
    }

    pub fn is_near_top(&self) -> bool {
        self.y <= self.geometry.margin + NEAR_TOP
    }

    /// Advance to a new page when `height` does not fit. Returns whether a
    /// page was added.
    pub fn ensure_room(&mut self, height: f64) -> bool {
        if self.fits(height) {
            return false;
        }
        self.add_page();
        true
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        self.state.font = font;
        self.state.font_size = size;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.state.text_color = color;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.state.draw_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    /// Width of `text` in the active font.
    pub fn measure(&self, text: &str) -> f64 {
        self.fonts.text_width(text, self.state.font, self.state.font_size)
    }

    fn push(&mut self, element: LayoutElement) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.elements.push(element);
        }
    }

    /// Draw `text` with its baseline starting at `(x, y)`.
    pub fn text(&mut self, text: &str, x: f64, y: f64) {
        if text.is_empty() {
            return;
        }
        let width = self.measure(text);
        let height = self.state.font_size / crate::model::PT_PER_MM;
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Text {
                text: text.to_string(),
                font: self.state.font,
                size: self.state.font_size,
                color: self.state.text_color,
            },
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(LayoutElement {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            draw: DrawCommand::Line {
                color: self.state.draw_color,
                line_width: self.state.line_width,
            },
        });
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: RectStyle) {
        let fill = matches!(style, RectStyle::Fill | RectStyle::FillStroke).then_some(self.state.fill_color);
        let stroke = matches!(style, RectStyle::Stroke | RectStyle::FillStroke).then_some(self.state.draw_color);
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect {
                fill,
                stroke,
                line_width: self.state.line_width,
            },
        });
    }

    pub fn image(&mut self, image: LoadedImage, x: f64, y: f64, width: f64, height: f64) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Image { image_data: image },
        });
    }
}
