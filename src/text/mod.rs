//! # Text Layout
//!
//! Greedy word wrapping of styled spans.
//!
//! Every word is measured with the face its span will actually be drawn in,
//! so bold and code runs wrap at their real widths. Words keep their trailing
//! whitespace; adjacent words of the same style are coalesced into one span.

use crate::font::{FontContext, FontVariant, StandardFont};
use crate::model::{Color, FontRole, FontSettings, Line, StyledSpan};

/// Measures rendered text in millimetres.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: StandardFont, font_size: f64) -> f64;
}

impl TextMeasure for FontContext {
    fn measure(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        self.text_width(text, font, font_size)
    }
}

/// How span flags map to faces for one kind of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Flags are taken as written.
    Body,
    /// Everything is italic; bold becomes bold-italic.
    Quote,
    /// Everything is bold; italic becomes bold-italic.
    Heading,
}

/// Font, size and color a run of formatted text is set in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size: f64,
    pub code_size: f64,
    pub kind: TextKind,
    pub color: Color,
}

impl TextStyle {
    pub fn new(family: &str, size: f64, kind: TextKind, settings: &FontSettings) -> Self {
        Self {
            family: family.to_string(),
            size,
            code_size: settings.code_font_size,
            kind,
            color: Color::BLACK,
        }
    }

    pub fn body(settings: &FontSettings) -> Self {
        Self::new(settings.family_for(FontRole::Body), settings.body_font_size, TextKind::Body, settings)
    }

    /// Muted italic, one point below body size.
    pub fn quote(settings: &FontSettings) -> Self {
        Self {
            color: Color::gray(100),
            ..Self::new(settings.family_for(FontRole::Body), settings.body_font_size - 1.0, TextKind::Quote, settings)
        }
    }

    /// Sub-heading of `level` (2..=6): one point smaller per level below the
    /// title size, never smaller than body text.
    pub fn heading(settings: &FontSettings, level: usize) -> Self {
        let size = (settings.title_font_size - (level as f64 - 1.0)).max(settings.body_font_size);
        Self::new(settings.family_for(FontRole::Title), size, TextKind::Heading, settings)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// The face and size `span` is drawn with under `style`.
pub fn span_font(fonts: &FontContext, style: &TextStyle, span: &StyledSpan) -> (StandardFont, f64) {
    if span.code {
        return (fonts.select("courier", FontVariant::Normal), style.code_size);
    }
    let (bold, italic) = match style.kind {
        TextKind::Body => (span.bold, span.italic),
        TextKind::Quote => (span.bold, true),
        TextKind::Heading => (true, span.italic),
    };
    (fonts.select(&style.family, FontVariant::from_flags(bold, italic)), style.size)
}

/// Width of one span in millimetres.
pub fn span_width(fonts: &FontContext, style: &TextStyle, span: &StyledSpan) -> f64 {
    let (font, size) = span_font(fonts, style, span);
    fonts.measure(&span.text, font, size)
}

/// Split into words, each keeping the whitespace that follows it. Leading
/// whitespace is its own word.
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space && !space {
            if i > start {
                words.push(&text[start..i]);
            }
            start = i;
        }
        in_space = space;
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

fn push_merged(spans: &mut Vec<StyledSpan>, piece: StyledSpan) {
    match spans.last_mut() {
        Some(last) if last.same_style(&piece) => last.text.push_str(&piece.text),
        _ => spans.push(piece),
    }
}

/// Wrap `spans` into lines no wider than `max_width` millimetres.
///
/// A word wider than the whole line sits alone on its own line. The result
/// always holds at least one line; empty input yields one empty line.
pub fn wrap_spans(
    spans: &[StyledSpan],
    max_width: f64,
    fonts: &FontContext,
    style: &TextStyle,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<StyledSpan> = Vec::new();
    let mut width = 0.0;

    for span in spans {
        for word in split_words(&span.text) {
            let piece = StyledSpan {
                text: word.to_string(),
                ..span.clone()
            };
            let w = span_width(fonts, style, &piece);
            if width + w > max_width && !current.is_empty() {
                lines.push(Line {
                    spans: std::mem::take(&mut current),
                    width,
                });
                width = 0.0;
            }
            push_merged(&mut current, piece);
            width += w;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(Line {
            spans: current,
            width,
        });
    }

    lines
}

/// Concatenate wrapped lines back into one span sequence.
pub fn flatten(lines: &[Line]) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    for line in lines {
        for span in &line.spans {
            push_merged(&mut spans, span.clone());
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse_inline;

    fn body() -> (FontContext, TextStyle) {
        let settings = FontSettings::default();
        (FontContext::new(), TextStyle::body(&settings))
    }

    #[test]
    fn words_keep_trailing_space() {
        assert_eq!(split_words("a  bc d"), vec!["a  ", "bc ", "d"]);
        assert_eq!(split_words("  lead"), vec!["  ", "lead"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        let (fonts, style) = body();
        let lines = wrap_spans(&[], 100.0, &fonts, &style);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.is_empty());
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn short_text_fits_one_line_with_merged_spans() {
        let (fonts, style) = body();
        let lines = wrap_spans(&parse_inline("one two **three four**"), 200.0, &fonts, &style);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].spans,
            vec![StyledSpan::plain("one two "), StyledSpan::bold("three four")]
        );
    }

    #[test]
    fn long_text_wraps_within_width() {
        let (fonts, style) = body();
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
        let lines = wrap_spans(&parse_inline(text), 40.0, &fonts, &style);
        assert!(lines.len() > 1);
        for line in &lines {
            // trailing whitespace may hang past the edge
            let visible = line.text().trim_end().to_string();
            let w = span_width(&fonts, &style, &StyledSpan::plain(visible));
            assert!(w <= 40.0 + 1e-9, "line too wide: {:?}", line.text());
        }
        let joined: String = lines.iter().map(|l| l.text()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn accented_capitals_wrap_within_width() {
        let (fonts, style) = body();
        let ae = span_width(&fonts, &style, &StyledSpan::plain("Æ"));
        assert!((ae - 12.0 / crate::model::PT_PER_MM).abs() < 1e-9);
        let text = "ÜBERGRÖSSE ÆÆÆÆ ".repeat(10);
        let lines = wrap_spans(&[StyledSpan::plain(text.trim_end())], 125.0, &fonts, &style);
        assert!(lines.len() > 1);
        for line in &lines {
            let visible = line.text().trim_end().to_string();
            let painted = span_width(&fonts, &style, &StyledSpan::plain(visible));
            assert!(painted <= 125.0 + 1e-9, "line too wide: {:?}", line.text());
        }
    }

    #[test]
    fn rewrapping_is_idempotent() {
        let (fonts, style) = body();
        let spans = parse_inline("The *quick* brown fox **jumps over** the `lazy` dog again and again");
        let first = wrap_spans(&spans, 50.0, &fonts, &style);
        let second = wrap_spans(&flatten(&first), 50.0, &fonts, &style);
        assert_eq!(first, second);
    }

    #[test]
    fn bold_measures_wider() {
        let (fonts, style) = body();
        let plain = span_width(&fonts, &style, &StyledSpan::plain("Heading"));
        let bold = span_width(&fonts, &style, &StyledSpan::bold("Heading"));
        assert!(bold > plain);
    }

    #[test]
    fn heading_sizes_decrease_and_floor_at_body() {
        let settings = FontSettings::default();
        let sizes: Vec<f64> = (2..=6).map(|l| TextStyle::heading(&settings, l).size).collect();
        assert_eq!(sizes, vec![14.0, 13.0, 12.0, 12.0, 12.0]);
    }

    #[test]
    fn mixed_styles_follow_font_roles() {
        let settings = FontSettings::for_preference(crate::model::FontPreference::Mixed);
        assert_eq!(TextStyle::heading(&settings, 2).family, settings.family_for(FontRole::Title));
        assert_eq!(TextStyle::body(&settings).family, "times");
        assert_eq!(TextStyle::quote(&settings).family, "times");
    }

    #[test]
    fn quote_and_heading_remap_faces() {
        let settings = FontSettings::default();
        let fonts = FontContext::new();
        let quote = TextStyle::quote(&settings);
        assert_eq!(span_font(&fonts, &quote, &StyledSpan::plain("q")).0, StandardFont::HelveticaOblique);
        assert_eq!(span_font(&fonts, &quote, &StyledSpan::bold("q")).0, StandardFont::HelveticaBoldOblique);
        let heading = TextStyle::heading(&settings, 2);
        assert_eq!(span_font(&fonts, &heading, &StyledSpan::plain("h")).0, StandardFont::HelveticaBold);
        assert_eq!(span_font(&fonts, &heading, &StyledSpan::code("c")), (StandardFont::Courier, 9.0));
    }
}
