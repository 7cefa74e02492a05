//! # Font Management
//!
//! Resolving logical font families to the standard PDF fonts and measuring
//! text with their metrics.
//!
//! Only the built-in faces (Helvetica, Times, Courier) are registered; they
//! need no embedding. A logical family such as `"times"` maps to an ordered
//! fallback chain (`Georgia → Times → Helvetica`). The chain is plain data
//! and is walked in order until the registry knows a family, so a missing
//! face degrades to the next one instead of failing the export.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

use crate::model::PT_PER_MM;

/// The universal last resort at the end of every fallback chain.
pub const DEFAULT_FAMILY: &str = "Helvetica";

/// Bold / italic combination of a face.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum FontVariant {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Normal,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// The standard PDF fonts this exporter uses.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Glyph metrics for this face. Obliques share their upright widths.
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
            Self::TimesItalic => &metrics::TIMES_ITALIC,
            Self::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER
            }
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub variant: FontVariant,
}

/// Maps family + variant to a concrete face.
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        use FontVariant::*;

        let standard_mappings = [
            (("Helvetica", Normal), StandardFont::Helvetica),
            (("Helvetica", Bold), StandardFont::HelveticaBold),
            (("Helvetica", Italic), StandardFont::HelveticaOblique),
            (("Helvetica", BoldItalic), StandardFont::HelveticaBoldOblique),
            (("Times", Normal), StandardFont::TimesRoman),
            (("Times", Bold), StandardFont::TimesBold),
            (("Times", Italic), StandardFont::TimesItalic),
            (("Times", BoldItalic), StandardFont::TimesBoldItalic),
            (("Courier", Normal), StandardFont::Courier),
            (("Courier", Bold), StandardFont::CourierBold),
            (("Courier", Italic), StandardFont::CourierOblique),
            (("Courier", BoldItalic), StandardFont::CourierBoldOblique),
        ];

        let fonts = standard_mappings
            .into_iter()
            .map(|((family, variant), font)| {
                (
                    FontKey {
                        family: family.to_string(),
                        variant,
                    },
                    font,
                )
            })
            .collect();

        Self { fonts }
    }

    /// Exact lookup; `None` when the family is not registered.
    pub fn get(&self, family: &str, variant: FontVariant) -> Option<StandardFont> {
        self.fonts
            .get(&FontKey {
                family: family.to_string(),
                variant,
            })
            .copied()
    }
}

/// Ordered candidate families for a logical font name.
///
/// The last resort ([`DEFAULT_FAMILY`]) is not listed; [`FontContext::select`]
/// always tries it after the chain is exhausted.
pub fn fallback_chain(logical: &str) -> &'static [&'static str] {
    match logical.to_ascii_lowercase().as_str() {
        "times" | "georgia" | "serif" => &["Georgia", "Times"],
        "courier" | "monospace" => &["Courier", "CourierNew", "Times"],
        "helvetica" | "sans" => &["Helvetica"],
        _ => &[],
    }
}

/// Shared font context used by layout and PDF serialization.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Resolve a logical family to a concrete face by walking its fallback
    /// chain. Never fails: the chain ends at Helvetica, which is always
    /// registered.
    pub fn select(&self, logical: &str, variant: FontVariant) -> StandardFont {
        for family in fallback_chain(logical) {
            if let Some(font) = self.registry.get(family, variant) {
                return font;
            }
            log::debug!("font family {} unavailable, trying next fallback", family);
        }
        if let Some(font) = self.registry.get(DEFAULT_FAMILY, variant) {
            log::debug!("no face for '{}', using {}", logical, DEFAULT_FAMILY);
            return font;
        }
        log::warn!("no {:?} face registered for '{}', using Helvetica", variant, logical);
        StandardFont::Helvetica
    }

    /// Width of `text` in millimetres when set in `font` at `font_size` points.
    pub fn text_width(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size) / PT_PER_MM
    }

    /// Distance from the top of the line box to the baseline, in millimetres.
    pub fn ascent(&self, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().ascent as f64 / 1000.0 * font_size / PT_PER_MM
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}
