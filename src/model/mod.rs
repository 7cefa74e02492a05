//! # Document Model
//!
//! The value types that flow through the exporter: the note being exported,
//! the sections and blocks parsed out of its markdown, styled inline spans,
//! and the bookkeeping the page flow records while it lays sections out.
//!
//! All layout lengths are millimetres with the origin at the top-left corner
//! of the page. Font sizes are points. The PDF serializer converts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// A note to export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub markdown: String,
}

impl Note {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            markdown: markdown.into(),
        }
    }
}

/// One top-level (`# `) heading and the raw markdown beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

/// An atomic run of text sharing one style.
///
/// `code` spans never carry bold or italic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false, italic: false, code: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true, italic: false, code: false }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false, italic: true, code: false }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false, italic: false, code: true }
    }

    /// Same bold / italic / code flags.
    pub fn same_style(&self, other: &StyledSpan) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.code == other.code
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.code
    }
}

/// A wrapped line: spans that fit the measured width, adjacent styles merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub spans: Vec<StyledSpan>,
    /// Measured width in millimetres.
    pub width: f64,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl ColumnAlign {
    /// Read one cell of a separator row: `:---:` centers, `---:` right-aligns,
    /// anything else (including `:---` and a cell with no dashes) is left.
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        if !cell.contains('-') {
            return Self::Left;
        }
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Self::Center,
            (_, true) => Self::Right,
            _ => Self::Left,
        }
    }
}

/// A pipe table: header cells, per-column alignment, data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub alignments: Vec<ColumnAlign>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Alignment of column `index`; columns the separator row doesn't cover
    /// are left-aligned.
    pub fn alignment(&self, index: usize) -> ColumnAlign {
        self.alignments.get(index).copied().unwrap_or_default()
    }

    /// Source lines the table occupied: header, separator, data rows.
    pub fn source_rows(&self) -> usize {
        self.rows.len() + 2
    }
}

/// A block-level markdown construct inside a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Heading { level: usize, text: String },
    List { items: Vec<String>, ordered: bool },
    Table(Table),
    Code(Vec<String>),
    Blockquote(Vec<String>),
}

/// Typeface choice offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontPreference {
    #[default]
    Sans,
    Serif,
    Mixed,
}

impl FromStr for FontPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans" => Ok(Self::Sans),
            "serif" => Ok(Self::Serif),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("unknown font preference '{}' (expected sans, serif or mixed)", other)),
        }
    }
}

impl fmt::Display for FontPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sans => "sans",
            Self::Serif => "serif",
            Self::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Logical font slots the renderers ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Body,
    Code,
}

/// Typefaces and sizes for one export. Immutable once derived.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSettings {
    pub title_font: String,
    pub body_font: String,
    pub mixed_mode: bool,
    pub title_font_size: f64,
    pub body_font_size: f64,
    pub small_font_size: f64,
    pub code_font_size: f64,
}

impl FontSettings {
    pub fn for_preference(preference: FontPreference) -> Self {
        let title_font_size = 15.0;
        let body_font_size = 12.0;
        let small_font_size = 10.0;
        let code_font_size = 9.0;

        match preference {
            FontPreference::Serif => Self {
                title_font: "times".to_string(),
                body_font: "times".to_string(),
                mixed_mode: false,
                title_font_size: title_font_size + 1.0,
                body_font_size: body_font_size + 0.5,
                small_font_size,
                code_font_size,
            },
            FontPreference::Mixed => Self {
                title_font: "helvetica".to_string(),
                body_font: "times".to_string(),
                mixed_mode: true,
                title_font_size,
                body_font_size: body_font_size + 0.5,
                small_font_size,
                code_font_size,
            },
            FontPreference::Sans => Self {
                title_font: "helvetica".to_string(),
                body_font: "helvetica".to_string(),
                mixed_mode: false,
                title_font_size,
                body_font_size,
                small_font_size,
                code_font_size,
            },
        }
    }

    /// The logical family name that fills `role`.
    pub fn family_for(&self, role: FontRole) -> &str {
        match role {
            FontRole::Title => &self.title_font,
            FontRole::Body => &self.body_font,
            FontRole::Code => "courier",
        }
    }
}

impl Default for FontSettings {
    fn default() -> Self {
        Self::for_preference(FontPreference::default())
    }
}

/// An RGB color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    /// Neutral grey from an 8-bit level.
    pub fn gray(level: u8) -> Self {
        let v = level as f64 / 255.0;
        Color { r: v, g: v, b: v }
    }
}

/// Page size and the two-column grid, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Width of the narrow left column holding section headings.
    pub key_points_width: f64,
}

impl Default for PageGeometry {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
            key_points_width: 45.0,
        }
    }
}

impl PageGeometry {
    /// Width of the right (notes) column.
    pub fn content_width(&self) -> f64 {
        self.width - self.margin - self.key_points_width - self.margin
    }

    /// Left edge of the notes column's text.
    pub fn content_x(&self) -> f64 {
        self.margin + self.key_points_width + 5.0
    }

    /// Usable text width inside the notes column.
    pub fn text_width(&self) -> f64 {
        self.content_width() - 10.0
    }

    /// X of the vertical rule between the columns.
    pub fn divider_x(&self) -> f64 {
        self.margin + self.key_points_width
    }

    /// Right edge of the two-column grid.
    pub fn right_edge(&self) -> f64 {
        self.margin + self.key_points_width + self.content_width()
    }

    /// Lowest Y content may reach.
    pub fn bottom(&self) -> f64 {
        self.height - self.margin
    }
}

/// Where a section started and ended. Page indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBoundary {
    pub index: usize,
    pub start_y: f64,
    pub start_page: usize,
    pub end_y: f64,
    pub end_page: usize,
}

impl SectionBoundary {
    pub fn spans_pages(&self) -> bool {
        self.end_page > self.start_page
    }
}

/// Page index → index of the section that page continues.
pub type ContinuationPages = BTreeMap<usize, usize>;
