//! # Cornell Notes
//!
//! A page-native exporter that turns a markdown note into a two-column
//! Cornell-style PDF: section headings in a narrow key-points column on the
//! left, the rendered notes on the right.
//!
//! Content flows *into* pages. Sections are estimated before they are drawn
//! so that one which will not fit starts on a fresh page, and every block
//! renderer handles the page bottom itself: tables repeat their header row,
//! code boxes close and reopen, wrapped text moves on line by line. Pages a
//! section spills onto get the section heading stamped again at the top.
//!
//! ## Architecture
//!
//! ```text
//! Note (title, summary, markdown)
//!       ↓
//!   [preprocess] : Resolve stored images, flatten wiki links
//!       ↓
//!   [markdown]   : Sections, block runs, inline spans, image tags
//!       ↓
//!   [text]       : Measure and wrap styled spans
//!       ↓
//!   [layout]     : Estimate, flow and paint onto pages
//!       ↓
//!   [pdf]        : Serialize to PDF bytes
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod links;
pub mod markdown;
pub mod model;
pub mod pdf;
pub mod preprocess;
pub mod text;

pub use config::ExportOptions;
pub use error::{Error, ExportError};
pub use export::{export_to_pdf, slugify_file_name, ExportedDocument};
pub use layout::{layout_note, NoteLayout};
pub use model::{FontPreference, Note};
pub use preprocess::{DirectoryImageStore, ImageStore, MemoryImageStore, NoImageStore};
