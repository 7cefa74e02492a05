//! # Export Pipeline
//!
//! ```text
//! Note ──► preprocess (images, wiki links) ──► layout ──► PDF bytes
//!   │                                            ▲
//!   └──► related note titles ────────────────────┘
//! ```
//!
//! Links are collected from the markdown as written, before pre-processing
//! turns `[[Title]]` into plain text.

use std::path::{Path, PathBuf};

use crate::config::ExportOptions;
use crate::error::{ExportError, Result};
use crate::font::FontContext;
use crate::layout::LayoutEngine;
use crate::links::extract_note_links;
use crate::model::{FontSettings, Note};
use crate::pdf::{Metadata, PdfWriter};
use crate::preprocess::{process_content_for_export, ImageStore};

const UNTITLED: &str = "untitled";

/// A finished PDF ready to be saved or streamed.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// Suggested file name, `<slug>.pdf`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl ExportedDocument {
    /// Write the document into `dir` under its file name.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `"My Note Title"` → `"my-note-title.pdf"`.
pub fn slugify_file_name(title: &str) -> String {
    let slug = title.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    if slug.is_empty() {
        format!("{}.pdf", UNTITLED)
    } else {
        format!("{}.pdf", slug)
    }
}

/// Render `note` to a Cornell-style PDF.
///
/// Missing images and unavailable fonts degrade in place; only a failure of
/// the pipeline as a whole is returned, wrapped in [`ExportError`].
pub fn export_to_pdf(
    note: &Note,
    options: &ExportOptions,
    store: &dyn ImageStore,
) -> std::result::Result<ExportedDocument, ExportError> {
    match run_export(note, options, store) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            log::error!("error generating PDF for '{}': {}", note.title, e);
            Err(ExportError::from(e))
        }
    }
}

fn run_export(note: &Note, options: &ExportOptions, store: &dyn ImageStore) -> Result<ExportedDocument> {
    let related = extract_note_links(&note.markdown);
    let processed = Note {
        markdown: process_content_for_export(&note.markdown, store),
        ..note.clone()
    };

    let fonts = FontContext::new();
    let settings = FontSettings::for_preference(options.font);
    let layout = LayoutEngine::new(&fonts, settings, options.page).layout(&processed, &related);
    log::debug!(
        "laid out '{}': {} sections on {} pages",
        note.title,
        layout.boundaries.len(),
        layout.page_count()
    );

    let metadata = Metadata {
        title: Some(note.title.clone()),
        author: options.author.clone(),
    };
    let bytes = PdfWriter::new().write(&layout.pages, &metadata)?;

    Ok(ExportedDocument {
        file_name: slugify_file_name(&note.title),
        bytes,
        page_count: layout.page_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::NoImageStore;

    #[test]
    fn slug_rules() {
        assert_eq!(slugify_file_name("My Note Title"), "my-note-title.pdf");
        assert_eq!(slugify_file_name("  Cell   Biology\t101 "), "cell-biology-101.pdf");
        assert_eq!(slugify_file_name("Ünïcode Notes"), "ünïcode-notes.pdf");
        assert_eq!(slugify_file_name("   "), "untitled.pdf");
    }

    #[test]
    fn exports_a_simple_note() {
        let note = Note::new("Test", "", "# Heading\nSome *italic* and **bold** text.");
        let doc = export_to_pdf(&note, &ExportOptions::default(), &NoImageStore).unwrap();
        assert_eq!(doc.file_name, "test.pdf");
        assert_eq!(doc.page_count, 1);
        assert!(doc.bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportedDocument {
            file_name: "a.pdf".to_string(),
            bytes: b"%PDF-1.7".to_vec(),
            page_count: 1,
        };
        let path = doc.save_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("a.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.7");
    }
}
