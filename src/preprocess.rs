//! Pre-processing of note markdown before layout.
//!
//! Notes reference stored images as `cornell-image://<id>`. Those references
//! are swapped for inline data URIs fetched from an [`ImageStore`], and
//! `[[wiki links]]` lose their brackets so they print as plain text.
//!
//! A reference the store cannot resolve is left untouched; the layout pass
//! later skips it with a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::Engine;
use regex::{Captures, Regex};

use crate::error::Result;

pub const IMAGE_SCHEME: &str = "cornell-image://";

/// Content-addressed image storage.
pub trait ImageStore {
    /// The stored image for `id` as a data URI, or `None` when absent.
    fn get_image(&self, id: &str) -> Result<Option<String>>;
}

/// A store that never has anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageStore;

impl ImageStore for NoImageStore {
    fn get_image(&self, _id: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Images held in memory, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct MemoryImageStore {
    images: HashMap<String, String>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, data_uri: impl Into<String>) {
        self.images.insert(id.into(), data_uri.into());
    }
}

impl ImageStore for MemoryImageStore {
    fn get_image(&self, id: &str) -> Result<Option<String>> {
        Ok(self.images.get(id).cloned())
    }
}

/// Images stored as files named by id under one directory. A file may hold
/// a data URI as text or the raw image bytes.
#[derive(Debug, Clone)]
pub struct DirectoryImageStore {
    root: PathBuf,
}

impl DirectoryImageStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

impl ImageStore for DirectoryImageStore {
    fn get_image(&self, id: &str) -> Result<Option<String>> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            log::warn!("refusing image id outside the store: {}", id);
            return Ok(None);
        }
        let path = self.root.join(id);
        if !path.is_file() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)?;
        if bytes.starts_with(b"data:") {
            let text = String::from_utf8_lossy(&bytes);
            return Ok(Some(text.trim().to_string()));
        }
        match sniff_mime(&bytes) {
            Some(mime) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                Ok(Some(format!("data:{};base64,{}", mime, encoded)))
            }
            None => {
                log::warn!("stored image {} is not a recognized format", id);
                Ok(None)
            }
        }
    }
}

fn image_reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"cornell-image://([^"')\s]+)(["')])"#).expect("valid regex"))
}

fn wiki_link_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid regex"))
}

/// Resolve stored image references and strip wiki-link brackets.
///
/// Each distinct id is fetched once. A lookup that fails or finds nothing
/// leaves that reference as written.
pub fn process_content_for_export(content: &str, store: &dyn ImageStore) -> String {
    let mut resolved: HashMap<String, Option<String>> = HashMap::new();

    let with_images = image_reference_pattern().replace_all(content, |caps: &Captures| {
        let id = &caps[1];
        let data = resolved
            .entry(id.to_string())
            .or_insert_with(|| match store.get_image(id) {
                Ok(Some(data)) => Some(data),
                Ok(None) => {
                    log::warn!("image {} not found in storage", id);
                    None
                }
                Err(e) => {
                    log::warn!("error loading image {} for export: {}", id, e);
                    None
                }
            });
        match data {
            Some(data) => format!("{}{}", data, &caps[2]),
            None => caps[0].to_string(),
        }
    });

    wiki_link_pattern()
        .replace_all(&with_images, |caps: &Captures| {
            let inner = &caps[1];
            // [[Title|label]] prints its label
            match inner.split_once('|') {
                Some((_, label)) if !label.trim().is_empty() => label.trim().to_string(),
                _ => inner.to_string(),
            }
        })
        .into_owned()
}
