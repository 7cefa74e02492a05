//! Image references embedded in section content.
//!
//! Notes carry images either as HTML `<img src=".." alt="..">` tags or as
//! markdown `![alt](src)`. Images are laid out after a section's text, so the
//! text pass sees the content with every image reference removed.

use std::sync::OnceLock;

use regex::Regex;

/// One image reference, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: Option<String>,
}

fn image_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*>|!\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#)
            .expect("valid regex")
    })
}

fn attribute_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(src|alt)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn tag_attributes(tag: &str) -> (Option<String>, Option<String>) {
    let mut src = None;
    let mut alt = None;
    for caps in attribute_pattern().captures_iter(tag) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string());
        if caps[1].eq_ignore_ascii_case("src") {
            src = src.or(value);
        } else {
            alt = alt.or(value);
        }
    }
    (src, alt)
}

/// All image references with a source, in the order they appear.
pub fn extract_images(content: &str) -> Vec<ImageRef> {
    image_pattern()
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?.as_str();
            if whole.starts_with('<') {
                let (src, alt) = tag_attributes(whole);
                src.map(|src| ImageRef { src, alt })
            } else {
                let alt = caps.get(1).map(|m| m.as_str().to_string());
                let src = caps.get(2)?.as_str().to_string();
                Some(ImageRef {
                    src,
                    alt: alt.filter(|a| !a.is_empty()),
                })
            }
        })
        .collect()
}

/// Number of image tags, including ones without a usable source.
pub fn image_tag_count(content: &str) -> usize {
    image_pattern().find_iter(content).count()
}

/// `content` with every image reference removed.
pub fn strip_images(content: &str) -> String {
    image_pattern().replace_all(content, "").into_owned()
}
