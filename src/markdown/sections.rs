//! Top-level split of a note body into Cornell sections.

use crate::model::Section;

const SECTION_MARKER: &str = "# ";

/// Split `markdown` into one [`Section`] per `# ` heading line.
///
/// Every other line belongs to the section above it. Lines before the first
/// heading have no section to belong to and are dropped, so a body without
/// any top-level heading yields no sections at all.
pub fn parse_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut preamble = 0usize;

    for line in markdown.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(heading) = line.strip_prefix(SECTION_MARKER) {
            if let Some((heading, content)) = current.take() {
                sections.push(Section {
                    heading,
                    content: content.join("\n"),
                });
            }
            current = Some((heading.to_string(), Vec::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push(line);
        } else {
            preamble += 1;
        }
    }

    if let Some((heading, content)) = current {
        sections.push(Section {
            heading,
            content: content.join("\n"),
        });
    }

    if preamble > 0 && !sections.is_empty() {
        log::debug!("dropped {} line(s) before the first section heading", preamble);
    }

    sections
}
