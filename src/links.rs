//! Outbound `[[Note Title]]` references, used for the "Related Notes" list.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

fn note_link_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid regex"))
}

/// Titles of the notes `markdown` links to, first occurrence order, without
/// duplicates. For `[[Title|label]]` the title is returned.
pub fn extract_note_links(markdown: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    note_link_pattern()
        .captures_iter(markdown)
        .filter_map(|caps| {
            let inner = caps.get(1)?.as_str();
            let title = inner.split('|').next().unwrap_or(inner).trim();
            (!title.is_empty() && seen.insert(title.to_string())).then(|| title.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_and_distinct() {
        let links = extract_note_links("[[B]] then [[A]], again [[B]] and [[A|alias]]");
        assert_eq!(links, vec!["B", "A"]);
    }

    #[test]
    fn no_links() {
        assert!(extract_note_links("plain [single] brackets").is_empty());
        assert!(extract_note_links("[[ ]]").is_empty());
    }
}
