//! Inline formatting: `` `code` ``, `**bold**` and `*italic*`.
//!
//! Each marker kind is scanned independently over the whole line, producing
//! candidate intervals. Candidates are then resolved by priority (code beats
//! bold beats italic): a candidate overlapping any already accepted interval
//! is dropped whole. Survivors are ordered by start offset and the gaps
//! between them become plain spans.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::StyledSpan;

/// Marker kinds in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Marker {
    Code,
    Bold,
    Italic,
}

#[derive(Debug, Clone)]
struct Candidate {
    marker: Marker,
    /// Byte range of the whole match, delimiters included.
    start: usize,
    end: usize,
    /// Byte range of the styled text.
    inner_start: usize,
    inner_end: usize,
}

impl Candidate {
    fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid regex"))
}

fn bold_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"))
}

fn regex_candidates(re: &Regex, marker: Marker, text: &str, out: &mut Vec<Candidate>) {
    for caps in re.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push(Candidate {
            marker,
            start: whole.start(),
            end: whole.end(),
            inner_start: inner.start(),
            inner_end: inner.end(),
        });
    }
}

/// Single-asterisk emphasis: an opening `*` not preceded by `*`, one or more
/// non-asterisk characters, and a closing `*` not followed by `*`.
fn italic_candidates(text: &str, out: &mut Vec<Candidate>) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'*' && (i == 0 || bytes[i - 1] != b'*') {
            let close = bytes[i + 1..]
                .iter()
                .position(|&b| b == b'*')
                .map(|rel| i + 1 + rel);
            if let Some(close) = close {
                if close > i + 1 && bytes.get(close + 1) != Some(&b'*') {
                    out.push(Candidate {
                        marker: Marker::Italic,
                        start: i,
                        end: close + 1,
                        inner_start: i + 1,
                        inner_end: close,
                    });
                    i = close + 1;
                    continue;
                }
            }
        }
        i += 1;
    }
}

/// Parse one line into styled spans covering the whole input.
pub fn parse_inline(text: &str) -> Vec<StyledSpan> {
    let mut candidates = Vec::new();
    regex_candidates(code_pattern(), Marker::Code, text, &mut candidates);
    regex_candidates(bold_pattern(), Marker::Bold, text, &mut candidates);
    italic_candidates(text, &mut candidates);

    if candidates.is_empty() {
        return vec![StyledSpan::plain(text)];
    }

    candidates.sort_by_key(|c| (c.marker, c.start));
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|a| a.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|c| c.start);

    let mut spans = Vec::with_capacity(accepted.len() * 2 + 1);
    let mut cursor = 0;
    for c in &accepted {
        if c.start > cursor {
            spans.push(StyledSpan::plain(&text[cursor..c.start]));
        }
        let inner = &text[c.inner_start..c.inner_end];
        spans.push(match c.marker {
            Marker::Code => StyledSpan::code(inner),
            Marker::Bold => StyledSpan::bold(inner),
            Marker::Italic => StyledSpan::italic(inner),
        });
        cursor = c.end;
    }
    if cursor < text.len() {
        spans.push(StyledSpan::plain(&text[cursor..]));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_markers_is_one_plain_span() {
        assert_eq!(parse_inline("just words"), vec![StyledSpan::plain("just words")]);
        assert_eq!(parse_inline(""), vec![StyledSpan::plain("")]);
    }

    #[test]
    fn mixed_sentence() {
        assert_eq!(
            parse_inline("Some *italic* and **bold** text."),
            vec![
                StyledSpan::plain("Some "),
                StyledSpan::italic("italic"),
                StyledSpan::plain(" and "),
                StyledSpan::bold("bold"),
                StyledSpan::plain(" text."),
            ]
        );
    }

    #[test]
    fn code_wins_over_bold_inside_it() {
        assert_eq!(parse_inline("`a**b**`"), vec![StyledSpan::code("a**b**")]);
    }

    #[test]
    fn triple_asterisks() {
        assert_eq!(
            parse_inline("***x***"),
            vec![
                StyledSpan::plain("*"),
                StyledSpan::bold("x"),
                StyledSpan::plain("*"),
            ]
        );
    }

    #[test]
    fn adversarial_asterisks_stay_plain() {
        assert_eq!(parse_inline("*a**b*c**"), vec![StyledSpan::plain("*a**b*c**")]);
    }

    #[test]
    fn lower_priority_overlap_is_dropped_whole() {
        // italic *x `y* overlaps the code span and is discarded
        assert_eq!(
            parse_inline("*x `y* z`"),
            vec![StyledSpan::plain("*x "), StyledSpan::code("y* z")]
        );
    }

    #[test]
    fn spans_cover_input() {
        for input in ["a `b` **c** *d* e", "**bold** *it*", "`x`*y*"] {
            let spans = parse_inline(input);
            let visible: usize = spans.iter().map(|s| s.text.len()).sum();
            assert!(visible <= input.len());
            for s in &spans {
                if s.code {
                    assert!(!s.bold && !s.italic);
                }
            }
        }
    }

    #[test]
    fn non_ascii_text() {
        assert_eq!(
            parse_inline("café *thé* **süß**"),
            vec![
                StyledSpan::plain("café "),
                StyledSpan::italic("thé"),
                StyledSpan::plain(" "),
                StyledSpan::bold("süß"),
            ]
        );
    }
}
