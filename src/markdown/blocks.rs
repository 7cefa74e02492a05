//! Block segmentation of one section's content.
//!
//! Runs are detected by line lookahead: a table is consecutive `|...|` lines,
//! a fence opens a code run that extends to the closing fence, consecutive
//! list or quote lines form one block. Blank lines end the current run and
//! are reported as [`Segment::Blank`] so callers can account for their gap.
//!
//! Both the height estimator and the block renderers walk the output of
//! [`segment_blocks`], so an estimate can never disagree with the painter
//! about where a run begins or ends.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Block, ColumnAlign, Table};

const FENCE: &str = "```";

/// One step of a section's content: either a blank line or a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Blank,
    Block(Block),
}

fn unordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*]\s+").expect("valid regex"))
}

fn ordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+").expect("valid regex"))
}

fn heading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{2,6})\s").expect("valid regex"))
}

fn is_table_row(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

fn is_list_item(line: &str) -> bool {
    unordered_marker().is_match(line) || ordered_marker().is_match(line)
}

/// Split `content` into blank lines and typed blocks, in source order.
pub fn segment_blocks(content: &str) -> Vec<Segment> {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line = raw.trim();

        if line.is_empty() {
            segments.push(Segment::Blank);
            i += 1;
            continue;
        }

        if is_table_row(line) {
            let start = i;
            while i < lines.len() && is_table_row(lines[i].trim()) {
                i += 1;
            }
            let run: Vec<&str> = lines[start..i].iter().map(|l| l.trim()).collect();
            match parse_table(&run) {
                Some(table) => segments.push(Segment::Block(Block::Table(table))),
                None => segments.extend(
                    run.iter()
                        .map(|l| Segment::Block(Block::Paragraph(l.to_string()))),
                ),
            }
            continue;
        }

        if line.starts_with(FENCE) {
            i += 1;
            let mut code = Vec::new();
            while i < lines.len() && !lines[i].trim().starts_with(FENCE) {
                code.push(lines[i].to_string());
                i += 1;
            }
            // skip the closing fence; an unclosed fence runs to the end
            if i < lines.len() {
                i += 1;
            }
            segments.push(Segment::Block(Block::Code(code)));
            continue;
        }

        if is_list_item(line) {
            let ordered = ordered_marker().is_match(line);
            let mut items = Vec::new();
            while i < lines.len() {
                let item = lines[i].trim();
                let stripped = if let Some(m) = unordered_marker().find(item) {
                    &item[m.end()..]
                } else if let Some(m) = ordered_marker().find(item) {
                    &item[m.end()..]
                } else {
                    break;
                };
                items.push(stripped.to_string());
                i += 1;
            }
            segments.push(Segment::Block(Block::List { items, ordered }));
            continue;
        }

        if line.starts_with('>') {
            let mut quote = Vec::new();
            while i < lines.len() {
                let Some(rest) = lines[i].trim().strip_prefix('>') else {
                    break;
                };
                quote.push(rest.trim().to_string());
                i += 1;
            }
            segments.push(Segment::Block(Block::Blockquote(quote)));
            continue;
        }

        if let Some(caps) = heading_marker().captures(line) {
            let level = caps[1].len();
            let text = line[level..].trim().to_string();
            segments.push(Segment::Block(Block::Heading { level, text }));
            i += 1;
            continue;
        }

        segments.push(Segment::Block(Block::Paragraph(line.to_string())));
        i += 1;
    }

    segments
}

/// Iterate only the blocks, skipping blank lines.
pub fn blocks_of(content: &str) -> impl Iterator<Item = Block> {
    segment_blocks(content).into_iter().filter_map(|s| match s {
        Segment::Block(b) => Some(b),
        Segment::Blank => None,
    })
}

fn split_cells(row: &str) -> Vec<String> {
    let inner = row
        .strip_prefix('|')
        .and_then(|r| r.strip_suffix('|'))
        .unwrap_or(row);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// A run of pipe rows becomes a table when it has a header and a separator.
fn parse_table(run: &[&str]) -> Option<Table> {
    if run.len() < 2 {
        return None;
    }
    let header = split_cells(run[0]);
    if header.iter().all(|c| c.is_empty()) && header.len() <= 1 {
        return None;
    }
    let alignments = split_cells(run[1])
        .iter()
        .map(|c| ColumnAlign::from_separator(c))
        .collect();
    let rows = run[2..].iter().map(|r| split_cells(r)).collect();
    Some(Table {
        header,
        alignments,
        rows,
    })
}
