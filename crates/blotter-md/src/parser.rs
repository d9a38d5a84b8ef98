//! Line-oriented block parser.

use crate::block::{Block, Inline};

/// Where the parser is between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Next text line opens a new paragraph
    Idle,
    /// Next text line continues the last block, which is a paragraph
    InParagraph,
}

/// Parse a markdown document into a sequence of blocks.
///
/// Accepts any input. Lines that are not rules, blanks or headings become
/// paragraph text, so the result never has more blocks than the document
/// has lines.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ParseState::Idle;

    for line in lines(markdown) {
        if is_rule(line) {
            blocks.push(Block::Rule);
            state = ParseState::Idle;
        } else if line.is_empty() {
            // Blank lines only matter when they close a paragraph
            state = ParseState::Idle;
        } else if line.starts_with('#') {
            blocks.push(parse_heading(line));
            state = ParseState::Idle;
        } else {
            match (state, blocks.last_mut()) {
                (ParseState::InParagraph, Some(Block::Paragraph { inlines })) => {
                    inlines.push(Inline::LineBreak);
                    inlines.push(Inline::text(line));
                }
                _ => {
                    blocks.push(Block::paragraph(line));
                    state = ParseState::InParagraph;
                }
            }
        }
    }

    blocks
}

/// Split on line feeds, tolerating CRLF endings.
pub(crate) fn lines(markdown: &str) -> impl Iterator<Item = &str> {
    markdown
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// A rule is any three of `-`, `_`, `*` at the very start of the line.
fn is_rule(line: &str) -> bool {
    let mut chars = line.chars();
    (0..3).all(|_| matches!(chars.next(), Some('-' | '_' | '*')))
}

fn parse_heading(line: &str) -> Block {
    let hashes = line.len() - line.trim_start_matches('#').len();
    let rest = &line[hashes..];

    let text = match rest.chars().next() {
        Some(c) if c.is_whitespace() => &rest[c.len_utf8()..],
        _ => line,
    };

    Block::heading(hashes, text)
}
