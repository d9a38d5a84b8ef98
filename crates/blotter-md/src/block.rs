//! Block and inline node types produced by the parser.

use serde::Serialize;

/// Marker used when a paragraph is flattened back to a single string.
pub const LINE_BREAK: &str = "<br/>";

/// Deepest heading level; longer `#` runs collapse to this.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// One structural unit of a rendered post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Horizontal separator
    Rule,

    /// Heading with level 1-6
    Heading { level: u8, text: String },

    /// Run of consecutive text lines
    Paragraph { inlines: Vec<Inline> },
}

/// Content of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Inline {
    /// Literal text, rendered as-is
    Text(String),

    /// Explicit break between two source lines of one paragraph
    LineBreak,
}

impl Inline {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl Block {
    /// Create a heading, clamping the level into 1-6.
    pub fn heading(level: usize, text: impl Into<String>) -> Self {
        let level = level.clamp(1, MAX_HEADING_LEVEL as usize) as u8;
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a paragraph holding a single line.
    pub fn paragraph(line: impl Into<String>) -> Self {
        Self::Paragraph {
            inlines: vec![Inline::text(line)],
        }
    }

    /// Flatten the block's text, joining paragraph lines with [`LINE_BREAK`].
    ///
    /// Rules have no text and return an empty string.
    pub fn text(&self) -> String {
        match self {
            Self::Rule => String::new(),
            Self::Heading { text, .. } => text.clone(),
            Self::Paragraph { inlines } => inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Text(text) => text.as_str(),
                    Inline::LineBreak => LINE_BREAK,
                })
                .collect(),
        }
    }
}
