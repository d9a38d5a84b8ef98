//! Fixed three-line plain-text previews.

use serde::Serialize;

use crate::parser::lines;
use crate::strip::strip_line;

/// Number of source lines shown in a preview.
pub const PREVIEW_LINES: usize = 3;

/// Plain-text excerpt of the first lines of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub lines: [String; PREVIEW_LINES],
}

impl Preview {
    /// Join the lines into one string, skipping empty ones.
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build a preview from the first three lines of a document.
///
/// Lines are taken as they come: blank lines, headings and rules all count.
/// A document shorter than three lines is padded with empty strings.
pub fn preview(markdown: &str) -> Preview {
    let mut source = lines(markdown);
    Preview {
        lines: std::array::from_fn(|_| strip_line(source.next())),
    }
}
