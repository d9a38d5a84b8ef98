//! Markdown subset parser for blotter posts.
//!
//! This crate turns post markdown into a flat sequence of typed blocks
//! (headings, rules, paragraphs), strips lines down to plain text for
//! previews, and models the post index that lists a blog's posts.

pub mod block;
pub mod parser;
pub mod post;
pub mod preview;
pub mod strip;

pub use block::{Block, Inline, LINE_BREAK, MAX_HEADING_LEVEL};
pub use parser::parse_blocks;
pub use post::{IndexError, PostDetail, PostEntry, PostIndex, PostSummary};
pub use preview::{preview, Preview, PREVIEW_LINES};
pub use strip::{strip_all, strip_line};
