//! Post index and per-post views.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::parser::parse_blocks;
use crate::preview::{preview, Preview};

/// One record of the post index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostEntry {
    /// Post title
    pub title: String,

    /// Display date, shown verbatim
    pub date: String,

    /// Markdown file, relative to the posts directory
    pub link: String,
}

impl PostEntry {
    /// Resolve the entry's markdown file inside `posts_dir`.
    ///
    /// Links must stay inside the posts directory.
    pub fn resolve(&self, posts_dir: &Path) -> Result<PathBuf, IndexError> {
        let link = Path::new(&self.link);

        let escapes = link
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if self.link.is_empty() || escapes {
            return Err(IndexError::InvalidLink(self.link.clone()));
        }

        Ok(posts_dir.join(link))
    }
}

/// Ordered list of posts. A post's id is its position in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PostIndex {
    entries: Vec<PostEntry>,
}

/// What a list-view card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: usize,
    pub title: String,
    pub date: String,
    pub preview: Preview,
}

/// What the detail view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub id: usize,
    pub title: String,
    pub date: String,
    pub blocks: Vec<Block>,
}

impl PostIndex {
    /// Parse an index from its JSON form: an array of
    /// `{ "title", "date", "link" }` records.
    pub fn from_json(source: &str) -> Result<Self, IndexError> {
        serde_json::from_str(source).map_err(|e| IndexError::Json(e.to_string()))
    }

    /// Read and parse an index file.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| IndexError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&source)
    }

    pub fn get(&self, id: usize) -> Option<&PostEntry> {
        self.entries.get(id)
    }

    /// Iterate `(id, entry)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PostEntry)> {
        self.entries.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the list-view card for post `id` from its markdown.
    pub fn summary(&self, id: usize, markdown: &str) -> Option<PostSummary> {
        let entry = self.get(id)?;
        Some(PostSummary {
            id,
            title: entry.title.clone(),
            date: entry.date.clone(),
            preview: preview(markdown),
        })
    }

    /// Build the detail view for post `id` from its markdown.
    pub fn detail(&self, id: usize, markdown: &str) -> Option<PostDetail> {
        let entry = self.get(id)?;
        Some(PostDetail {
            id,
            title: entry.title.clone(),
            date: entry.date.clone(),
            blocks: parse_blocks(markdown),
        })
    }
}

/// Errors that can occur when loading the post index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Failed to read post index: {0}")]
    Read(String),

    #[error("Invalid post index JSON: {0}")]
    Json(String),

    #[error("Post link must be a relative path inside the posts directory: {0:?}")]
    InvalidLink(String),
}
