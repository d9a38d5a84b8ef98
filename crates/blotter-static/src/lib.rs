//! Static site generator for blotter blogs.
//!
//! Renders the post list and post detail views to HTML and writes them out
//! alongside the site assets.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{write_sample_posts, BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use templates::{Context, TemplateEngine};
