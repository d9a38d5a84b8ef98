//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use blotter_md::{IndexError, PostIndex, PostSummary};

use crate::assets::AssetPipeline;
use crate::templates::{Context, TemplateEngine};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding the post index and markdown files
    pub posts_dir: PathBuf,

    /// Post index file name, inside `posts_dir`
    pub index_file: String,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            index_file: "postList.txt".to_string(),
            output_dir: PathBuf::from("dist"),
            minify: true,
            base_url: "/".to_string(),
            title: "Blog".to_string(),
        }
    }
}

impl BuildConfig {
    /// Full path of the post index.
    pub fn index_path(&self) -> PathBuf {
        self.posts_dir.join(&self.index_file)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of post pages generated
    pub posts: usize,

    /// Index entries whose markdown could not be read
    pub skipped: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read posts directory: {0}")]
    ReadError(String),

    #[error(transparent)]
    IndexError(#[from] IndexError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Markdown of one post that made it off disk.
#[derive(Debug)]
struct LoadedPost {
    id: usize,
    markdown: String,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if !self.config.posts_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Posts directory not found: {}",
                self.config.posts_dir.display()
            )));
        }

        let index = PostIndex::load(&self.config.index_path())?;
        tracing::info!("Loaded {} posts from index", index.len());

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let posts = self.load_posts(&index);

        let summaries: Vec<PostSummary> = posts
            .iter()
            .filter_map(|post| index.summary(post.id, &post.markdown))
            .collect();

        self.build_list_page(&summaries)?;

        // Render detail pages in parallel
        let results: Vec<Result<(), BuildError>> = posts
            .par_iter()
            .map(|post| self.build_post_page(&index, post))
            .collect();

        for result in results {
            result?;
        }

        self.generate_assets()?;
        self.copy_sources()?;
        self.generate_search_index(&summaries)?;
        self.generate_sitemap(&summaries)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            posts: posts.len(),
            skipped: index.len() - posts.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Read every post's markdown, keeping index order.
    ///
    /// Posts that cannot be read are logged and left out.
    fn load_posts(&self, index: &PostIndex) -> Vec<LoadedPost> {
        let entries: Vec<_> = index.iter().collect();

        entries
            .par_iter()
            .filter_map(|(id, entry)| {
                let path = match entry.resolve(&self.config.posts_dir) {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!("Skipping post {} ({}): {}", id, entry.title, e);
                        return None;
                    }
                };

                match fs::read_to_string(&path) {
                    Ok(markdown) => Some(LoadedPost { id: *id, markdown }),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping post {} ({}): {}: {}",
                            id,
                            entry.title,
                            path.display(),
                            e
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn site_context(&self) -> Context {
        Context {
            site_title: self.config.title.clone(),
            base_url: self.config.base_url.clone(),
            ..Default::default()
        }
    }

    /// Write the list view.
    fn build_list_page(&self, summaries: &[PostSummary]) -> Result<(), BuildError> {
        let html = self
            .templates
            .render_list(&self.site_context(), summaries.to_vec())
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(self.config.output_dir.join("index.html"), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Write the detail view of a single post.
    fn build_post_page(&self, index: &PostIndex, post: &LoadedPost) -> Result<(), BuildError> {
        let Some(detail) = index.detail(post.id, &post.markdown) else {
            return Ok(());
        };

        tracing::debug!("Rendering post {} with {} blocks", post.id, detail.blocks.len());

        let html = self
            .templates
            .render_post(&self.site_context(), detail)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let output_path = self.post_output_path(post.id);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// dist/post/{id}/index.html
    fn post_output_path(&self, id: usize) -> PathBuf {
        self.config
            .output_dir
            .join("post")
            .join(id.to_string())
            .join("index.html")
    }

    fn post_url(&self, id: usize) -> String {
        format!("{}post/{}/", self.config.base_url, id)
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Falling back to unminified CSS: {}", e);
                css.clone()
            })
        } else {
            css
        };
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js();
        fs::write(assets_dir.join("main.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Copy the posts directory into the output so the index and raw
    /// markdown stay downloadable.
    fn copy_sources(&self) -> Result<(), BuildError> {
        let target_root = self.config.output_dir.join("posts");
        let output_dir = fs::canonicalize(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        let mut copied = 0;

        // The output may live inside the posts directory; never copy it into itself.
        for entry in WalkDir::new(&self.config.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                fs::canonicalize(e.path())
                    .map(|p| !p.starts_with(&output_dir))
                    .unwrap_or(true)
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.config.posts_dir).unwrap_or(path);
            let target = target_root.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }

            fs::copy(path, &target).map_err(|e| {
                BuildError::WriteError(format!("{} -> {}: {}", path.display(), target.display(), e))
            })?;
            copied += 1;
        }

        tracing::debug!("Copied {} source files", copied);

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, summaries: &[PostSummary]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = summaries
            .iter()
            .map(|summary| {
                serde_json::json!({
                    "title": summary.title,
                    "date": summary.date,
                    "url": self.post_url(summary.id),
                    "preview": summary.preview.to_plain_text(),
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("search-index.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, summaries: &[PostSummary]) -> Result<(), BuildError> {
        let mut urls = vec![self.config.base_url.clone()];
        urls.extend(summaries.iter().map(|s| self.post_url(s.id)));

        let entries: Vec<String> = urls
            .iter()
            .map(|url| format!("  <url>\n    <loc>{}</loc>\n  </url>", url))
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            entries.join("\n")
        );

        fs::write(self.config.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Also generate robots.txt
        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.config.base_url
        );
        fs::write(self.config.output_dir.join("robots.txt"), robots)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Write a starter index and post pair into `posts_dir` if no index exists.
///
/// Returns whether anything was written.
pub fn write_sample_posts(posts_dir: &Path, index_file: &str) -> std::io::Result<bool> {
    let index_path = posts_dir.join(index_file);
    if index_path.exists() {
        return Ok(false);
    }

    fs::create_dir_all(posts_dir)?;
    fs::write(&index_path, SAMPLE_INDEX)?;
    fs::write(posts_dir.join("hello-world.md"), SAMPLE_POST)?;

    Ok(true)
}

const SAMPLE_INDEX: &str = r#"[
    {
        "title": "Hello, world",
        "date": "1 January 2024",
        "link": "hello-world.md"
    }
]
"#;

const SAMPLE_POST: &str = r#"Welcome to your new blog.
Posts are plain markdown files listed in postList.txt.
Only the first three lines show up in the preview.

# Writing posts

Consecutive lines join into one paragraph,
with a line break between them.

A blank line starts a new paragraph.

---

## Headings and rules

Use # through ###### for headings and --- for a horizontal rule.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_posts(root: &Path) -> PathBuf {
        let posts = root.join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("postList.txt"),
            r#"[
                { "title": "First", "date": "Monday", "link": "first.md" },
                { "title": "Gone", "date": "Tuesday", "link": "missing.md" },
                { "title": "Third", "date": "Wednesday", "link": "third.md" }
            ]"#,
        )
        .unwrap();
        fs::write(posts.join("first.md"), "# First post\nHello *there*\n\nBody").unwrap();
        fs::write(posts.join("third.md"), "Short").unwrap();
        posts
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let temp = tempdir().unwrap();
        let posts = write_posts(temp.path());
        let out = temp.path().join("dist");

        let builder = StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: out.clone(),
            ..Default::default()
        });
        let result = builder.build().await.unwrap();

        assert_eq!(result.posts, 2);
        assert_eq!(result.skipped, 1);
        assert!(out.join("index.html").exists());
        assert!(out.join("post/0/index.html").exists());
        assert!(!out.join("post/1/index.html").exists());
        assert!(out.join("post/2/index.html").exists());
        assert!(out.join("assets/main.css").exists());
        assert!(out.join("assets/main.js").exists());
    }

    #[tokio::test]
    async fn list_page_keeps_index_order_and_previews() {
        let temp = tempdir().unwrap();
        let posts = write_posts(temp.path());
        let out = temp.path().join("dist");

        StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let list = fs::read_to_string(out.join("index.html")).unwrap();
        let first = list.find("First").unwrap();
        let third = list.find("Third").unwrap();
        assert!(first < third);
        assert!(!list.contains("Gone"));
        assert!(list.contains("<p>First post</p><p>Hello there</p><p></p>"));
        assert!(list.contains("<p>Short</p><p></p><p></p>"));

        let post = fs::read_to_string(out.join("post/0/index.html")).unwrap();
        assert!(post.contains("<h1>First post</h1>"));
        assert!(post.contains("<p>Hello *there*</p>"));
        assert!(post.contains("<p>Body</p>"));
    }

    #[tokio::test]
    async fn generates_search_index() {
        let temp = tempdir().unwrap();
        let posts = write_posts(temp.path());
        let out = temp.path().join("dist");

        StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let index = fs::read_to_string(out.join("search-index.json")).unwrap();
        let index: serde_json::Value = serde_json::from_str(&index).unwrap();
        let entries = index.as_array().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["title"], "First");
        assert_eq!(entries[0]["url"], "/post/0/");
        assert_eq!(entries[0]["preview"], "First post Hello there");
        assert_eq!(entries[1]["url"], "/post/2/");

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>/post/2/</loc>"));
    }

    #[tokio::test]
    async fn copies_post_sources() {
        let temp = tempdir().unwrap();
        let posts = write_posts(temp.path());
        fs::create_dir_all(posts.join("img")).unwrap();
        fs::write(posts.join("img/cat.txt"), "meow").unwrap();
        let out = temp.path().join("dist");

        StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        assert!(out.join("posts/postList.txt").exists());
        assert!(out.join("posts/first.md").exists());
        assert_eq!(fs::read_to_string(out.join("posts/img/cat.txt")).unwrap(), "meow");
    }

    #[tokio::test]
    async fn output_inside_posts_dir_is_not_copied() {
        let temp = tempdir().unwrap();
        let posts = write_posts(temp.path());
        let out = posts.join("dist");

        let builder = StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: out.clone(),
            ..Default::default()
        });
        builder.build().await.unwrap();
        builder.build().await.unwrap();

        assert!(out.join("posts/first.md").exists());
        assert!(!out.join("posts/dist").exists());
    }

    #[tokio::test]
    async fn errors_without_index() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");
        fs::create_dir_all(&posts).unwrap();

        let result = StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await;

        assert!(matches!(
            result,
            Err(BuildError::IndexError(IndexError::Read(_)))
        ));
    }

    #[tokio::test]
    async fn errors_without_posts_dir() {
        let temp = tempdir().unwrap();

        let result = StaticBuilder::new(BuildConfig {
            posts_dir: temp.path().join("nope"),
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await;

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }

    #[tokio::test]
    async fn sample_posts_build() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("posts");

        assert!(write_sample_posts(&posts, "postList.txt").unwrap());
        assert!(!write_sample_posts(&posts, "postList.txt").unwrap());

        let result = StaticBuilder::new(BuildConfig {
            posts_dir: posts,
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        assert_eq!(result.posts, 1);
        assert_eq!(result.skipped, 0);
    }
}
