//! Configuration file (blotter.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub build: BuildSettings,
    /// Directory holding the config file. Relative site paths resolve against it.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_posts_dir")]
    pub posts: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            posts: default_posts_dir(),
            index: default_index(),
            output: default_output(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

fn default_title() -> String {
    "My Blog".to_string()
}
fn default_posts_dir() -> String {
    "posts".to_string()
}
fn default_index() -> String {
    "postList.txt".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(&self.site.posts)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.site.output)
    }
}

/// Load configuration from `path` if it exists.
///
/// Returns defaults when the file is missing and an error when it exists
/// but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile {
            root,
            ..Default::default()
        });
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config.root = root;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Default contents written by `blotter init`.
pub const DEFAULT_CONFIG: &str = r#"# blotter configuration

[site]
# Site title
title = "My Blog"

# Directory holding the post index and markdown files
posts = "posts"

# Post index file, inside the posts directory
index = "postList.txt"

# Output directory for built site
output = "dist"

# Base URL (for deployment)
base_url = "/"

[build]
# Minify CSS
minify = true
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load_config(&temp.path().join("blotter.toml")).unwrap();

        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.index, "postList.txt");
        assert!(config.build.minify);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("blotter.toml");
        fs::write(&path, "[site]\ntitle = \"Notes\"\n\n[build]\nminify = false\n").unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.site.posts, "posts");
        assert_eq!(config.site.output, "dist");
        assert!(!config.build.minify);
    }

    #[test]
    fn default_config_parses() {
        let config: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();

        assert_eq!(config.posts_dir(), PathBuf::from("posts"));
        assert_eq!(config.site.base_url, "/");
    }

    #[test]
    fn site_paths_resolve_against_config_dir() {
        let temp = tempdir().unwrap();
        let site = temp.path().join("site");
        fs::create_dir_all(&site).unwrap();
        let path = site.join("blotter.toml");
        fs::write(&path, "[site]\nposts = \"writing\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.posts_dir(), site.join("writing"));
        assert_eq!(config.output_dir(), site.join("dist"));

        let missing = load_config(&temp.path().join("other/blotter.toml")).unwrap();
        assert_eq!(missing.posts_dir(), temp.path().join("other/posts"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("blotter.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        assert!(load_config(&path).is_err());
    }
}
