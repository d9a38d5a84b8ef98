//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use blotter_static::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let build_config = BuildConfig {
        posts_dir: config.posts_dir(),
        index_file: config.site.index.clone(),
        output_dir: output.unwrap_or_else(|| config.output_dir()),
        minify: minify.unwrap_or(config.build.minify),
        base_url: config.site.base_url.clone(),
        title: config.site.title.clone(),
    };

    let result = StaticBuilder::new(build_config).build().await?;

    if result.skipped > 0 {
        tracing::warn!("Skipped {} posts with unreadable markdown", result.skipped);
    }

    tracing::info!("Built {} posts in {}ms", result.posts, result.duration_ms);

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use crate::config::load_config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn builds_after_init_with_nested_config() {
        let temp = tempdir().unwrap();
        let site = temp.path().join("site");
        std::fs::create_dir_all(&site).unwrap();
        let config_path = site.join("blotter.toml");

        init::run(&config_path, false).await.unwrap();
        let config = load_config(&config_path).unwrap();
        run(&config, None, Some(false)).await.unwrap();

        assert!(site.join("posts/postList.txt").exists());
        assert!(site.join("dist/index.html").exists());
        assert!(site.join("dist/post/0/index.html").exists());
    }
}
