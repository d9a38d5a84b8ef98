//! Initialize a blog next to the config file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use blotter_static::write_sample_posts;

use crate::config::{load_config, DEFAULT_CONFIG};

/// Run the init command.
///
/// Writes the config file (only overwriting it with `yes`) and, when the
/// posts directory has no index yet, a sample index and post. Existing
/// posts are never touched.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing blotter...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    } else {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    let config = load_config(config_path)?;
    let posts_dir = config.posts_dir();

    let written = write_sample_posts(&posts_dir, &config.site.index)
        .with_context(|| format!("Failed to write sample posts to {}", posts_dir.display()))?;

    if written {
        tracing::info!("Created {}", posts_dir.join(&config.site.index).display());
    } else {
        tracing::info!("Keeping existing posts in {}", posts_dir.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'blotter dev' to start the development server.");

    Ok(())
}
