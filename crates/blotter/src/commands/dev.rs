//! Development server command.

use anyhow::Result;
use blotter_server::{DevServer, DevServerConfig};

use crate::config::ConfigFile;

/// Run the dev server.
pub async fn run(config: &ConfigFile, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let server_config = DevServerConfig {
        posts_dir: config.posts_dir(),
        index_file: config.site.index.clone(),
        title: config.site.title.clone(),
        port,
        open,
        ..Default::default()
    };

    DevServer::new(server_config).start().await?;

    Ok(())
}
