//! Preview server command.

use anyhow::Result;
use blockyard_server::{DevServer, DevServerConfig};

use crate::config::ConfigFile;

fn server_config(file: &ConfigFile, port: u16, open: bool) -> DevServerConfig {
    DevServerConfig {
        manifest_path: file.manifest_path(),
        blocks_dir: file.blocks_dir(),
        title: file.site.title.clone(),
        base_url: file.site.base_url.clone(),
        styles: file.site.styles.clone(),
        port,
        open,
        ..Default::default()
    }
}

/// Run the preview server.
pub async fn run(file: &ConfigFile, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting preview server on port {}", port);

    DevServer::new(server_config(file, port, open)).start().await?;

    Ok(())
}
