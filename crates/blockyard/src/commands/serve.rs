//! Serves a built catalog from its output directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use blockyard_server::mount_path;
use tower_http::services::ServeDir;

use crate::config::ConfigFile;

/// Router serving `dir` at the path of the configured base URL.
fn site_router(dir: &Path, base_url: &str) -> Router {
    let files = ServeDir::new(dir);

    match mount_path(base_url).trim_end_matches('/') {
        "" => Router::new().fallback_service(files),
        prefix => Router::new().nest_service(prefix, files),
    }
}

/// Run the serve command. `dir` defaults to `site.output`.
pub async fn run(file: &ConfigFile, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&file.site.output));
    if !dir.join("index.html").exists() {
        anyhow::bail!(
            "No built catalog in {}. Run 'blockyard build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;
    let mount = mount_path(&file.site.base_url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Serving {} at http://{}{}", dir.display(), addr, mount);
    let _ = open::that(format!("http://{}{}", addr, mount));

    axum::serve(listener, site_router(&dir, &file.site.base_url)).await?;

    Ok(())
}
