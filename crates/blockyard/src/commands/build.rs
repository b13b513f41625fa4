//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use blockyard_static::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Merge CLI overrides over the config file.
fn build_config(file: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> BuildConfig {
    BuildConfig {
        manifest_path: file.manifest_path(),
        blocks_dir: file.blocks_dir(),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&file.site.output)),
        minify: minify.unwrap_or(file.build.minify),
        base_url: file.site.base_url.clone(),
        title: file.site.title.clone(),
        styles: file.site.styles.clone(),
        registry_items: file.build.registry_items,
    }
}

/// Run the build command.
pub async fn run(file: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let config = build_config(file, output, minify);
    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages for {} blocks in {}ms",
        result.pages,
        result.blocks,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
