//! Configuration file (blockyard.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_blocks_dir")]
    pub blocks_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Paths to CSS stylesheets to include
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_true")]
    pub minify: bool,
    #[serde(default = "default_true")]
    pub registry_items: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            blocks_dir: default_blocks_dir(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            title: default_title(),
            base_url: default_base_url(),
            styles: Vec::new(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: true,
            registry_items: true,
        }
    }
}

fn default_manifest() -> String {
    "registry.json".to_string()
}
fn default_blocks_dir() -> String {
    ".".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Blocks".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_true() -> bool {
    true
}

impl ConfigFile {
    pub fn manifest_path(&self) -> PathBuf {
        PathBuf::from(&self.registry.manifest)
    }

    pub fn blocks_dir(&self) -> PathBuf {
        PathBuf::from(&self.registry.blocks_dir)
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
