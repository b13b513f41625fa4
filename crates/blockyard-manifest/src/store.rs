//! Manifest loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Manifest;

/// Serialization format of a manifest document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Pick a format from a file extension. Anything but `yaml`/`yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read manifest {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unknown block: {0}")]
    UnknownBlock(String),
}

/// Reads the manifest document from a fixed location.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the manifest document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the manifest.
    ///
    /// A parse failure anywhere in the document fails the whole load.
    pub fn load(&self) -> Result<Manifest, ManifestError> {
        if !self.path.exists() {
            return Err(ManifestError::NotFound(self.path.clone()));
        }

        let source = fs::read_to_string(&self.path).map_err(|e| ManifestError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let manifest =
            parse_manifest(&source, ManifestFormat::from_path(&self.path)).map_err(|e| match e {
                ManifestError::Parse { message, .. } => ManifestError::Parse {
                    path: self.path.clone(),
                    message,
                },
                other => other,
            })?;

        tracing::debug!(
            "Loaded manifest {}: {} modules, {} design systems, {} blocks",
            self.path.display(),
            manifest.modules.len(),
            manifest.design_systems.len(),
            manifest.blocks.len()
        );

        Ok(manifest)
    }
}

/// Parse a manifest document held in memory.
pub fn parse_manifest(source: &str, format: ManifestFormat) -> Result<Manifest, ManifestError> {
    let parsed = match format {
        ManifestFormat::Json => serde_json::from_str(source).map_err(|e| e.to_string()),
        ManifestFormat::Yaml => serde_yaml::from_str(source).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| ManifestError::Parse {
        path: PathBuf::new(),
        message,
    })
}
