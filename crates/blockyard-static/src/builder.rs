//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use blockyard_manifest::{
    category_routes, is_safe_segment, section_routes, CategoryRoute, Manifest, ManifestError,
    ManifestStore, SectionRoute,
};

use crate::assets::AssetPipeline;
use crate::paths::{escape_xml, output_dir, stylesheet_name, stylesheet_url, url_path};
use crate::site::{SiteConfig, SiteRenderer};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Manifest document
    pub manifest_path: PathBuf,

    /// Root that block files (and `public/`) are read from
    pub blocks_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,

    /// Emit `r/{name}.json` for every block
    pub registry_items: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("registry.json"),
            blocks_dir: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            minify: true,
            base_url: "/".to_string(),
            title: "Blocks".to_string(),
            styles: vec![],
            registry_items: true,
        }
    }
}

impl BuildConfig {
    /// Renderer settings derived from this build configuration.
    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            title: self.title.clone(),
            base_url: self.base_url.clone(),
            styles: self
                .styles
                .iter()
                .map(|s| stylesheet_url(&self.base_url, s))
                .collect(),
            registry_items: self.registry_items,
            blocks_dir: self.blocks_dir.clone(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of blocks in the manifest
    pub blocks: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be rendered.
#[derive(Debug, Clone)]
enum PageJob {
    Index,
    Category(CategoryRoute),
    Section(SectionRoute),
}

impl PageJob {
    fn segments(&self) -> Vec<&str> {
        match self {
            PageJob::Index => Vec::new(),
            PageJob::Category(route) => route.segments(),
            PageJob::Section(route) => route.segments(),
        }
    }

    /// Site-relative URL path.
    fn url_path(&self) -> String {
        url_path(&self.segments())
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    renderer: SiteRenderer,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let renderer = SiteRenderer::new(config.site_config());
        Self { config, renderer }
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let manifest = ManifestStore::new(&self.config.manifest_path).load()?;

        tracing::info!(
            "Loaded {} blocks in {} categories from {}",
            manifest.blocks.len(),
            manifest.modules.len(),
            self.config.manifest_path.display()
        );

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let jobs = page_jobs(&manifest);

        // Render and write pages in parallel
        let results: Vec<Result<(), BuildError>> = jobs
            .par_iter()
            .map(|job| self.build_page(&manifest, job))
            .collect();

        for result in results {
            result?;
        }

        self.generate_assets()?;

        if self.config.registry_items {
            self.generate_registry_items(&manifest)?;
        }

        self.copy_public_dir()?;
        self.generate_search_index(&manifest)?;
        self.generate_sitemap(&jobs)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: jobs.len(),
            blocks: manifest.blocks.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Render one page and write it to `{path}/index.html`.
    fn build_page(&self, manifest: &Manifest, job: &PageJob) -> Result<(), BuildError> {
        let html = match job {
            PageJob::Index => self.renderer.render_index(manifest, &[]),
            PageJob::Category(route) => self.renderer.render_category(manifest, &route.name, &[]),
            PageJob::Section(route) => {
                self.renderer
                    .render_section(manifest, &route.category, &route.section, &[])
            }
        }
        .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let output_path = output_dir(&self.config.output_dir, &job.segments())
            .ok_or_else(|| BuildError::WriteError(format!("Unsafe output path for {:?}", job)))?
            .join("index.html");
        write_file(&output_path, html)?;

        tracing::debug!("Wrote {}", output_path.display());
        Ok(())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");

        write_file(&assets_dir.join("main.css"), AssetPipeline::css(self.config.minify))?;
        write_file(&assets_dir.join("main.js"), AssetPipeline::generate_js())?;

        // Copy configured stylesheets
        for style_path in &self.config.styles {
            let source_path = PathBuf::from(style_path);
            if source_path.exists() {
                let content = fs::read_to_string(&source_path).map_err(|e| {
                    BuildError::ReadError(format!("Failed to read stylesheet: {}", e))
                })?;
                write_file(&assets_dir.join(stylesheet_name(style_path)), content)?;
                tracing::info!("Copied stylesheet from {}", style_path);
            } else {
                tracing::warn!("Stylesheet not found: {}", style_path);
            }
        }

        Ok(())
    }

    /// Write `r/{name}.json` for every block.
    fn generate_registry_items(&self, manifest: &Manifest) -> Result<(), BuildError> {
        let dir = self.config.output_dir.join("r");

        manifest.blocks.par_iter().try_for_each(|block| {
            let file_name = format!("{}.json", block.name);
            let Some(path) = output_dir(&dir, &[file_name.as_str()]) else {
                tracing::warn!("Skipping registry item {:?}: not a safe file name", block.name);
                return Ok(());
            };

            let item = self.renderer.registry_item(manifest, &block.name)?;
            let json = serde_json::to_string_pretty(&item)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
            write_file(&path, json)
        })
    }

    /// Copy `{blocks_dir}/public` into the output root, if present.
    fn copy_public_dir(&self) -> Result<(), BuildError> {
        let public = self.config.blocks_dir.join("public");
        if !public.is_dir() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(&public)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&public).unwrap_or(path);
            let target = self.config.output_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(path, &target)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))?;
            copied += 1;
        }

        tracing::info!("Copied {} public files", copied);
        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, manifest: &Manifest) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = manifest
            .blocks
            .iter()
            .filter(|b| !b.module_name.is_empty() && !b.section_name.is_empty())
            .filter_map(|block| {
                let route = SectionRoute {
                    category: block.module_name.to_lowercase(),
                    section: blockyard_manifest::normalize_section_key(&block.section_name),
                };
                if !route.segments().iter().all(|s| is_safe_segment(s)) {
                    return None;
                }

                let title = if block.template_name.is_empty() {
                    &block.name
                } else {
                    &block.template_name
                };

                Some(serde_json::json!({
                    "name": block.name,
                    "title": title,
                    "description": block.description.clone().unwrap_or_default(),
                    "category": route.category,
                    "section": block.section_name,
                    "url": format!(
                        "{}{}#{}",
                        self.config.base_url,
                        url_path(&route.segments()),
                        urlencoding::encode(&block.name)
                    ),
                }))
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        write_file(&self.config.output_dir.join("search-index.json"), json)
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, jobs: &[PageJob]) -> Result<(), BuildError> {
        let urls: Vec<String> = jobs
            .iter()
            .map(|job| {
                let loc = format!("{}{}", self.config.base_url, job.url_path());
                format!("  <url>\n    <loc>{}</loc>\n  </url>", escape_xml(&loc))
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        write_file(&self.config.output_dir.join("sitemap.xml"), sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.config.base_url
        );
        write_file(&self.config.output_dir.join("robots.txt"), robots)
    }
}

/// Every page the site consists of: index, categories, then sections.
///
/// Routes whose names cannot be written as a directory under the output root
/// are logged and left out.
fn page_jobs(manifest: &Manifest) -> Vec<PageJob> {
    std::iter::once(PageJob::Index)
        .chain(category_routes(manifest).into_iter().map(PageJob::Category))
        .chain(section_routes(manifest).into_iter().map(PageJob::Section))
        .filter(|job| {
            let safe = job.segments().iter().all(|s| is_safe_segment(s));
            if !safe {
                tracing::warn!("Skipping {:?}: name is not a safe output path", job);
            }
            safe
        })
        .collect()
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}
