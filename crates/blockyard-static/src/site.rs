//! Page rendering over a loaded manifest.
//!
//! Shared by the static builder and the preview server: both hand a manifest
//! snapshot to [`SiteRenderer`] and get back HTML or registry item JSON.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use blockyard_manifest::{
    category_routes, load_category_page, load_section_page, registry_closure, BlockEntry,
    Manifest, ManifestError,
};

use crate::paths::url_path;

use crate::templates::{
    CategorySummary, Layout, NavItem, SectionSummary, TemplateCard, TemplateEngine,
};

/// Settings that affect how pages are rendered.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site title
    pub title: String,

    /// Base URL every generated link starts with
    pub base_url: String,

    /// Stylesheet URLs to link from every page
    pub styles: Vec<String>,

    /// Link each template to its `r/{name}.json` registry item
    pub registry_items: bool,

    /// Root that block file paths are relative to
    pub blocks_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blocks".to_string(),
            base_url: "/".to_string(),
            styles: vec![],
            registry_items: true,
            blocks_dir: PathBuf::from("."),
        }
    }
}

/// A block with its file contents inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub design_system: String,
    pub dependencies: Vec<String>,
    pub registry_dependencies: Vec<String>,
    pub files: Vec<RegistryFile>,
}

/// One file of a registry item.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryFile {
    pub path: String,
    pub content: String,
}

/// Renders catalog pages from a manifest snapshot.
pub struct SiteRenderer {
    config: SiteConfig,
    templates: TemplateEngine,
}

impl SiteRenderer {
    /// Create a renderer with the built-in templates.
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Renderer settings.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Absolute URL of a site-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Build the navigation tree: categories with their sections as children.
    pub fn navigation(&self, manifest: &Manifest, active_category: Option<&str>) -> Vec<NavItem> {
        category_routes(manifest)
            .into_iter()
            .map(|route| {
                let page = load_category_page(manifest, &route.name);

                let children = page
                    .sections
                    .iter()
                    .map(|section| NavItem {
                        title: section.section_name.clone(),
                        path: self.url(&url_path(&[route.name.as_str(), section.key.as_str()])),
                        children: Vec::new(),
                        active: false,
                    })
                    .collect();

                NavItem {
                    title: page.category.label.clone(),
                    path: self.url(&url_path(&route.segments())),
                    children,
                    active: active_category == Some(route.name.as_str()),
                }
            })
            .collect()
    }

    fn layout(&self, manifest: &Manifest, active: Option<&str>, scripts: &[String]) -> Layout {
        Layout {
            site_title: self.config.title.clone(),
            base_url: self.config.base_url.clone(),
            nav: self.navigation(manifest, active),
            styles: self.config.styles.clone(),
            scripts: scripts.to_vec(),
        }
    }

    /// Render the index page.
    pub fn render_index(
        &self,
        manifest: &Manifest,
        scripts: &[String],
    ) -> Result<String, minijinja::Error> {
        let categories: Vec<CategorySummary> = category_routes(manifest)
            .into_iter()
            .map(|route| {
                let page = load_category_page(manifest, &route.name);
                CategorySummary {
                    path: self.url(&url_path(&route.segments())),
                    section_count: page.sections.len(),
                    block_count: page.sections.iter().map(|s| s.templates.len()).sum(),
                    name: page.category.name,
                    label: page.category.label,
                }
            })
            .collect();

        self.templates.render_index(
            &self.layout(manifest, None, scripts),
            &categories,
            &manifest.design_systems,
        )
    }

    /// Render a category page. Unknown categories render with a fallback title.
    pub fn render_category(
        &self,
        manifest: &Manifest,
        category: &str,
        scripts: &[String],
    ) -> Result<String, minijinja::Error> {
        let page = load_category_page(manifest, category);

        let sections: Vec<SectionSummary> = page
            .sections
            .iter()
            .map(|s| SectionSummary {
                key: s.key.clone(),
                section_name: s.section_name.clone(),
                path: self.url(&url_path(&[category, s.key.as_str()])),
                template_names: s
                    .templates
                    .iter()
                    .map(|b| display_name(b).to_string())
                    .collect(),
            })
            .collect();

        self.templates.render_category(
            &self.layout(manifest, Some(category), scripts),
            &page.category,
            &sections,
        )
    }

    /// Render a section page. Empty sections render an empty list.
    pub fn render_section(
        &self,
        manifest: &Manifest,
        category: &str,
        section: &str,
        scripts: &[String],
    ) -> Result<String, minijinja::Error> {
        let page = load_section_page(manifest, category, section);
        let module = load_category_page(manifest, category).category;

        let cards: Vec<TemplateCard> = page
            .templates
            .iter()
            .map(|block| self.template_card(manifest, block))
            .collect();

        self.templates.render_section(
            &self.layout(manifest, Some(category), scripts),
            &module,
            &self.url(&url_path(&[category])),
            page.section_name.as_deref(),
            &cards,
        )
    }

    fn template_card(&self, manifest: &Manifest, block: &BlockEntry) -> TemplateCard {
        let design_system = manifest
            .design_system(&block.design_system)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| block.design_system.clone());

        TemplateCard {
            name: block.name.clone(),
            template_name: block.template_name.clone(),
            description_html: block
                .description
                .as_deref()
                .map(render_markdown)
                .unwrap_or_default(),
            design_system,
            files: block.files.clone(),
            dependencies: block.dependencies.clone(),
            registry_dependencies: registry_closure(manifest, &block.name).unwrap_or_default(),
            registry_item: self
                .config
                .registry_items
                .then(|| self.registry_item_url(&block.name)),
        }
    }

    /// URL of the `r/{name}.json` registry item.
    pub fn registry_item_url(&self, name: &str) -> String {
        self.url(&format!("r/{}.json", urlencoding::encode(name)))
    }

    /// Build the registry item for block `name`, reading its files from the blocks root.
    ///
    /// Files that cannot be read are logged and left out.
    pub fn registry_item(
        &self,
        manifest: &Manifest,
        name: &str,
    ) -> Result<RegistryItem, ManifestError> {
        let block = manifest
            .block(name)
            .ok_or_else(|| ManifestError::UnknownBlock(name.to_string()))?;

        let files = block
            .files
            .iter()
            .filter_map(|path| {
                let full = self.config.blocks_dir.join(path);
                match fs::read_to_string(&full) {
                    Ok(content) => Some(RegistryFile {
                        path: path.clone(),
                        content,
                    }),
                    Err(e) => {
                        tracing::warn!("Skipping {} for block {}: {}", full.display(), name, e);
                        None
                    }
                }
            })
            .collect();

        Ok(RegistryItem {
            name: block.name.clone(),
            kind: "registry:block".to_string(),
            description: block.description.clone(),
            design_system: block.design_system.clone(),
            dependencies: block.dependencies.clone(),
            registry_dependencies: block.registry_dependencies.clone(),
            files,
        })
    }
}

fn display_name(block: &BlockEntry) -> &str {
    if block.template_name.is_empty() {
        &block.name
    } else {
        &block.template_name
    }
}

/// Render a Markdown description to HTML.
pub fn render_markdown(content: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(content, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_manifest::{DesignSystem, Module};
    use tempfile::tempdir;

    fn manifest() -> Manifest {
        Manifest {
            modules: vec![
                Module {
                    name: "main".to_string(),
                    label: "Main".to_string(),
                },
                Module {
                    name: "about".to_string(),
                    label: "About".to_string(),
                },
            ],
            design_systems: vec![DesignSystem {
                name: "neo".to_string(),
                label: "Neobrutalism".to_string(),
                description: String::new(),
            }],
            blocks: vec![
                BlockEntry {
                    name: "hero-1".to_string(),
                    description: Some("A **loud** hero".to_string()),
                    module_name: "Main".to_string(),
                    section_name: "Hero Section".to_string(),
                    template_name: "HeroOne".to_string(),
                    design_system: "neo".to_string(),
                    files: vec!["hero-1.tsx".to_string(), "missing.tsx".to_string()],
                    registry_dependencies: vec!["button".to_string()],
                    ..Default::default()
                },
                BlockEntry {
                    name: "button".to_string(),
                    module_name: "Main".to_string(),
                    section_name: "Buttons".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn navigation_lists_categories_and_sections() {
        let renderer = SiteRenderer::new(SiteConfig::default());

        let nav = renderer.navigation(&manifest(), Some("main"));

        assert_eq!(nav.len(), 2);
        assert_eq!(nav[0].title, "Main");
        assert!(nav[0].active);
        assert_eq!(nav[0].children[0].path, "/main/hero-section/");
        assert!(nav[1].children.is_empty());
    }

    #[test]
    fn renders_section_with_design_system_label() {
        let renderer = SiteRenderer::new(SiteConfig::default());

        let html = renderer
            .render_section(&manifest(), "main", "hero-section", &[])
            .unwrap();

        assert!(html.contains("Neobrutalism"));
        assert!(html.contains("<strong>loud</strong>"));
        assert!(html.contains("HeroOne"));
    }

    #[test]
    fn renders_unknown_category() {
        let renderer = SiteRenderer::new(SiteConfig::default());

        let html = renderer.render_category(&manifest(), "nope", &[]).unwrap();

        assert!(html.contains("<h1>nope</h1>"));
    }

    #[test]
    fn registry_item_inlines_readable_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("hero-1.tsx"), "export function HeroOne() {}").unwrap();

        let renderer = SiteRenderer::new(SiteConfig {
            blocks_dir: temp.path().to_path_buf(),
            ..Default::default()
        });

        let item = renderer.registry_item(&manifest(), "hero-1").unwrap();

        assert_eq!(item.kind, "registry:block");
        assert_eq!(item.files.len(), 1);
        assert_eq!(item.files[0].path, "hero-1.tsx");
        assert!(item.files[0].content.contains("HeroOne"));

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""registryDependencies":["button"]"#));
    }

    #[test]
    fn registry_item_for_unknown_block() {
        let renderer = SiteRenderer::new(SiteConfig::default());

        assert!(matches!(
            renderer.registry_item(&manifest(), "ghost"),
            Err(ManifestError::UnknownBlock(_))
        ));
    }

    #[test]
    fn encodes_reserved_characters_in_links() {
        let mut manifest = manifest();
        manifest.blocks.push(BlockEntry {
            name: "plan one".to_string(),
            module_name: "Main".to_string(),
            section_name: "Plan #1".to_string(),
            ..Default::default()
        });
        let renderer = SiteRenderer::new(SiteConfig::default());

        let nav = renderer.navigation(&manifest, None);
        assert_eq!(nav[0].children[2].path, "/main/plan-%231/");

        let html = renderer.render_category(&manifest, "main", &[]).unwrap();
        assert!(html.contains("plan-%231"));
        assert!(!html.contains("plan-#1"));

        assert_eq!(renderer.registry_item_url("plan one"), "/r/plan%20one.json");
    }

    #[test]
    fn renders_markdown() {
        let html = render_markdown("Hello *world*");
        assert!(html.contains("<em>world</em>"));
    }
}
