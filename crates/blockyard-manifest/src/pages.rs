//! Per-route page data.
//!
//! Unknown categories and empty sections are not errors: they produce a
//! fallback module or an empty template list for the renderer to show.

use serde::Serialize;

use crate::section::{group_sections, normalize_section_key, Section};
use crate::types::{BlockEntry, Manifest, Module};

/// Data for a category page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPage {
    pub category: Module,
    pub sections: Vec<Section>,
}

/// Data for a section page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPage {
    pub templates: Vec<BlockEntry>,
    pub section_name: Option<String>,
}

/// Load the page data for `category_key`.
pub fn load_category_page(manifest: &Manifest, category_key: &str) -> CategoryPage {
    let category = manifest
        .module(category_key)
        .cloned()
        .unwrap_or_else(|| Module::fallback(category_key));

    let sections = group_sections(manifest.blocks_in(category_key));

    CategoryPage { category, sections }
}

/// Load the page data for one section of a category.
pub fn load_section_page(
    manifest: &Manifest,
    category_key: &str,
    section_key: &str,
) -> SectionPage {
    let templates: Vec<BlockEntry> = manifest
        .blocks_in(category_key)
        .filter(|b| normalize_section_key(&b.section_name) == section_key)
        .cloned()
        .collect();

    let section_name = templates.first().map(|b| b.section_name.clone());

    SectionPage {
        templates,
        section_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(name: &str, module: &str, section: &str) -> BlockEntry {
        BlockEntry {
            name: name.to_string(),
            module_name: module.to_string(),
            section_name: section.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_category_falls_back() {
        let page = load_category_page(&Manifest::default(), "nowhere");

        assert_eq!(page.category, Module::fallback("nowhere"));
        assert!(page.sections.is_empty());
    }

    #[test]
    fn unknown_category_still_groups_matching_blocks() {
        let manifest = Manifest {
            blocks: vec![block("x", "Misc", "Extras")],
            ..Default::default()
        };

        let page = load_category_page(&manifest, "misc");

        assert_eq!(page.category.label, "misc");
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.sections[0].key, "extras");
    }

    #[test]
    fn category_page_groups_by_section() {
        let manifest = Manifest {
            modules: vec![Module {
                name: "main".to_string(),
                label: "Main".to_string(),
            }],
            blocks: vec![
                block("a", "Main", "Hero"),
                block("b", "Other", "Hero"),
                block("c", "main", "FAQ"),
                block("d", "MAIN", "hero"),
            ],
            ..Default::default()
        };

        let page = load_category_page(&manifest, "main");

        assert_eq!(page.category.label, "Main");
        let keys: Vec<&str> = page.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["hero", "faq"]);
        let hero: Vec<&str> = page.sections[0]
            .templates
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(hero, vec!["a", "d"]);
    }

    #[test]
    fn empty_section_page() {
        let page = load_section_page(&Manifest::default(), "main", "hero");

        assert!(page.templates.is_empty());
        assert_eq!(page.section_name, None);
    }

    #[test]
    fn section_page_takes_name_from_first_template() {
        let manifest = Manifest {
            blocks: vec![block("a", "Main", "Hero  Banner"), block("b", "main", "hero banner")],
            ..Default::default()
        };

        let page = load_section_page(&manifest, "main", "hero-banner");

        assert_eq!(page.templates.len(), 2);
        assert_eq!(page.section_name.as_deref(), Some("Hero  Banner"));
    }
}
