//! Route enumeration for static generation.

use std::collections::HashSet;

use serde::Serialize;

use crate::section::normalize_section_key;
use crate::types::Manifest;

/// A category page route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryRoute {
    pub name: String,
}

impl CategoryRoute {
    /// Relative URL path, e.g. `about/`.
    pub fn path(&self) -> String {
        format!("{}/", self.name)
    }

    /// Path segments, one per directory level.
    pub fn segments(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

/// A section page route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SectionRoute {
    pub category: String,
    pub section: String,
}

impl SectionRoute {
    /// Relative URL path, e.g. `main/hero/`.
    pub fn path(&self) -> String {
        format!("{}/{}/", self.category, self.section)
    }

    /// Path segments, one per directory level.
    pub fn segments(&self) -> Vec<&str> {
        vec![self.category.as_str(), self.section.as_str()]
    }
}

/// Whether `segment` can stand as a single directory name under an output root.
///
/// Empty names, `.`, `..` and anything containing a path separator would
/// resolve outside the directory they are joined onto.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

/// One route per declared module, in manifest order.
///
/// Modules with no blocks still get a route.
pub fn category_routes(manifest: &Manifest) -> Vec<CategoryRoute> {
    let mut seen = HashSet::new();

    manifest
        .modules
        .iter()
        .filter(|m| seen.insert(m.name.as_str()))
        .map(|m| CategoryRoute {
            name: m.name.clone(),
        })
        .collect()
}

/// Unique `(category, section)` pairs derived from the blocks, in first-seen order.
///
/// Blocks without a module or section name are skipped.
pub fn section_routes(manifest: &Manifest) -> Vec<SectionRoute> {
    let mut seen = HashSet::new();
    let mut routes = Vec::new();

    for block in &manifest.blocks {
        if block.module_name.is_empty() || block.section_name.is_empty() {
            continue;
        }

        let route = SectionRoute {
            category: block.module_name.to_lowercase(),
            section: normalize_section_key(&block.section_name),
        };

        if seen.insert(route.clone()) {
            routes.push(route);
        }
    }

    routes
}
