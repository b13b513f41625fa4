//! Manifest entities.

use serde::{Deserialize, Serialize};

/// A top-level category of blocks (e.g. "About", "Pricing").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Unique lowercase slug
    pub name: String,

    /// Display name
    #[serde(default)]
    pub label: String,
}

impl Module {
    /// Build a module whose label is its name.
    ///
    /// Used when a category is requested that the manifest does not declare.
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
        }
    }
}

/// A visual style variant blocks can be written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSystem {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// One renderable page-section template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntry {
    /// Globally unique id
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category this block belongs to (matches `Module::name` case-insensitively)
    #[serde(default)]
    pub module_name: String,

    /// Free-text grouping label within the module
    #[serde(default)]
    pub section_name: String,

    #[serde(default)]
    pub template_name: String,

    /// Design system name
    #[serde(default)]
    pub design_system: String,

    /// Source files, relative to the blocks root
    #[serde(default)]
    pub files: Vec<String>,

    /// Package dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Other registry blocks this block builds on
    #[serde(default)]
    pub registry_dependencies: Vec<String>,
}

/// The whole registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub modules: Vec<Module>,

    #[serde(default)]
    pub design_systems: Vec<DesignSystem>,

    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
}

impl Manifest {
    /// Look up a module by name (case-insensitive).
    pub fn module(&self, name: &str) -> Option<&Module> {
        let name = name.to_lowercase();
        self.modules.iter().find(|m| m.name.to_lowercase() == name)
    }

    /// Look up a design system by name.
    pub fn design_system(&self, name: &str) -> Option<&DesignSystem> {
        self.design_systems.iter().find(|d| d.name == name)
    }

    /// Look up a block by its unique name.
    pub fn block(&self, name: &str) -> Option<&BlockEntry> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Blocks whose module name matches `category` once lowercased.
    pub fn blocks_in(&self, category: &str) -> impl Iterator<Item = &BlockEntry> + '_ {
        let category = category.to_string();
        self.blocks
            .iter()
            .filter(move |b| b.module_name.to_lowercase() == category)
    }

    /// Serialize back to the camelCase JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
