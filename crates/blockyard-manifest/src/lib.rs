//! Block registry manifest handling.
//!
//! This crate loads a `registry.json` manifest describing modules, design systems
//! and blocks, enumerates the category and section routes a catalog site exposes,
//! and shapes the per-route page data. Everything past the initial load is a pure
//! function over the loaded [`Manifest`].

pub mod deps;
pub mod pages;
pub mod routes;
pub mod section;
pub mod store;
pub mod types;

pub use deps::registry_closure;
pub use pages::{load_category_page, load_section_page, CategoryPage, SectionPage};
pub use routes::{category_routes, is_safe_segment, section_routes, CategoryRoute, SectionRoute};
pub use section::{group_sections, normalize_section_key, Section};
pub use store::{parse_manifest, ManifestError, ManifestFormat, ManifestStore};
pub use types::{BlockEntry, DesignSystem, Manifest, Module};
