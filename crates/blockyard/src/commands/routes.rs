//! Route listing command.

use anyhow::{Context, Result};
use blockyard_manifest::{
    category_routes, section_routes, CategoryRoute, ManifestStore, SectionRoute,
};
use serde::Serialize;

use crate::config::ConfigFile;

#[derive(Debug, Serialize)]
struct RouteListing {
    categories: Vec<CategoryRoute>,
    sections: Vec<SectionRoute>,
}

/// Run the routes command.
pub fn run(file: &ConfigFile, json: bool) -> Result<()> {
    let store = ManifestStore::new(file.manifest_path());
    let manifest = store.load()?;

    let listing = RouteListing {
        categories: category_routes(&manifest),
        sections: section_routes(&manifest),
    };

    println!("{}", render(&listing, json)?);

    Ok(())
}

fn render(listing: &RouteListing, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(listing).context("Failed to serialize routes");
    }

    let mut out = String::new();
    for route in &listing.categories {
        out.push_str(&format!("/{}\n", route.path()));
    }
    for route in &listing.sections {
        out.push_str(&format!("/{}\n", route.path()));
    }
    Ok(out.trim_end().to_string())
}
