//! Initialize a block registry in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing blockyard...");

    write_sample(config_path, DEFAULT_CONFIG, yes)?;
    write_sample(Path::new("registry.json"), DEFAULT_REGISTRY, yes)?;

    let hero_dir = Path::new("blocks/hero");
    fs::create_dir_all(hero_dir).context("Failed to create blocks directory")?;
    write_sample(&hero_dir.join("hero-centered.tsx"), DEFAULT_HERO_BLOCK, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'blockyard dev' to start the preview server.");

    Ok(())
}

/// Write `contents` to `path` unless it exists and `overwrite` is off.
fn write_sample(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(());
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

pub(crate) const DEFAULT_CONFIG: &str = r#"# blockyard configuration

[registry]
# Manifest describing modules, design systems and blocks
manifest = "registry.json"

# Directory block file paths are relative to
blocks_dir = "."

[site]
# Output directory for built site
output = "dist"

# Site title
title = "Blocks"

# Base URL (for deployment)
base_url = "/"

[build]
# Minify CSS
minify = true

# Emit r/<block>.json with inlined sources
registry_items = true
"#;

pub(crate) const DEFAULT_REGISTRY: &str = r#"{
  "modules": [
    { "name": "main", "label": "Main" },
    { "name": "pricing", "label": "Pricing" },
    { "name": "faq", "label": "FAQ" }
  ],
  "designSystems": [
    { "name": "minimal", "label": "Minimal", "description": "Neutral palette, generous whitespace" },
    { "name": "neobrutalism", "label": "Neobrutalism", "description": "Hard shadows and thick borders" }
  ],
  "blocks": [
    {
      "name": "hero-centered",
      "description": "Centered headline with a **primary** call to action.",
      "moduleName": "main",
      "sectionName": "Hero Section",
      "templateName": "HeroCentered",
      "designSystem": "minimal",
      "files": ["blocks/hero/hero-centered.tsx"],
      "dependencies": [],
      "registryDependencies": ["button"]
    }
  ]
}
"#;

const DEFAULT_HERO_BLOCK: &str = r#"import { Button } from "@/components/ui/button";

const defaults = {
  title: "Build pages faster",
  subtitle: "Drop-in sections for your next launch.",
  cta: "Get started",
};

export function HeroCentered(props: Partial<typeof defaults>) {
  const { title, subtitle, cta } = { ...defaults, ...props };
  return (
    <section className="py-24 text-center">
      <h1 className="text-5xl font-bold">{title}</h1>
      <p className="mt-4 text-lg text-muted-foreground">{subtitle}</p>
      <Button className="mt-8">{cta}</Button>
    </section>
  );
}
"#;
