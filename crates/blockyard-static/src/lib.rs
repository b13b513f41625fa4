//! Static site generator for block catalogs.
//!
//! Renders an index page, one page per category and one page per section from a
//! registry manifest, plus per-block registry items and the usual site extras.

pub mod assets;
pub mod builder;
pub mod paths;
pub mod site;
pub mod templates;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use paths::{stylesheet_name, stylesheet_url, url_path};
pub use site::{render_markdown, RegistryFile, RegistryItem, SiteConfig, SiteRenderer};
