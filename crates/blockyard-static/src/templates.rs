//! Template engine for rendering catalog pages.

use minijinja::{context, Environment};
use serde::Serialize;

use blockyard_manifest::{DesignSystem, Module};

/// A navigation item.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
    /// Child items
    pub children: Vec<NavItem>,
    /// Whether this is the active page
    pub active: bool,
}

/// Shared page chrome.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Site title
    pub site_title: String,
    /// Base URL
    pub base_url: String,
    /// Navigation items
    pub nav: Vec<NavItem>,
    /// Stylesheet URLs to include
    pub styles: Vec<String>,
    /// Extra script URLs (the dev server adds its reload client here)
    pub scripts: Vec<String>,
}

/// A category as listed on the index page.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub label: String,
    pub path: String,
    pub section_count: usize,
    pub block_count: usize,
}

/// A section as listed on a category page.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub key: String,
    pub section_name: String,
    pub path: String,
    pub template_names: Vec<String>,
}

/// One template variant on a section page.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateCard {
    pub name: String,
    pub template_name: String,
    /// Description rendered from Markdown
    pub description_html: String,
    /// Design system label, or its raw name when undeclared
    pub design_system: String,
    pub files: Vec<String>,
    pub dependencies: Vec<String>,
    /// Transitive registry dependencies
    pub registry_dependencies: Vec<String>,
    /// URL of the registry item JSON, when emitted
    pub registry_item: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("nav.html", NAV_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("category.html", CATEGORY_TEMPLATE),
            ("section.html", SECTION_TEMPLATE),
        ] {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("Built-in template failed to compile");
        }

        Self { env }
    }

    /// Render the catalog index.
    pub fn render_index(
        &self,
        layout: &Layout,
        categories: &[CategorySummary],
        design_systems: &[DesignSystem],
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(context! {
            title => &layout.site_title,
            layout => layout,
            categories => categories,
            design_systems => design_systems,
        })
    }

    /// Render a category page.
    pub fn render_category(
        &self,
        layout: &Layout,
        category: &Module,
        sections: &[SectionSummary],
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("category.html")?.render(context! {
            title => &category.label,
            layout => layout,
            category => category,
            sections => sections,
        })
    }

    /// Render a section page.
    pub fn render_section(
        &self,
        layout: &Layout,
        category: &Module,
        category_path: &str,
        section_name: Option<&str>,
        templates: &[TemplateCard],
    ) -> Result<String, minijinja::Error> {
        let title = section_name.unwrap_or(&category.label);

        self.env.get_template("section.html")?.render(context! {
            title => title,
            layout => layout,
            category => category,
            category_path => category_path,
            section_name => section_name,
            templates => templates,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ layout.site_title }}</title>
  {% for style in layout.styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}<link rel="stylesheet" href="{{ layout.base_url }}assets/main.css">
</head>
<body>
  <div class="layout">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="{{ layout.base_url }}assets/main.js"></script>
  {% for script in layout.scripts %}<script src="{{ script }}"></script>
  {% endfor %}
</body>
</html>"##;

const NAV_TEMPLATE: &str = r##"<div class="nav-header">
  <a href="{{ layout.base_url }}" class="nav-logo">{{ layout.site_title }}</a>
</div>
<ul class="nav-list">
{% for item in layout.nav %}
  <li class="nav-item{% if item.active %} active{% endif %}">
    <a href="{{ item.path }}">{{ item.title }}</a>
    {% if item.children %}
    <ul class="nav-children">
      {% for child in item.children %}
      <li class="nav-item{% if child.active %} active{% endif %}">
        <a href="{{ child.path }}">{{ child.title }}</a>
      </li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<header class="page-header">
  <h1>{{ layout.site_title }}</h1>
</header>

<section class="category-grid">
{% for category in categories %}
  <a class="category-card" href="{{ category.path }}">
    <h2>{{ category.label }}</h2>
    <p>{{ category.section_count }} sections &middot; {{ category.block_count }} blocks</p>
  </a>
{% else %}
  <p class="empty">No categories yet.</p>
{% endfor %}
</section>

{% if design_systems %}
<section class="design-systems">
  <h2>Design systems</h2>
  <ul>
  {% for ds in design_systems %}
    <li><strong>{{ ds.label }}</strong>{% if ds.description %} &mdash; {{ ds.description }}{% endif %}</li>
  {% endfor %}
  </ul>
</section>
{% endif %}
{% endblock %}"##;

const CATEGORY_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<header class="page-header">
  <h1>{{ category.label }}</h1>
</header>

{% for section in sections %}
<details class="section-group" open>
  <summary><a href="{{ section.path }}">{{ section.section_name }}</a> <span class="count">{{ section.template_names | length }}</span></summary>
  <ul>
  {% for name in section.template_names %}
    <li>{{ name }}</li>
  {% endfor %}
  </ul>
</details>
{% else %}
<p class="empty">No sections in this category.</p>
{% endfor %}
{% endblock %}"##;

const SECTION_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<header class="page-header">
  <p class="breadcrumb"><a href="{{ category_path }}">{{ category.label }}</a></p>
  <h1>{{ section_name or category.label }}</h1>
</header>

{% for template in templates %}
<article class="template-card" id="{{ template.name }}">
  <header>
    <h2>{{ template.template_name or template.name }}</h2>
    {% if template.design_system %}<span class="badge">{{ template.design_system }}</span>{% endif %}
  </header>
  {% if template.description_html %}<div class="description">{{ template.description_html | safe }}</div>{% endif %}
  {% if template.files %}
  <h3>Files</h3>
  <ul class="files">
  {% for file in template.files %}<li><code>{{ file }}</code></li>{% endfor %}
  </ul>
  {% endif %}
  {% if template.dependencies %}
  <h3>Dependencies</h3>
  <ul class="deps">
  {% for dep in template.dependencies %}<li><code>{{ dep }}</code></li>{% endfor %}
  </ul>
  {% endif %}
  {% if template.registry_dependencies %}
  <h3>Registry dependencies</h3>
  <ul class="deps">
  {% for dep in template.registry_dependencies %}<li><code>{{ dep }}</code></li>{% endfor %}
  </ul>
  {% endif %}
  {% if template.registry_item %}<p><a class="registry-link" href="{{ template.registry_item }}">registry item</a></p>{% endif %}
</article>
{% else %}
<p class="empty">No templates in this section.</p>
{% endfor %}
{% endblock %}"##;
