//! Stylesheet and script for the catalog pages.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The catalog stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// The catalog script (section toggles and copy buttons).
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// The stylesheet, minified when requested.
    ///
    /// Falls back to the unminified source if lightningcss rejects it.
    pub fn css(minify: bool) -> String {
        let css = Self::generate_css();
        if !minify {
            return css;
        }
        match Self::minify_css(&css) {
            Ok(min) => min,
            Err(e) => {
                tracing::warn!("Skipping CSS minification: {}", e);
                css
            }
        }
    }
}

const DEFAULT_CSS: &str = r#"/* blockyard catalog theme */

:root {
  --sidebar-width: 260px;
  --content-max-width: 960px;
  --background: #ffffff;
  --foreground: #111827;
  --muted: #f3f4f6;
  --muted-foreground: #6b7280;
  --border: #e5e7eb;
  --primary: #2563eb;
  --radius: 0.5rem;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-sans, system-ui, -apple-system, sans-serif);
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

a {
  color: var(--primary);
  text-decoration: none;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-logo {
  font-weight: 700;
  font-size: 1.125rem;
  color: var(--foreground);
}

.nav-list,
.nav-children {
  list-style: none;
}

.nav-list {
  margin-top: 1.5rem;
}

.nav-children {
  padding-left: 1rem;
  font-size: 0.875rem;
}

.nav-item.active > a {
  font-weight: 600;
}

.main {
  padding: 2rem 3rem;
  max-width: var(--content-max-width);
}

.page-header {
  margin-bottom: 2rem;
}

.breadcrumb {
  font-size: 0.875rem;
  color: var(--muted-foreground);
}

.category-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 1rem;
}

.category-card,
.template-card {
  display: block;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1.25rem;
  color: var(--foreground);
}

.template-card {
  margin-bottom: 1.5rem;
}

.template-card header {
  display: flex;
  align-items: center;
  justify-content: space-between;
}

.template-card h3 {
  margin-top: 1rem;
  font-size: 0.875rem;
  text-transform: uppercase;
  color: var(--muted-foreground);
}

.badge {
  font-size: 0.75rem;
  border: 1px solid var(--border);
  border-radius: 999px;
  padding: 0.125rem 0.5rem;
}

.section-group {
  border-bottom: 1px solid var(--border);
  padding: 0.75rem 0;
}

.section-group summary {
  cursor: pointer;
  font-weight: 600;
}

.section-group ul {
  margin: 0.5rem 0 0 1.5rem;
}

.count {
  color: var(--muted-foreground);
  font-weight: 400;
}

.files li,
.deps li {
  list-style: none;
  display: flex;
  align-items: center;
  gap: 0.5rem;
}

.copy-btn {
  font-size: 0.75rem;
  border: 1px solid var(--border);
  background: var(--background);
  border-radius: var(--radius);
  padding: 0 0.375rem;
  cursor: pointer;
}

.empty {
  color: var(--muted-foreground);
}

.design-systems {
  margin-top: 2.5rem;
}

@media (max-width: 768px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: static;
    height: auto;
  }
}
"#;

const DEFAULT_JS: &str = r#"(function() {
  'use strict';

  // Remember which section groups were collapsed
  const key = 'blockyard:collapsed:' + location.pathname;
  const collapsed = new Set(JSON.parse(sessionStorage.getItem(key) || '[]'));

  document.querySelectorAll('details.section-group').forEach(function(el, i) {
    if (collapsed.has(i)) el.open = false;
    el.addEventListener('toggle', function() {
      if (el.open) collapsed.delete(i); else collapsed.add(i);
      sessionStorage.setItem(key, JSON.stringify(Array.from(collapsed)));
    });
  });

  document.querySelectorAll('.files li, .deps li').forEach(function(li) {
    const code = li.querySelector('code');
    if (!code) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async function() {
      try {
        await navigator.clipboard.writeText(code.textContent || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(function() { btn.textContent = 'Copy'; }, 2000);
    });

    li.appendChild(btn);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".template-card"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("details.section-group"));
        assert!(js.contains("clipboard"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.badge {
    border-radius: 999px;
    padding: 2px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".badge"));
    }

    #[test]
    fn built_in_css_survives_minification() {
        let minified = AssetPipeline::css(true);

        assert!(minified.len() < AssetPipeline::generate_css().len());
        assert!(minified.contains(".template-card"));
    }
}
