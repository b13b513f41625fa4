//! Route segments as URLs and as output paths.

use std::path::{Path, PathBuf};

use blockyard_manifest::is_safe_segment;

/// Site-relative URL for a list of path segments, e.g. `pricing/plan-%231/`.
///
/// Each segment is percent-encoded, so `#`, `?` and `&` in manifest names
/// stay part of the path.
pub fn url_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| format!("{}/", urlencoding::encode(segment)))
        .collect()
}

/// Directory for `segments` under `root`.
///
/// Returns `None` when a segment is empty, `.`/`..` or contains a path
/// separator, or when the joined path does not stay under `root`.
pub fn output_dir(root: &Path, segments: &[&str]) -> Option<PathBuf> {
    if !segments.iter().all(|segment| is_safe_segment(segment)) {
        return None;
    }

    let dir = segments
        .iter()
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment));

    dir.starts_with(root).then_some(dir)
}

/// File name a configured stylesheet is published under in `assets/`.
pub fn stylesheet_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("style.css")
}

/// URL a configured stylesheet is linked from.
pub fn stylesheet_url(base_url: &str, path: &str) -> String {
    format!("{}assets/{}", base_url, urlencoding::encode(stylesheet_name(path)))
}

/// Escape text for an XML element body.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(url_path(&["main", "hero-section"]), "main/hero-section/");
        assert_eq!(url_path(&["pricing", "plan-#1"]), "pricing/plan-%231/");
        assert_eq!(url_path(&["faq", "q&a?"]), "faq/q%26a%3F/");
        assert_eq!(url_path(&[]), "");
    }

    #[test]
    fn output_dir_stays_under_root() {
        let root = Path::new("/site/dist");

        assert_eq!(
            output_dir(root, &["pricing", "plan-#1"]),
            Some(PathBuf::from("/site/dist/pricing/plan-#1"))
        );
        assert_eq!(output_dir(root, &[]), Some(root.to_path_buf()));
    }

    #[test]
    fn output_dir_rejects_escaping_segments() {
        let root = Path::new("/site/dist");

        assert_eq!(output_dir(root, &[""]), None);
        assert_eq!(output_dir(root, &["main", "../../escaped"]), None);
        assert_eq!(output_dir(root, &["..", "x"]), None);
        assert_eq!(output_dir(root, &["/etc"]), None);
    }

    #[test]
    fn stylesheets_publish_under_assets() {
        assert_eq!(stylesheet_name("theme/tokens.css"), "tokens.css");
        assert_eq!(stylesheet_url("/blocks/", "theme/tokens.css"), "/blocks/assets/tokens.css");
    }

    #[test]
    fn escapes_xml_text() {
        assert_eq!(escape_xml("/faq/q&a/"), "/faq/q&amp;a/");
        assert_eq!(escape_xml("<loc>"), "&lt;loc&gt;");
    }
}
