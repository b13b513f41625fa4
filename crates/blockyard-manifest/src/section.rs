//! Section keys and grouping.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::BlockEntry;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// A group of template variants sharing a normalized section name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Normalized key, used in URLs
    pub key: String,

    /// Display name, taken from the first member
    pub section_name: String,

    /// Members in manifest order
    pub templates: Vec<BlockEntry>,
}

/// Normalize a section name into its URL key.
///
/// Lowercases, then collapses each whitespace run into a single `-`.
pub fn normalize_section_key(section_name: &str) -> String {
    WHITESPACE_RE
        .replace_all(&section_name.to_lowercase(), "-")
        .into_owned()
}

/// Group blocks into sections by normalized section name.
///
/// Sections are ordered by first appearance. The first block seen for a key
/// supplies the section's display name.
pub fn group_sections<'a, I>(blocks: I) -> Vec<Section>
where
    I: IntoIterator<Item = &'a BlockEntry>,
{
    let mut sections: Vec<Section> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let key = normalize_section_key(&block.section_name);

        match index.get(&key) {
            Some(&i) => sections[i].templates.push(block.clone()),
            None => {
                index.insert(key.clone(), sections.len());
                sections.push(Section {
                    key,
                    section_name: block.section_name.clone(),
                    templates: vec![block.clone()],
                });
            }
        }
    }

    sections
}
