//! Transitive registry dependencies.

use std::collections::HashSet;

use crate::store::ManifestError;
use crate::types::Manifest;

/// Every registry dependency reachable from block `name`, depth-first in first-seen order.
///
/// The root itself is never included. Names the manifest does not know are kept
/// but not expanded, since they may come from another registry.
pub fn registry_closure(manifest: &Manifest, name: &str) -> Result<Vec<String>, ManifestError> {
    let root = manifest
        .block(name)
        .ok_or_else(|| ManifestError::UnknownBlock(name.to_string()))?;

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(root.name.as_str());

    let mut out = Vec::new();
    let mut stack: Vec<&str> = root
        .registry_dependencies
        .iter()
        .rev()
        .map(String::as_str)
        .collect();

    while let Some(dep) = stack.pop() {
        if !seen.insert(dep) {
            continue;
        }
        out.push(dep.to_string());

        match manifest.block(dep) {
            Some(block) => {
                stack.extend(block.registry_dependencies.iter().rev().map(String::as_str));
            }
            None => tracing::debug!("Registry dependency '{}' not in manifest", dep),
        }
    }

    Ok(out)
}
